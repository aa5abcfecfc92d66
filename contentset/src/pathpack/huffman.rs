//! Weighted prefix-free codes.
//!
//! Trees are built the same way on both sides of the wire, from nothing but
//! the symbol weights, so tie-breaking has to be fully deterministic: leaves
//! enter in symbol order, every merged node enters after everything that is
//! already there, and among equal weights the node that entered first is
//! taken first. The first node taken becomes the `0` branch.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

use super::bits::{BitReader, BitWriter};
use super::{DecodeError, EncodeError};

/// A node of a [`HuffmanTree`], stored in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanNode {
    /// A symbol and its weight.
    Leaf {
        /// The symbol index.
        symbol: usize,
        /// The weight the symbol was built with.
        weight: u64,
    },
    /// Joins two subtrees; `left` is reached with a `0` bit.
    Internal {
        /// Sum of both subtree weights, saturating.
        weight: u64,
        /// Arena index of the `0` branch.
        left: usize,
        /// Arena index of the `1` branch.
        right: usize,
    },
}

impl HuffmanNode {
    /// Weight carried by this node.
    pub fn weight(&self) -> u64 {
        match *self {
            HuffmanNode::Leaf { weight, .. } | HuffmanNode::Internal { weight, .. } => weight,
        }
    }
}

/// A coding tree over symbols `0..n` together with the derived codes.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<HuffmanNode>,
    root: usize,
    codes: Vec<BitVec<u8, Msb0>>,
}

impl HuffmanTree {
    /// Builds the tree for symbols `0..weights.len()`. Returns `None` when
    /// there are no symbols.
    pub fn new(weights: &[u64]) -> Option<Self> {
        if weights.is_empty() {
            return None;
        }

        let mut nodes: Vec<HuffmanNode> = weights
            .iter()
            .enumerate()
            .map(|(symbol, &weight)| HuffmanNode::Leaf { symbol, weight })
            .collect();

        let mut queue: BinaryHeap<Reverse<(u64, usize)>> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| Reverse((node.weight(), index)))
            .collect();

        while queue.len() > 1 {
            let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
                (queue.pop(), queue.pop())
            else {
                break;
            };

            let weight = left_weight.saturating_add(right_weight);
            queue.push(Reverse((weight, nodes.len())));
            nodes.push(HuffmanNode::Internal { weight, left, right });
        }

        let root = nodes.len() - 1;
        let codes = Self::assign_codes(&nodes, root, weights.len());

        Some(Self { nodes, root, codes })
    }

    fn assign_codes(nodes: &[HuffmanNode], root: usize, symbols: usize) -> Vec<BitVec<u8, Msb0>> {
        let mut codes = vec![BitVec::new(); symbols];
        let mut stack = vec![(root, BitVec::<u8, Msb0>::new())];

        while let Some((index, prefix)) = stack.pop() {
            match nodes[index] {
                HuffmanNode::Leaf { symbol, .. } => codes[symbol] = prefix,
                HuffmanNode::Internal { left, right, .. } => {
                    let mut left_code = prefix.clone();
                    left_code.push(false);
                    let mut right_code = prefix;
                    right_code.push(true);

                    stack.push((right, right_code));
                    stack.push((left, left_code));
                }
            }
        }

        codes
    }

    /// Arena index of the root node.
    pub fn root(&self) -> usize {
        self.root
    }

    /// Looks up a node by arena index.
    pub fn node(&self, index: usize) -> Option<&HuffmanNode> {
        self.nodes.get(index)
    }

    /// The `(left, right)` children of an internal node.
    pub fn children(&self, index: usize) -> Option<(usize, usize)> {
        match self.nodes.get(index)? {
            HuffmanNode::Internal { left, right, .. } => Some((*left, *right)),
            HuffmanNode::Leaf { .. } => None,
        }
    }

    /// Total weight of the tree.
    pub fn weight(&self) -> u64 {
        self.nodes[self.root].weight()
    }

    /// Number of symbols.
    pub fn symbol_count(&self) -> usize {
        self.codes.len()
    }

    /// The code of `symbol`. A tree with one symbol assigns it the empty code.
    pub fn code(&self, symbol: usize) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(symbol).map(BitVec::as_bitslice)
    }

    /// Writes the code of `symbol`.
    pub fn encode_into(&self, symbol: usize, writer: &mut BitWriter) -> Result<(), EncodeError> {
        let code = self.code(symbol).ok_or(EncodeError::MissingCode(symbol))?;
        writer.extend_from_bitslice(code);
        Ok(())
    }

    /// Reads bits until a leaf is reached and returns its symbol.
    pub fn decode(&self, reader: &mut BitReader) -> Result<usize, DecodeError> {
        let mut index = self.root;
        loop {
            match self.nodes[index] {
                HuffmanNode::Leaf { symbol, .. } => return Ok(symbol),
                HuffmanNode::Internal { left, right, .. } => {
                    index = if reader.read_bit()? { right } else { left };
                }
            }
        }
    }
}
