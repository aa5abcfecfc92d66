//! Payload decoding.
//!
//! ## Safety Considerations
//!
//! Payloads travel inside credentials that a client hands back to us, so the
//! decoder treats every field as hostile:
//!
//! - Allocation sizes are checked against [`ALLOC_BYTES_LIMIT`] before any
//!   buffer is reserved, including the inflated dictionary.
//! - The node count is bounded by [`MAX_NODE_COUNT`] and by the body length,
//!   since every node costs at least one bit.
//! - The decoded structure must be a rooted DAG: references outside the node
//!   range, unreachable nodes and cycles are all rejected.
//! - The number of paths the graph expands to and their total length are
//!   counted (saturating) before anything is replayed, and capped at
//!   [`MAX_DECODED_PATHS`] and [`MAX_DECODED_BYTES`]. A chain of nodes that
//!   each end a path expands quadratically, so the path count alone is not
//!   enough.

use std::io::{Cursor, Read};

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use flate2::read::ZlibDecoder;

use crate::leb128::ReadLeb128;
use crate::pathpack::bits::BitReader;
use crate::pathpack::dictionary::Dictionary;
use crate::pathpack::graph::{Edge, Link, NodeId, PathGraph};
use crate::pathpack::{ALLOC_BYTES_LIMIT, MAX_DECODED_BYTES, MAX_DECODED_PATHS, MAX_NODE_COUNT};

use super::{
    name_tree, node_tree, Decodable, DecodeError, FLAG_DEFLATED, KNOWN_FLAGS, MARKER_CONTINUES,
    PAYLOAD_VERSION, SEGMENT_TERMINATOR,
};

impl Decodable for PathGraph {
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.is_empty() {
            return Ok(PathGraph::default());
        }

        let mut cursor = Cursor::new(bytes);

        let version = read_u8(&mut cursor)?;
        if version != PAYLOAD_VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }
        let flags = read_u8(&mut cursor)?;
        if flags & !KNOWN_FLAGS != 0 {
            return Err(DecodeError::UnknownFlags(flags));
        }

        let block_len = cursor.read_leb128()?;
        let block = read_bytes(&mut cursor, block_len)?;
        let block = if flags & FLAG_DEFLATED != 0 {
            inflate(block)?
        } else {
            block.to_vec()
        };
        let names = split_names(block)?;

        let weights = read_weights(&mut cursor, names.len())?;
        let dictionary = Dictionary::from_entries(names.into_iter().zip(weights).collect())?;

        let node_count = cursor.read_leb128()?;
        if node_count == 0 {
            return Err(DecodeError::InvalidNodeCount(node_count));
        }
        if node_count > MAX_NODE_COUNT {
            return Err(DecodeError::TooManyNodes(node_count));
        }

        let bit_len = cursor.read_leb128()?;
        // Every node writes at least its end-of-node code, which is never empty.
        if node_count > bit_len {
            return Err(DecodeError::InvalidNodeCount(node_count));
        }
        let body = read_bytes(&mut cursor, bit_len.div_ceil(8))?;

        if cursor.position() != bytes.len() as u64 {
            return Err(DecodeError::TrailingData);
        }

        let bits = BitSlice::<u8, Msb0>::from_slice(body);
        let (bits, padding) = bits.split_at(bit_len as usize);
        if padding.any() {
            return Err(DecodeError::NonZeroPadding);
        }

        let nodes = read_nodes(bits, &dictionary, node_count as usize)?;
        let records = check_structure(nodes)?;

        Ok(PathGraph::from_records(0, records))
    }
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, DecodeError> {
    let mut byte = [0u8; 1];
    cursor
        .read_exact(&mut byte)
        .map_err(|_| DecodeError::UnexpectedEndOfData)?;
    Ok(byte[0])
}

/// Borrows the next `len` bytes, checking them against the allocation limit
/// and the remaining input.
fn read_bytes<'a>(cursor: &mut Cursor<&'a [u8]>, len: u64) -> Result<&'a [u8], DecodeError> {
    if len > ALLOC_BYTES_LIMIT as u64 {
        return Err(DecodeError::ByteAllocationLimit(len));
    }

    let buffer: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or(DecodeError::UnexpectedEndOfData)?;
    let slice = buffer.get(start..end).ok_or(DecodeError::UnexpectedEndOfData)?;

    cursor.set_position(end as u64);
    Ok(slice)
}

fn inflate(block: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = ZlibDecoder::new(block);
    let mut inflated = Vec::new();
    (&mut decoder)
        .take(ALLOC_BYTES_LIMIT as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(DecodeError::Inflate)?;

    if inflated.len() > ALLOC_BYTES_LIMIT {
        return Err(DecodeError::ByteAllocationLimit(inflated.len() as u64));
    }
    if decoder.total_in() != block.len() as u64 {
        return Err(DecodeError::TrailingData);
    }

    Ok(inflated)
}

/// Splits the dictionary block into its NUL-terminated names.
fn split_names(block: Vec<u8>) -> Result<Vec<String>, DecodeError> {
    let Some((&last, names)) = block.split_last() else {
        return Err(DecodeError::EmptyDictionary);
    };
    if last != SEGMENT_TERMINATOR {
        return Err(DecodeError::MissingSegmentTerminator);
    }

    names
        .split(|&byte| byte == SEGMENT_TERMINATOR)
        .map(|name| {
            if name.is_empty() {
                return Err(DecodeError::EmptySegmentName);
            }
            let name = String::from_utf8(name.to_vec())?;
            if name.contains('/') {
                return Err(DecodeError::InvalidSegmentName(name));
            }
            Ok(name)
        })
        .collect()
}

/// Reads the rank 0 weight followed by one delta per further rank.
fn read_weights(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<u64>, DecodeError> {
    let mut weights: Vec<u64> = Vec::with_capacity(count);

    for rank in 0..count {
        let value = cursor.read_leb128()?;
        let weight = match weights.last() {
            None => value,
            Some(previous) => previous
                .checked_sub(value)
                .ok_or(DecodeError::WeightUnderflow(rank))?,
        };
        if weight == 0 {
            return Err(DecodeError::ZeroWeight(rank));
        }
        weights.push(weight);
    }

    Ok(weights)
}

/// Reads the edge lists of all nodes, indexed by payload position. Node
/// links refer to payload positions.
fn read_nodes(
    bits: &BitSlice<u8, Msb0>,
    dictionary: &Dictionary,
    node_count: usize,
) -> Result<Vec<Vec<Edge>>, DecodeError> {
    let names = name_tree(&dictionary.weights(), node_count as u64)
        .ok_or(DecodeError::EmptyDictionary)?;
    let targets = node_tree(node_count as u64);

    let mut reader = BitReader::new(bits);
    let mut nodes = Vec::with_capacity(node_count);

    for position in 0..node_count {
        let mut edges: Vec<Edge> = Vec::new();

        loop {
            let symbol = names.decode(&mut reader)?;
            let Some(entry) = dictionary.get(symbol) else {
                break;
            };

            let link = if reader.read_bit()? == MARKER_CONTINUES {
                let target = targets
                    .as_ref()
                    .ok_or(DecodeError::UnexpectedNodeReference)?
                    .decode(&mut reader)?;
                Link::Node(NodeId::new(target + 1))
            } else {
                Link::Terminal
            };

            let edge = Edge::new(entry.name(), link);
            if let Some(previous) = edges.last() {
                if !is_ordered(previous, &edge) {
                    return Err(DecodeError::UnsortedEdges(position));
                }
            }
            edges.push(edge);
        }

        if edges.is_empty() {
            return Err(DecodeError::EmptyNode(position));
        }
        nodes.push(edges);
    }

    if reader.remaining() != 0 {
        return Err(DecodeError::LeftoverBits(reader.remaining()));
    }

    Ok(nodes)
}

/// Canonical edge order: by name, a terminal edge before a node edge of the
/// same name, and at most one node edge per name.
fn is_ordered(previous: &Edge, next: &Edge) -> bool {
    previous.name() < next.name() || (previous.name() == next.name() && previous.is_terminal())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    Open,
    Done,
}

/// Checks that the decoded nodes form a rooted DAG with consistent node
/// names, and that it does not expand to too many paths or path bytes.
/// Returns the records
/// to assemble the graph from.
fn check_structure(nodes: Vec<Vec<Edge>>) -> Result<Vec<(String, Vec<Edge>)>, DecodeError> {
    let mut names: Vec<Option<&str>> = vec![None; nodes.len()];
    names[0] = Some("");

    for edge in nodes.iter().flatten() {
        if let Link::Node(target) = edge.link() {
            match names[target.index()] {
                None => names[target.index()] = Some(edge.name()),
                Some(name) if name == edge.name() => {}
                Some(_) => return Err(DecodeError::InconsistentNodeName(target.index())),
            }
        }
    }

    let mut state = vec![Visit::New; nodes.len()];
    let mut path_counts = vec![0u64; nodes.len()];
    let mut byte_counts = vec![0u64; nodes.len()];
    let mut stack = vec![(0usize, 0usize)];
    state[0] = Visit::Open;

    while let Some(frame) = stack.last_mut() {
        let (index, next) = *frame;
        let Some(edge) = nodes[index].get(next) else {
            let mut count = 0u64;
            let mut bytes = 0u64;
            for edge in &nodes[index] {
                // A slash and the name, once for every path running through the edge.
                let segment = 1 + edge.name().len() as u64;
                let (paths, below) = match edge.link() {
                    Link::Terminal => (1, 0),
                    Link::Node(target) => (path_counts[target.index()], byte_counts[target.index()]),
                };
                count = count.saturating_add(paths);
                bytes = bytes
                    .saturating_add(segment.saturating_mul(paths))
                    .saturating_add(below);
            }
            path_counts[index] = count;
            byte_counts[index] = bytes;
            state[index] = Visit::Done;
            stack.pop();
            continue;
        };
        frame.1 += 1;

        if let Link::Node(target) = edge.link() {
            match state[target.index()] {
                Visit::New => {
                    state[target.index()] = Visit::Open;
                    stack.push((target.index(), 0));
                }
                Visit::Open => return Err(DecodeError::Cycle(target.index())),
                Visit::Done => {}
            }
        }
    }

    if let Some(index) = state.iter().position(|visit| *visit == Visit::New) {
        return Err(DecodeError::UnreachableNode(index));
    }
    if path_counts[0] > MAX_DECODED_PATHS {
        return Err(DecodeError::TooManyPaths { limit: MAX_DECODED_PATHS });
    }
    if byte_counts[0] > MAX_DECODED_BYTES {
        return Err(DecodeError::TooManyBytes { limit: MAX_DECODED_BYTES });
    }

    let names: Vec<String> = names
        .into_iter()
        .map(|name| name.unwrap_or_default().to_string())
        .collect();

    Ok(names.into_iter().zip(nodes).collect())
}
