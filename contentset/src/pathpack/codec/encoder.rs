//! Payload encoding.
//!
//! The encoder writes, in order: the version byte, the flags byte, the
//! dictionary block (optionally deflated), the dictionary weights as a
//! descending delta sequence, the node count, and finally the Huffman coded
//! body. See the [`pathpack`](crate::pathpack) module docs for the layout.

use std::cmp::Reverse;
use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::leb128::Leb128;
use crate::pathpack::bits::BitWriter;
use crate::pathpack::dictionary::Dictionary;
use crate::pathpack::graph::{Link, NodeId, PathGraph};

use super::{
    name_tree, node_tree, EncodeError, Encodable, FLAG_DEFLATED, MARKER_CONTINUES,
    MARKER_TERMINAL, PAYLOAD_VERSION, SEGMENT_TERMINATOR,
};

impl Encodable for PathGraph {
    /// Encodes the graph into a payload. The empty graph encodes to an empty
    /// payload.
    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.is_empty() {
            return Ok(Vec::new());
        }

        let dictionary = Dictionary::from_graph(self);
        if let Some(entry) = dictionary.iter().find(|entry| entry.name().contains('\0')) {
            return Err(EncodeError::NulInSegmentName(entry.name().to_string()));
        }

        let (flags, block) = dictionary_block(&dictionary)?;
        let body = write_body(self, &dictionary)?;
        let node_count = self.len() as u64;

        let mut bytes = Vec::with_capacity(block.len() + body.bytes.len() + 16);
        bytes.push(PAYLOAD_VERSION);
        bytes.push(flags);

        Leb128::encode_into(block.len() as u64, &mut bytes);
        bytes.extend_from_slice(&block);

        let weights = dictionary.weights();
        let mut previous = None;
        for &weight in &weights {
            let value = previous.map_or(weight, |previous: u64| previous.saturating_sub(weight));
            Leb128::encode_into(value, &mut bytes);
            previous = Some(weight);
        }

        Leb128::encode_into(node_count, &mut bytes);
        Leb128::encode_into(body.bit_len as u64, &mut bytes);
        bytes.extend_from_slice(&body.bytes);

        tracing::trace!(
            nodes = node_count,
            dictionary_len = dictionary.len(),
            deflated = flags & FLAG_DEFLATED != 0,
            body_bits = body.bit_len,
            payload_len = bytes.len(),
            "encoded path graph"
        );

        Ok(bytes)
    }
}

/// Serializes the dictionary names, deflating them when that is smaller.
/// Returns the flags to write along with the block.
fn dictionary_block(dictionary: &Dictionary) -> Result<(u8, Vec<u8>), EncodeError> {
    let mut raw = Vec::new();
    for entry in dictionary.iter() {
        raw.extend_from_slice(entry.name().as_bytes());
        raw.push(SEGMENT_TERMINATOR);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&raw)?;
    let deflated = encoder.finish()?;

    if deflated.len() < raw.len() {
        Ok((FLAG_DEFLATED, deflated))
    } else {
        Ok((0, raw))
    }
}

/// Payload position of every graph node: the root first, then the others by
/// descending in-degree, ties by graph id.
fn payload_order(graph: &PathGraph) -> Vec<usize> {
    let mut in_degree = vec![0usize; graph.len()];
    for edge in graph.nodes().flat_map(|node| node.children()) {
        if let Link::Node(target) = edge.link() {
            in_degree[target.index()] += 1;
        }
    }

    let mut order: Vec<usize> = (1..graph.len()).collect();
    order.sort_by_key(|&index| (Reverse(in_degree[index]), index));
    order.insert(0, 0);
    order
}

struct Body {
    bytes: Vec<u8>,
    bit_len: usize,
}

fn write_body(graph: &PathGraph, dictionary: &Dictionary) -> Result<Body, EncodeError> {
    let end_of_node = dictionary.len();
    let node_count = graph.len() as u64;
    let names = name_tree(&dictionary.weights(), node_count)
        .ok_or(EncodeError::MissingCode(end_of_node))?;
    let targets = node_tree(node_count);

    let order = payload_order(graph);
    let mut position = vec![0usize; order.len()];
    for (payload_index, &graph_index) in order.iter().enumerate() {
        position[graph_index] = payload_index;
    }

    let mut writer = BitWriter::default();
    for node in order.iter().filter_map(|&index| graph.node(NodeId::new(index))) {
        for edge in node.children() {
            let rank = dictionary
                .rank(edge.name())
                .ok_or(EncodeError::MissingCode(end_of_node))?;
            names.encode_into(rank, &mut writer)?;

            match edge.link() {
                Link::Terminal => writer.push(MARKER_TERMINAL),
                Link::Node(target) => {
                    writer.push(MARKER_CONTINUES);
                    let symbol = position[target.index()] - 1;
                    targets
                        .as_ref()
                        .ok_or(EncodeError::MissingCode(symbol))?
                        .encode_into(symbol, &mut writer)?;
                }
            }
        }
        names.encode_into(end_of_node, &mut writer)?;
    }

    let bit_len = writer.len();
    Ok(Body { bytes: writer.into_bytes(), bit_len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    use crate::testing::dist_paths;

    #[test]
    fn empty_graph_encodes_to_nothing() {
        let bytes = PathGraph::default().encode().expect("encoding succeeds");
        assert!(bytes.is_empty());
    }

    #[test]
    fn single_path_layout() {
        let graph = PathGraph::build(["/a"]);
        let bytes = graph.encode().expect("encoding succeeds");

        // Name tree over weights [1, 1]: `a` is `0`, end of node is `1`.
        // Body: `a`, terminal marker, end of node.
        assert_eq!(bytes, [PAYLOAD_VERSION, 0, 2, b'a', 0, 1, 1, 3, 0b0010_0000]);
    }

    #[test]
    fn nul_in_name_is_rejected() {
        let graph = PathGraph::build(["/a\0b"]);
        assert_matches!(graph.encode(), Err(EncodeError::NulInSegmentName(name)) if name == "a\0b");
    }

    #[test]
    fn repetitive_dictionary_is_deflated() {
        let graph = PathGraph::build(dist_paths(550));
        let bytes = graph.encode().expect("encoding succeeds");
        assert_eq!(bytes[1] & FLAG_DEFLATED, FLAG_DEFLATED);
    }

    #[test]
    fn most_referenced_node_comes_first() {
        let graph = PathGraph::build(["/a/rhel/os", "/b/rhel/os", "/c/rhel/os", "/d"]);
        let order = payload_order(&graph);

        assert_eq!(order.len(), graph.len());
        assert_eq!(order[0], NodeId::ROOT.index());

        let names: Vec<&str> = order
            .iter()
            .filter_map(|&index| graph.node(NodeId::new(index)))
            .map(|node| node.name())
            .collect();
        assert_eq!(names, ["", "rhel", "a", "b", "c"]);
    }
}
