//! # PathPack: URL Path Set Compaction
//!
//! `pathpack` turns a list of URL paths into a small byte payload and back.
//! Content paths repeat the same segments over and over
//! (`/content/dist/rhel/server/7/$releasever/$basearch/os`), so the paths are
//! folded into a graph where shared prefixes and shared suffixes are stored
//! once, and every segment name is replaced by a Huffman code.
//!
//! ## Usage Example
//!
//! ```
//! use contentset::pathpack::{Decodable, Encodable, PathGraph};
//!
//! let paths = [
//!     "/content/dist/rhel/server/7/os",
//!     "/content/dist/rhel/server/7/debug",
//!     "/content/beta/rhel/server/7/os",
//!     "/content/beta/rhel/server/7/debug",
//! ];
//!
//! let graph = PathGraph::build(paths);
//! let payload = graph.encode().unwrap();
//!
//! let decoded = PathGraph::decode(&payload).unwrap();
//! assert_eq!(decoded, graph);
//! assert_eq!(decoded.paths().len(), paths.len());
//! ```
//!
//! ## Payload Layout
//!
//! An empty payload stands for the empty path set. Otherwise, with every
//! integer written as unsigned LEB128:
//!
//! ```text
//! u8      version (1)
//! u8      flags, bit 0 set when the dictionary block is zlib-deflated
//! leb128  dictionary block length, then the block: segment names in rank
//!         order, each terminated by a NUL byte
//! leb128  weight of rank 0, then weight(i - 1) - weight(i) for each rank i > 0
//! leb128  node count N, the root included
//! leb128  body length B in bits, then ceil(B / 8) bytes, MSB first
//! ```
//!
//! Two Huffman trees are rebuilt from the header alone. The *name tree*
//! codes dictionary ranks `0..D` plus an end-of-node symbol `D` weighted `N`.
//! The *node tree* codes references to payload nodes `1..N`, weighting
//! position `p` with `N - p`. The body lists the nodes in payload order (the
//! root, then by descending in-degree): for each edge the name code, a marker
//! bit (`0` when the path ends, `1` when it continues) and, when continuing,
//! the node code of the target; then the end-of-node code.
//!
//! ## Safety Considerations
//!
//! Decoding enforces [`ALLOC_BYTES_LIMIT`], [`MAX_NODE_COUNT`],
//! [`MAX_DECODED_PATHS`] and [`MAX_DECODED_BYTES`], and rejects cyclic or disconnected graphs, so a
//! hostile payload cannot make it allocate or loop without bound.
//!
//! ## Architecture
//!
//! * **Builder**: folds paths into a tree and merges identical subtrees
//! * **Graph**: the merged, immutable node arena
//! * **Dictionary**: frequency-ranked segment names
//! * **Huffman**: prefix-free codes rebuilt from weights
//! * **Codec**: payload encoding and decoding

mod bits;
mod builder;
mod codec;
mod dictionary;
mod graph;
mod huffman;

#[cfg(test)]
mod tests;

pub use bits::BitReader;
pub use bits::BitWriter;

pub use builder::PathGraphBuilder;

pub use graph::Edge;
pub use graph::Link;
pub use graph::NodeId;
pub use graph::PathGraph;
pub use graph::PathNode;

pub use dictionary::order;
pub use dictionary::Dictionary;
pub use dictionary::DictionaryEntry;

pub use huffman::HuffmanNode;
pub use huffman::HuffmanTree;

pub use codec::Decodable;
pub use codec::DecodeError;
pub use codec::Encodable;
pub use codec::EncodeError;
pub use codec::PAYLOAD_VERSION;

/// Maximum allocation in bytes (1MB) for the dictionary block, inflated or
/// not, and for the body.
pub const ALLOC_BYTES_LIMIT: usize = 1 << 20;

/// Maximum number of nodes a payload may declare.
pub const MAX_NODE_COUNT: u64 = 1 << 20;

/// Maximum number of paths a payload may expand to.
pub const MAX_DECODED_PATHS: u64 = 1_000_000;

/// Maximum total length in bytes (64MB) of the paths a payload may expand to.
pub const MAX_DECODED_BYTES: u64 = 1 << 26;

/// Builds the merged graph of `paths` and encodes it.
pub fn encode_paths<I, S>(paths: I) -> Result<Vec<u8>, EncodeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    PathGraph::build(paths).encode()
}

/// Decodes a payload and replays every path it holds.
pub fn decode_paths(bytes: &[u8]) -> Result<Vec<String>, DecodeError> {
    Ok(PathGraph::decode(bytes)?.paths())
}
