use super::huffman::HuffmanTree;

mod decoder;
mod encoder;

/// Current payload format version, written as the first byte.
pub const PAYLOAD_VERSION: u8 = 1;

/// The dictionary block is zlib-deflated.
#[rustfmt::skip]
const FLAG_DEFLATED: u8         = 0b0000_0001;

/// Every flag bit this version understands.
#[rustfmt::skip]
const KNOWN_FLAGS: u8           = FLAG_DEFLATED;

/// Ends each segment name inside the dictionary block.
const SEGMENT_TERMINATOR: u8 = 0x00;

/// Marker bit following a name code: the path ends with this segment.
const MARKER_TERMINAL: bool = false;

/// Marker bit following a name code: the path continues at a node.
const MARKER_CONTINUES: bool = true;

/// Trait for types that can be encoded into a content-set payload.
pub trait Encodable {
    /// Encodes `self` into payload bytes.
    fn encode(&self) -> Result<Vec<u8>, EncodeError>;
}

/// Trait for types that can be decoded from a content-set payload.
pub trait Decodable: Sized {
    /// Decodes an instance from payload bytes, rejecting anything malformed.
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Builds the tree coding segment names plus the end-of-node symbol.
///
/// Symbols `0..weights.len()` are dictionary ranks. Symbol `weights.len()`
/// ends a node and is weighted by the node count, since every node emits it
/// exactly once.
fn name_tree(weights: &[u64], node_count: u64) -> Option<HuffmanTree> {
    let mut symbols = Vec::with_capacity(weights.len() + 1);
    symbols.extend_from_slice(weights);
    symbols.push(node_count);
    HuffmanTree::new(&symbols)
}

/// Builds the tree coding references to payload nodes `1..node_count`.
///
/// Payload nodes are ordered by descending in-degree, so lower positions get
/// higher weights. There is no tree when the root is the only node.
fn node_tree(node_count: u64) -> Option<HuffmanTree> {
    let weights: Vec<u64> = (1..node_count).rev().collect();
    HuffmanTree::new(&weights)
}

/// Errors that can occur while encoding a graph.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Segment names are NUL-terminated in the payload, so they cannot
    /// contain NUL themselves.
    #[error("segment name contains a NUL byte: {0:?}")]
    NulInSegmentName(String),

    /// A symbol had no code in its tree.
    #[error("no code for symbol {0}")]
    MissingCode(usize),

    /// I/O error while deflating the dictionary block
    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

/// Errors that can occur while decoding a payload. Decoding never returns
/// partial results.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Buffer ended unexpectedly during decoding
    #[error("unexpected end of data")]
    UnexpectedEndOfData,

    /// Error decoding a LEB128 header value
    #[error("error decoding LEB128 value: {0}")]
    Leb128(#[from] crate::leb128::Error),

    /// The version byte is not one this decoder understands.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(u8),

    /// The flags byte has bits set that this version does not define.
    #[error("unknown flag bits: {0:08b}")]
    UnknownFlags(u8),

    /// Total allocation size exceeds safety limit
    #[error("byte allocation limit exceeded: {0}")]
    ByteAllocationLimit(u64),

    /// The deflated dictionary block could not be inflated.
    #[error("error inflating dictionary block: {0}")]
    Inflate(#[source] std::io::Error),

    /// Bytes remain after the last field.
    #[error("unexpected trailing data")]
    TrailingData,

    /// The dictionary block holds no names.
    #[error("the dictionary is empty")]
    EmptyDictionary,

    /// The dictionary block does not end with a terminator.
    #[error("the last dictionary entry is not terminated")]
    MissingSegmentTerminator,

    /// A dictionary entry has no characters.
    #[error("empty segment name in dictionary")]
    EmptySegmentName,

    /// A dictionary entry is not valid UTF-8.
    #[error("segment name is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// A dictionary entry contains a `/`.
    #[error("segment name contains a path separator: {0:?}")]
    InvalidSegmentName(String),

    /// The same name appears twice in the dictionary.
    #[error("duplicate segment name in dictionary: {0:?}")]
    DuplicateSegmentName(String),

    /// A dictionary weight is zero.
    #[error("zero weight for dictionary rank {0}")]
    ZeroWeight(usize),

    /// A weight delta is larger than the weight it is subtracted from.
    #[error("weight delta underflows at dictionary rank {0}")]
    WeightUnderflow(usize),

    /// The node count cannot describe the body that follows.
    #[error("invalid node count: {0}")]
    InvalidNodeCount(u64),

    /// Node count exceeds safety limit
    #[error("node count limit exceeded: {0}")]
    TooManyNodes(u64),

    /// The body ended in the middle of a code.
    #[error("bit stream exhausted before a symbol was complete")]
    BitsExhausted,

    /// Bits remain after the last node.
    #[error("{0} unused bits after the last node")]
    LeftoverBits(usize),

    /// The padding after the body bits is not all zero.
    #[error("non-zero padding after the body bits")]
    NonZeroPadding,

    /// A node has no edges.
    #[error("payload node {0} has no edges")]
    EmptyNode(usize),

    /// An edge continues although the root is the only node.
    #[error("node reference in a payload with a single node")]
    UnexpectedNodeReference,

    /// The edges of a node are not in canonical order.
    #[error("edges of payload node {0} are not sorted")]
    UnsortedEdges(usize),

    /// A node is entered through edges with different names.
    #[error("payload node {0} is reached under different names")]
    InconsistentNodeName(usize),

    /// A node cannot be reached from the root.
    #[error("payload node {0} is unreachable from the root")]
    UnreachableNode(usize),

    /// Following edges from the root leads back to a node already on the
    /// current walk.
    #[error("cycle through payload node {0}")]
    Cycle(usize),

    /// The payload expands to more paths than allowed.
    #[error("decoded path count exceeds the limit of {limit}")]
    TooManyPaths {
        /// The configured maximum.
        limit: u64,
    },

    /// The paths the payload expands to are longer in total than allowed.
    #[error("decoded path bytes exceed the limit of {limit}")]
    TooManyBytes {
        /// The configured maximum.
        limit: u64,
    },
}
