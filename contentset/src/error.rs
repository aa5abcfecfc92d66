//! Top-level error type for the contentset crate.

use crate::pathpack::{DecodeError, EncodeError};
use crate::prefix::PathError;

/// Errors occurring while packaging or expanding content sets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload is malformed.
    #[error("could not decode content set payload: {0}")]
    Format(#[from] DecodeError),

    /// The paths could not be encoded.
    #[error("could not encode content set: {0}")]
    Encode(#[from] EncodeError),

    /// A caller supplied a path that would not round-trip.
    #[error("invalid content path: {0}")]
    InvalidPath(#[from] PathError),

    /// Legacy clients need one extension per content set, and there are more
    /// content sets than they can carry.
    #[error(
        "Too many content sets for certificate ({count} > {limit}). A newer client may be \
         available to address this problem."
    )]
    TooManyContentSets {
        /// Number of content sets requested.
        count: usize,
        /// Configured per-item limit.
        limit: usize,
    },

    /// The compacted payload is larger than the configured ceiling.
    #[error("encoded content set is {size} bytes, exceeding the limit of {limit} bytes")]
    EncodingOverflow {
        /// Payload size in bytes.
        size: usize,
        /// Configured maximum in bytes.
        limit: usize,
    },

    /// Loading the settings failed.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}
