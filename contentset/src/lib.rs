#![deny(missing_docs)]

//! # Content Set Library
//!
//! This library packs the content paths a client is entitled to into
//! certificate extensions: either one extension per path for legacy clients,
//! or a single compacted payload (see [`pathpack`]) that expands back into
//! the exact same paths.

pub mod config;
pub mod error;
pub mod governor;
pub mod leb128;
pub mod logging;
pub mod pathpack;
pub mod prefix;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::Error;

/// Validates and encodes `paths` into a compacted payload.
///
/// Every path must be canonical (see [`prefix::validate_path`]); prefixes are
/// applied when decoding, never here.
#[tracing::instrument(skip_all, fields(path_count = paths.len()))]
pub fn encode_content_set<S: AsRef<str>>(paths: &[S]) -> Result<Vec<u8>, Error> {
    for path in paths {
        prefix::validate_path(path.as_ref())?;
    }

    let payload = pathpack::encode_paths(paths)?;
    tracing::debug!(payload_bytes = payload.len(), "encoded content set");

    Ok(payload)
}

/// Decodes a compacted payload, putting `prefix` in front of every path.
///
/// An empty `prefix` returns the paths as they were encoded.
#[tracing::instrument(skip_all, fields(payload_bytes = bytes.len()))]
pub fn decode_content_set(bytes: &[u8], prefix: &str) -> Result<Vec<String>, Error> {
    let paths = pathpack::decode_paths(bytes)?;
    tracing::debug!(path_count = paths.len(), "decoded content set");

    Ok(paths
        .into_iter()
        .map(|path| crate::prefix::join(prefix, &path))
        .collect())
}
