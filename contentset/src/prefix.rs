//! Content prefixes and path validation.
//!
//! An owner may configure a prefix that is put in front of every content path
//! when a client reads its credential, optionally naming the client's
//! environment through the `$env` placeholder. The prefix is applied at
//! decode time; payloads only ever hold the bare paths.

use url::form_urlencoded;

/// Placeholder replaced by the environment name.
pub const ENVIRONMENT_PLACEHOLDER: &str = "$env";

/// Errors for paths that would not survive encoding unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// The path is empty or consists of a lone `/`.
    #[error("empty content path")]
    Empty,

    /// The path does not start with `/`.
    #[error("content path does not start with '/': {0:?}")]
    MissingLeadingSlash(String),

    /// The path contains `//`.
    #[error("content path contains an empty segment: {0:?}")]
    EmptySegment(String),

    /// The path ends with `/`.
    #[error("content path ends with '/': {0:?}")]
    TrailingSlash(String),

    /// The path contains a NUL byte.
    #[error("content path contains a NUL byte: {0:?}")]
    NulByte(String),
}

/// Checks that `path` is canonical: a leading `/`, no empty segments, no
/// trailing `/` and no NUL. Only canonical paths decode to exactly the
/// string that was encoded.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    if path.is_empty() || path == "/" {
        return Err(PathError::Empty);
    }
    if !path.starts_with('/') {
        return Err(PathError::MissingLeadingSlash(path.to_string()));
    }
    if path.contains('\0') {
        return Err(PathError::NulByte(path.to_string()));
    }
    if path.ends_with('/') {
        return Err(PathError::TrailingSlash(path.to_string()));
    }
    if path.contains("//") {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(())
}

/// Joins `prefix` and `path` with exactly one `/` between them. An empty
/// prefix leaves the path untouched.
pub fn join(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    joined.push_str(prefix);
    joined.push('/');
    joined.push_str(path);
    joined
}

/// A cleaned content prefix, either empty or of the form `/a/b/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContentPrefix(String);

impl ContentPrefix {
    /// Resolves an owner's prefix template for a client.
    ///
    /// `$env` is replaced with the environment name when the client has an
    /// environment, and left in place otherwise. A blank template means no
    /// prefix.
    pub fn resolve(template: &str, environment: Option<&str>) -> Self {
        if template.trim().is_empty() {
            return Self::default();
        }

        match environment {
            Some(environment) => Self::clean(&template.replace(ENVIRONMENT_PLACEHOLDER, environment)),
            None => Self::clean(template),
        }
    }

    /// Form-URL-encodes every non-empty part of `raw` and rebuilds it as
    /// `/part/.../`. A `$` survives encoding so that clients can still expand
    /// `$env` themselves.
    pub fn clean(raw: &str) -> Self {
        let mut cleaned = String::from("/");
        for part in raw.split('/').filter(|part| !part.is_empty()) {
            cleaned.extend(form_urlencoded::byte_serialize(part.as_bytes()));
            cleaned.push('/');
        }
        Self(cleaned.replace("%24", "$"))
    }

    /// The prefix text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether there is no prefix.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Puts the prefix in front of `path`.
    pub fn apply(&self, path: &str) -> String {
        join(&self.0, path)
    }
}

impl std::fmt::Display for ContentPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
