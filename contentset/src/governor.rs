//! Choosing between per-item extensions and the compacted payload.
//!
//! Legacy clients read one certificate extension per content set, which
//! limits how many content sets they can be given. Newer clients read a
//! single compacted payload with no such limit. The caller decides which kind
//! of client it is issuing for; the governor enforces the limits that go with
//! that choice and produces the extension data.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::Error;
use crate::prefix::{validate_path, ContentPrefix};

/// Most content sets a legacy client can carry.
pub const DEFAULT_PER_ITEM_LIMIT: usize = 185;

/// How content sets are carried in a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionFormat {
    /// One extension per content set, for legacy clients.
    PerItem,
    /// A single compacted payload.
    Compacted,
}

/// Limits applied by the [`ExtensionSizeGovernor`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GovernorConfig {
    /// Most content sets allowed in [`ExtensionFormat::PerItem`] form.
    #[serde(default = "default_per_item_limit")]
    pub per_item_limit: usize,
    /// Largest compacted payload accepted, in bytes. No limit when unset.
    #[serde(default)]
    pub max_payload_bytes: Option<usize>,
}

fn default_per_item_limit() -> usize {
    DEFAULT_PER_ITEM_LIMIT
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            per_item_limit: DEFAULT_PER_ITEM_LIMIT,
            max_payload_bytes: None,
        }
    }
}

/// The outcome of [`ExtensionSizeGovernor::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionPlan {
    /// Emit one extension per content set.
    PerItem,
    /// Emit the compacted payload.
    Compacted,
}

/// Extension data ready to be embedded in a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentExtensions {
    /// Prefixed content paths, one extension each.
    PerItem(Vec<String>),
    /// The compacted payload. The prefix is applied by the reader.
    Compacted {
        /// Encoded bytes.
        payload: Vec<u8>,
        /// Number of paths in the payload.
        path_count: usize,
    },
}

/// Enforces the extension size limits for a credential.
#[derive(Debug, Clone, Default)]
pub struct ExtensionSizeGovernor {
    config: GovernorConfig,
}

impl ExtensionSizeGovernor {
    /// Creates a governor with the given limits.
    pub fn new(config: GovernorConfig) -> Self {
        Self { config }
    }

    /// The limits in force.
    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Decides how `count` content sets are carried in `format`.
    pub fn plan(&self, count: usize, format: ExtensionFormat) -> Result<ExtensionPlan, Error> {
        match format {
            ExtensionFormat::PerItem if count > self.config.per_item_limit => {
                Err(Error::TooManyContentSets {
                    count,
                    limit: self.config.per_item_limit,
                })
            }
            ExtensionFormat::PerItem => Ok(ExtensionPlan::PerItem),
            ExtensionFormat::Compacted => Ok(ExtensionPlan::Compacted),
        }
    }

    /// Produces the extension data for `paths`.
    ///
    /// The per-item limit applies to distinct paths. Per-item extensions
    /// carry each distinct path once, prefixed, in first-seen order. The
    /// compacted payload carries the bare paths as given, and fails with
    /// [`Error::EncodingOverflow`] when it is larger than the configured
    /// maximum.
    #[tracing::instrument(skip_all, fields(path_count = paths.len(), ?format))]
    pub fn package<S: AsRef<str>>(
        &self,
        prefix: &ContentPrefix,
        paths: &[S],
        format: ExtensionFormat,
    ) -> Result<ContentExtensions, Error> {
        let mut seen = HashSet::with_capacity(paths.len());
        let distinct: Vec<&str> = paths
            .iter()
            .map(|path| path.as_ref())
            .filter(|path| seen.insert(*path))
            .collect();

        match self.plan(distinct.len(), format)? {
            ExtensionPlan::PerItem => {
                let mut extensions = Vec::with_capacity(distinct.len());
                for path in distinct {
                    validate_path(path)?;
                    extensions.push(prefix.apply(path));
                }
                tracing::debug!(extensions = extensions.len(), "packaged per-item content sets");
                Ok(ContentExtensions::PerItem(extensions))
            }
            ExtensionPlan::Compacted => {
                let payload = crate::encode_content_set(paths)?;
                let size = payload.len();
                tracing::debug!(payload_bytes = size, "packaged compacted content sets");

                if let Some(limit) = self.config.max_payload_bytes {
                    if size > limit {
                        tracing::warn!(payload_bytes = size, limit, "compacted content sets too large");
                        return Err(Error::EncodingOverflow { size, limit });
                    }
                }

                Ok(ContentExtensions::Compacted { payload, path_count: paths.len() })
            }
        }
    }
}
