//! Configuration management for content-set packaging
use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use std::path::Path;

use crate::config::error::ContentSetConfigError;
use crate::governor::GovernorConfig;
use crate::governor::DEFAULT_PER_ITEM_LIMIT;

mod error;

/// Trait for validating configuration values.
trait Validatable {
    /// Validate the configuration values.
    fn validate(&self, cfg: &Settings) -> Result<(), ConfigError>;
}

/// Top-level configuration
#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    /// Extension size limits
    pub governor: GovernorConfig,
}

impl Validatable for GovernorConfig {
    fn validate(&self, _: &Settings) -> Result<(), ConfigError> {
        if self.per_item_limit == 0 {
            return Err(ConfigError::Message(
                ContentSetConfigError::ZeroValueForbidden("governor.per_item_limit").to_string(),
            ));
        }
        if self.max_payload_bytes == Some(0) {
            return Err(ConfigError::Message(
                ContentSetConfigError::ZeroValueForbidden("governor.max_payload_bytes")
                    .to_string(),
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Initializing the global config first with default values and then with
    /// provided/overwritten environment variables. The explicit separator with
    /// double underscores is needed to correctly parse the nested config
    /// structure.
    ///
    /// The environment variables are prefixed with `CONTENTSET_` and the
    /// nested fields are separated with double underscores (`__`):
    ///
    /// ```text
    /// CONTENTSET_GOVERNOR__PER_ITEM_LIMIT
    /// ^^^^^^^^^^ ^^^^^^^^  ^^^^^^^^^^^^^^
    ///    │          │      └ The `per_item_limit` field of `GovernorConfig`
    ///    │          └ The `governor` field of the root object (`Settings`)
    ///    └ with_prefix("CONTENTSET"), prefix_separator("_")
    /// ```
    pub fn new(config_path: Option<impl AsRef<Path>>) -> Result<Self, ConfigError> {
        let env = Environment::with_prefix("CONTENTSET")
            .separator("__")
            .try_parsing(true)
            .prefix_separator("_");

        let mut cfg_builder = Config::builder();
        cfg_builder =
            cfg_builder.set_default("governor.per_item_limit", DEFAULT_PER_ITEM_LIMIT as i64)?;

        if let Some(path) = config_path {
            cfg_builder = cfg_builder.add_source(File::from(path.as_ref()));
        }
        cfg_builder = cfg_builder.add_source(env);

        let cfg = cfg_builder.build()?;

        let settings: Settings = cfg.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Perform validation on the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.governor.validate(self)?;

        Ok(())
    }
}
