/// Configuration error variants.
#[derive(Debug, thiserror::Error)]
pub enum ContentSetConfigError {
    /// An error returned for limits that must be positive.
    #[error("The value for {0} must be nonzero")]
    ZeroValueForbidden(&'static str),
}
