//! Logging setup for binaries embedding the codec.

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVES: &str = "info,contentset=debug";

/// Installs a JSON subscriber as the global default. `RUST_LOG` overrides
/// [`DEFAULT_DIRECTIVES`].
///
/// Returns an error when a global subscriber has already been installed.
pub fn setup_logging() -> Result<(), tracing_subscriber::util::TryInitError> {
    let main_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_target(false)
        .with_current_span(true)
        .with_span_list(true)
        .with_line_number(true)
        .with_file(true)
        .with_timer(UtcTime::rfc_3339());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES)))
        .with(main_layer)
        .try_init()
}
