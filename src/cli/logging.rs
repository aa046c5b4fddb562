//! Diagnostic logging with the tracing crate.
//!
//! Diagnostics go to stderr next to the presenter's status lines.
//! The level is read from `AUDIOREC_LOG` (defaults to "warn").

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "AUDIOREC_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Build the filter from `AUDIOREC_LOG`, falling back to "warn"
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_logging() {
    let result = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
