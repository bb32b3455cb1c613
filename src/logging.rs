//! Logging configuration.
//!
//! The library only emits `tracing` events; binaries decide where they go.

use tracing_subscriber::EnvFilter;

/// Level used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "warn";

/// Initializes logging to stderr, keeping stdout free for query output.
///
/// Honors `RUST_LOG`.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes logging with an explicit filter, e.g. `"sql_connector=debug"`.
///
/// Falls back to the default level if the directive does not parse.
pub fn init_stderr_logging_with(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(filter_from(filter))
        .with_writer(std::io::stderr)
        .init();
}

fn filter_from(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
