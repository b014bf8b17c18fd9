//! Logging setup
//!
//! Console-only `tracing` subscriber for hosts embedding the client.
//! `RUST_LOG` overrides the level passed in.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logger at `info`, human-readable output
pub fn init_logger() -> Result<(), TryInitError> {
    init_logger_with_level("info", false)
}

/// Initialize the logger
///
/// # Arguments
/// * `level` - Log level or filter directive (e.g. "debug", "erm_client=trace")
/// * `json_format` - JSON lines instead of the compact human format
///
/// Fails if a global subscriber is already set.
pub fn init_logger_with_level(level: &str, json_format: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json_format {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init()
    }
}
