//! Logging setup utilities for the Dengon relay.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the server library crate, the shared crate and the binary
/// itself. `tower_http` is included so request traces show up at the same level.
/// The whole filter can be overridden with the `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use dengon_shared::logger::setup_logger;
///
/// setup_logger("dengon_server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "dengon_server={level},dengon_shared={level},{binary}={level},tower_http={level}",
                    level = default_log_level,
                    binary = binary_name.replace('-', "_"),
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
