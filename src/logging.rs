//! Tracing subscriber setup for the binary
//!
//! The library only emits events; installing a subscriber is left to the
//! application. The CLI calls [`init`] once at startup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives
pub const LOG_ENV: &str = "SCHEMAFORGE_LOG";

/// Filter used when `SCHEMAFORGE_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "warn";

/// Install a global subscriber writing to stderr.
///
/// Returns an error if a global subscriber is already installed.
pub fn init(json: bool) -> Result<(), String> {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| format!("Failed to initialize subscriber: {e}"))
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| format!("Failed to initialize subscriber: {e}"))
    }
}
