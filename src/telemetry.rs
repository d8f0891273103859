//! Tracing subscriber setup

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Build the filter: `RUST_LOG` wins, otherwise the configured level for this
/// crate and `warn` for everything else.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tripsense={}", config.level)))
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(config: &LoggingConfig) {
    TRACING_INIT.get_or_init(|| {
        let filter = env_filter(config);
        let result = if config.format == "json" {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_current_span(true)
                .try_init()
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("tracing subscriber already installed: {e}");
        }
    });
}
