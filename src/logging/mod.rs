//! Logging Module
//!
//! Console tracing setup. Filter with `RUST_LOG`, e.g.
//! `RUST_LOG=ladder_bot_rust=debug`.

use tracing_subscriber::EnvFilter;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Default to debug level when `RUST_LOG` is unset
    pub debug: bool,
}

fn default_filter(config: &TracingConfig) -> EnvFilter {
    let level = if config.debug { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global fmt subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(config: &TracingConfig) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(default_filter(config))
        .with_target(config.debug)
        .compact()
        .try_init()
}
