//! Lingua CLI library

pub mod commands;
pub mod error;
pub mod render;

use tracing_subscriber::EnvFilter;

/// Install the log subscriber; `RUST_LOG` overrides the configured level
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
