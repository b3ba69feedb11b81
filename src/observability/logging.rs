//! # Logging
//!
//! Tracing subscriber setup. Filter comes from `RUST_LOG`, falling back to
//! `secret_rotation=info`.

use crate::constants::DEFAULT_LOG_FILTER;
use tracing::warn;

/// Install the global tracing subscriber
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let result = if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };

    if let Err(e) = result {
        warn!("Tracing subscriber already initialized: {}", e);
    }
}
