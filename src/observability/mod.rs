//! # Observability
//!
//! Logging setup and Prometheus metrics for rotation steps.

pub mod logging;
pub mod metrics;
