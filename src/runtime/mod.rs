//! # Runtime Module
//!
//! Runtime components for the rotation binary: start-up wiring, retry backoff
//! and the sequential runner that drives all four steps.

pub mod backoff;
pub mod initialization;
pub mod runner;

pub use backoff::FibonacciBackoff;
pub use initialization::{initialize, InitOptions, InitializationResult};
pub use runner::{RotationOutcome, RotationRunner};
