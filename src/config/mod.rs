//! # Rotation Configuration
//!
//! Configuration loaded from environment variables.
//!
//! All configuration has sensible defaults and can be overridden via environment
//! variables; the CLI layers its flags on top of the loaded values.

mod rotation;

pub use rotation::RotationConfig;

/// Load configuration from environment variables with defaults
pub fn load_config() -> RotationConfig {
    RotationConfig::from_env()
}
