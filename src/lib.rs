//! # Secret Rotation
//!
//! Four-step secret rotation for AWS Secrets Manager style stores.
//!
//! A rotation creates a new secret version labelled `AWSPENDING`, hands it to
//! downstream systems, validates it and finally moves `AWSCURRENT` onto it. The
//! previous version keeps `AWSPREVIOUS` for rollback.
//!
//! ```no_run
//! use secret_rotation::rotation::RotationCoordinator;
//! use secret_rotation::store::InMemorySecretStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), secret_rotation::error::RotationError> {
//! let store = Arc::new(
//!     InMemorySecretStore::new().with_current("app", "v1", r#"{"apiVersion":1}"#),
//! );
//! let coordinator = RotationCoordinator::new(store);
//! for step in ["createSecret", "setSecret", "testSecret", "finishSecret"] {
//!     coordinator.rotate("app", "tok123", step).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod observability;
pub mod rotation;
pub mod runtime;
pub mod store;

pub use error::{RotationError, StoreError};
pub use rotation::{RotationCoordinator, RotationEvent, RotationRequest, RotationResponse, Step};
