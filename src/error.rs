//! # Rotation Error Types
//!
//! Errors raised by the secret store and by the rotation step handlers.
//!
//! Store errors are classified so the step handlers can recognise the one
//! recoverable condition (a version already exists for the token). Rotation
//! errors carry the step-level taxonomy surfaced to the caller.

use thiserror::Error;

/// Boxed error used where the failure may come from the store or from a strategy
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error reported by a [`SecretStore`](crate::store::SecretStore) implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Secret, version or stage does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// A version is already associated with the client request token
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Stage move rejected because the store state changed underneath the caller
    #[error("conflict: {0}")]
    Conflict(String),
    /// Any other failure talking to the store
    #[error("secret store error: {0}")]
    Service(String),
}

impl StoreError {
    /// True when the store reported a missing secret, version or stage
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// True when the store reported an existing version for the token
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Error returned by the rotation coordinator and step handlers
#[derive(Debug, Error)]
pub enum RotationError {
    /// Step name is not one of the four protocol steps
    #[error("invalid step: {0}")]
    InvalidStep(String),
    /// Expected store state is absent (step invoked out of order or too early)
    #[error("secret {secret_id}: {message}")]
    NotFound { secret_id: String, message: String },
    /// Deriving or storing the pending version failed
    #[error("createSecret failed for {secret_id}: {source}")]
    CreateFailed {
        secret_id: String,
        #[source]
        source: BoxError,
    },
    /// Propagating the pending version to a downstream system failed
    #[error("setSecret failed for {secret_id}: {message}")]
    SetSecret { secret_id: String, message: String },
    /// Pending payload failed validation
    #[error("validation failed for {secret_id}: {message}")]
    Validation { secret_id: String, message: String },
    /// Promoting the pending version to current failed
    #[error("finishSecret failed for {secret_id}: {source}")]
    FinishFailed {
        secret_id: String,
        #[source]
        source: StoreError,
    },
    /// Store failure outside a step-specific mapping
    #[error("secret store error for {secret_id}: {source}")]
    Store {
        secret_id: String,
        #[source]
        source: StoreError,
    },
}

impl RotationError {
    pub(crate) fn not_found(secret_id: &str, message: impl Into<String>) -> Self {
        RotationError::NotFound {
            secret_id: secret_id.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn validation(secret_id: &str, message: impl Into<String>) -> Self {
        RotationError::Validation {
            secret_id: secret_id.to_string(),
            message: message.into(),
        }
    }

    /// Error kind for metrics labels and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationError::InvalidStep(_) => "invalid_step",
            RotationError::NotFound { .. } => "not_found",
            RotationError::CreateFailed { .. } => "create_failed",
            RotationError::SetSecret { .. } => "set_secret",
            RotationError::Validation { .. } => "validation",
            RotationError::FinishFailed { .. } => "finish_failed",
            RotationError::Store { .. } => "store",
        }
    }

    /// Whether a trigger may retry the same step with the same token
    ///
    /// Step handlers are idempotent, so store-side failures are safe to retry.
    /// Sequencing, validation and propagation failures are not, and neither is
    /// a `createSecret` failure that came from the payload rather than the store.
    pub fn is_retryable(&self) -> bool {
        match self {
            RotationError::CreateFailed { source, .. } => source.is::<StoreError>(),
            RotationError::FinishFailed { .. } | RotationError::Store { .. } => true,
            _ => false,
        }
    }
}
