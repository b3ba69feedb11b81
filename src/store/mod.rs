//! # Secret Store
//!
//! Abstract interface over the secrets-management service holding secret versions.
//!
//! The rotation steps only ever talk to the store through [`SecretStore`], so a
//! real AWS Secrets Manager client and the in-memory fake used in tests are
//! interchangeable.
//!
//! - `aws`: AWS Secrets Manager backed store
//! - `memory`: in-process store with the same stage semantics

pub mod aws;
pub mod memory;

pub use aws::AwsSecretsManagerStore;
pub use memory::InMemorySecretStore;

use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Version ids mapped to the stage labels they carry
pub type VersionStages = HashMap<String, Vec<String>>;

/// One secret version as returned by [`SecretStore::get_secret_value`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretValue {
    pub version_id: String,
    /// Raw secret string; `None` for versions stored only as binary
    pub secret_string: Option<String>,
    pub stages: Vec<String>,
}

/// Selects a version by id, by stage, or both
///
/// When both are set the version must carry the stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionSelector<'a> {
    pub version_id: Option<&'a str>,
    pub stage: Option<&'a str>,
}

impl<'a> VersionSelector<'a> {
    pub fn stage(stage: &'a str) -> Self {
        Self {
            version_id: None,
            stage: Some(stage),
        }
    }

    pub fn version_in_stage(version_id: &'a str, stage: &'a str) -> Self {
        Self {
            version_id: Some(version_id),
            stage: Some(stage),
        }
    }
}

/// Contract every secret store must honour
///
/// Stage labels are exclusive per secret, and `update_version_stage` is atomic:
/// no reader observes a state where both or neither version holds a moved label.
#[async_trait]
pub trait SecretStore: Send + Sync + std::fmt::Debug {
    /// Fetch a version by id and/or stage
    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: VersionSelector<'_>,
    ) -> Result<SecretValue, StoreError>;

    /// Store a new version keyed by the client request token
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the token already has a version.
    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        stages: &[&str],
    ) -> Result<(), StoreError>;

    /// Map every version of the secret to its stage labels
    async fn describe_secret(&self, secret_id: &str) -> Result<VersionStages, StoreError>;

    /// Atomically attach `stage` to `move_to_version_id` and detach it from
    /// `remove_from_version_id`
    ///
    /// With only `remove_from_version_id` set the label is simply detached.
    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: &str,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Find the version carrying `stage` in a describe result
pub fn version_with_stage<'a>(versions: &'a VersionStages, stage: &str) -> Option<&'a str> {
    versions
        .iter()
        .find(|(_, stages)| stages.iter().any(|s| s == stage))
        .map(|(version_id, _)| version_id.as_str())
}
