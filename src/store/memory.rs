//! # In-Memory Secret Store
//!
//! Process-local [`SecretStore`] with the same stage semantics as AWS Secrets Manager:
//!
//! - Versions are keyed by the client request token that created them
//! - Stage labels are exclusive per secret
//! - Moving `AWSCURRENT` attaches `AWSPREVIOUS` to the version that lost it
//! - Every mutation happens under one write lock, so stage moves are atomic

use super::{SecretStore, SecretValue, VersionSelector, VersionStages};
use crate::constants::{STAGE_CURRENT, STAGE_PREVIOUS};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredVersion {
    secret_string: String,
    stages: Vec<String>,
}

impl StoredVersion {
    fn has_stage(&self, stage: &str) -> bool {
        self.stages.iter().any(|s| s == stage)
    }

    fn add_stage(&mut self, stage: &str) {
        if !self.has_stage(stage) {
            self.stages.push(stage.to_string());
        }
    }

    fn remove_stage(&mut self, stage: &str) {
        self.stages.retain(|s| s != stage);
    }
}

#[derive(Debug, Default)]
struct StoredSecret {
    versions: HashMap<String, StoredVersion>,
}

impl StoredSecret {
    fn holder_of(&self, stage: &str) -> Option<String> {
        self.versions
            .iter()
            .find(|(_, v)| v.has_stage(stage))
            .map(|(id, _)| id.clone())
    }

    /// Detach `stage` from every version except `keep`
    fn detach_everywhere_but(&mut self, stage: &str, keep: &str) {
        for (id, version) in &mut self.versions {
            if id != keep {
                version.remove_stage(stage);
            }
        }
    }
}

/// In-memory secret store
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, StoredSecret>>,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a secret with a single version labelled `AWSCURRENT`
    #[must_use]
    pub fn with_current(mut self, secret_id: &str, version_id: &str, secret_string: &str) -> Self {
        let secret = self
            .secrets
            .get_mut()
            .entry(secret_id.to_string())
            .or_default();
        secret.detach_everywhere_but(STAGE_CURRENT, version_id);
        secret.versions.insert(
            version_id.to_string(),
            StoredVersion {
                secret_string: secret_string.to_string(),
                stages: vec![STAGE_CURRENT.to_string()],
            },
        );
        self
    }

    /// Number of versions stored for a secret (0 when the secret is unknown)
    pub async fn version_count(&self, secret_id: &str) -> usize {
        self.secrets
            .read()
            .await
            .get(secret_id)
            .map_or(0, |s| s.versions.len())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: VersionSelector<'_>,
    ) -> Result<SecretValue, StoreError> {
        let secrets = self.secrets.read().await;
        let secret = secrets
            .get(secret_id)
            .ok_or_else(|| StoreError::NotFound(format!("secret {secret_id} does not exist")))?;

        let (version_id, version) = match (selector.version_id, selector.stage) {
            (Some(version_id), stage) => {
                let version = secret.versions.get(version_id).ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "version {version_id} of {secret_id} does not exist"
                    ))
                })?;
                if let Some(stage) = stage {
                    if !version.has_stage(stage) {
                        return Err(StoreError::NotFound(format!(
                            "version {version_id} of {secret_id} is not labelled {stage}"
                        )));
                    }
                }
                (version_id.to_string(), version)
            }
            (None, stage) => {
                let stage = stage.unwrap_or(STAGE_CURRENT);
                let version_id = secret.holder_of(stage).ok_or_else(|| {
                    StoreError::NotFound(format!("no version of {secret_id} is labelled {stage}"))
                })?;
                let version = &secret.versions[&version_id];
                (version_id, version)
            }
        };

        Ok(SecretValue {
            version_id,
            secret_string: Some(version.secret_string.clone()),
            stages: version.stages.clone(),
        })
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        stages: &[&str],
    ) -> Result<(), StoreError> {
        let mut secrets = self.secrets.write().await;
        let secret = secrets
            .get_mut(secret_id)
            .ok_or_else(|| StoreError::NotFound(format!("secret {secret_id} does not exist")))?;

        if secret.versions.contains_key(client_request_token) {
            return Err(StoreError::AlreadyExists(format!(
                "version {client_request_token} of {secret_id} already exists"
            )));
        }

        for stage in stages {
            secret.detach_everywhere_but(stage, client_request_token);
        }
        secret.versions.insert(
            client_request_token.to_string(),
            StoredVersion {
                secret_string: secret_string.to_string(),
                stages: stages.iter().map(ToString::to_string).collect(),
            },
        );
        debug!(secret_id, version_id = client_request_token, ?stages, "stored new version");
        Ok(())
    }

    async fn describe_secret(&self, secret_id: &str) -> Result<VersionStages, StoreError> {
        let secrets = self.secrets.read().await;
        let secret = secrets
            .get(secret_id)
            .ok_or_else(|| StoreError::NotFound(format!("secret {secret_id} does not exist")))?;

        Ok(secret
            .versions
            .iter()
            .filter(|(_, v)| !v.stages.is_empty())
            .map(|(id, v)| (id.clone(), v.stages.clone()))
            .collect())
    }

    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: &str,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut secrets = self.secrets.write().await;
        let secret = secrets
            .get_mut(secret_id)
            .ok_or_else(|| StoreError::NotFound(format!("secret {secret_id} does not exist")))?;

        if let Some(to) = move_to_version_id {
            if !secret.versions.contains_key(to) {
                return Err(StoreError::NotFound(format!(
                    "version {to} of {secret_id} does not exist"
                )));
            }
        }
        if let Some(from) = remove_from_version_id {
            let holds = secret.versions.get(from).is_some_and(|v| v.has_stage(stage));
            if !holds {
                return Err(StoreError::Conflict(format!(
                    "version {from} of {secret_id} is not labelled {stage}"
                )));
            }
        }

        // The label can only leave a version the caller named explicitly.
        let holder = secret.holder_of(stage);
        if let (Some(to), Some(holder)) = (move_to_version_id, holder.as_deref()) {
            if holder != to && remove_from_version_id != Some(holder) {
                return Err(StoreError::Conflict(format!(
                    "{stage} is attached to {holder}; remove_from_version_id must name it"
                )));
            }
        }

        if move_to_version_id.is_some() && move_to_version_id == remove_from_version_id {
            return Ok(());
        }

        if let Some(from) = remove_from_version_id {
            if let Some(version) = secret.versions.get_mut(from) {
                version.remove_stage(stage);
            }
        }
        if let Some(to) = move_to_version_id {
            if let Some(version) = secret.versions.get_mut(to) {
                version.add_stage(stage);
            }
            if stage == STAGE_CURRENT {
                if let Some(from) = remove_from_version_id {
                    secret.detach_everywhere_but(STAGE_PREVIOUS, from);
                    if let Some(version) = secret.versions.get_mut(from) {
                        version.add_stage(STAGE_PREVIOUS);
                    }
                }
            }
        }

        debug!(
            secret_id,
            stage,
            move_to = move_to_version_id,
            remove_from = remove_from_version_id,
            "updated version stage"
        );
        Ok(())
    }
}
