//! # Store Failure Tests
//!
//! Step behaviour when the secret store misbehaves or holds unexpected state.
//!
//! These tests verify:
//! - A failed write in createSecret is a retryable `CreateFailed`
//! - finishSecret reports `NotFound` for a missing secret or current version
//! - A failed read in testSecret is a retryable `Store` error
//! - A binary-only pending version fails validation and is not retried

use async_trait::async_trait;
use secret_rotation::config::RotationConfig;
use secret_rotation::constants::{STAGE_CURRENT, STAGE_PENDING};
use secret_rotation::rotation::RotationCoordinator;
use secret_rotation::runtime::RotationRunner;
use secret_rotation::store::{
    version_with_stage, InMemorySecretStore, SecretStore, SecretValue, VersionSelector,
    VersionStages,
};
use secret_rotation::{RotationError, StoreError};
use std::sync::Arc;

const SECRET: &str = "app/config";

/// In-memory store with injectable read and write faults
#[derive(Debug, Default)]
struct FaultyStore {
    inner: InMemorySecretStore,
    fail_puts: bool,
    /// Reads of versions carrying this stage fail with a service error
    fail_reads_in_stage: Option<&'static str>,
    /// Versions returned without a secret string, as if stored as binary
    binary_versions: Vec<&'static str>,
}

impl FaultyStore {
    fn seeded() -> Self {
        Self {
            inner: InMemorySecretStore::new().with_current(SECRET, "v1", r#"{"apiVersion": 1}"#),
            ..Self::default()
        }
    }
}

#[async_trait]
impl SecretStore for FaultyStore {
    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: VersionSelector<'_>,
    ) -> Result<SecretValue, StoreError> {
        if self.fail_reads_in_stage.is_some() && selector.stage == self.fail_reads_in_stage {
            return Err(StoreError::Service("ThrottlingException".to_string()));
        }
        let mut value = self.inner.get_secret_value(secret_id, selector).await?;
        if self.binary_versions.contains(&value.version_id.as_str()) {
            value.secret_string = None;
        }
        Ok(value)
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        stages: &[&str],
    ) -> Result<(), StoreError> {
        if self.fail_puts {
            return Err(StoreError::Service("ThrottlingException".to_string()));
        }
        self.inner
            .put_secret_value(secret_id, client_request_token, secret_string, stages)
            .await
    }

    async fn describe_secret(&self, secret_id: &str) -> Result<VersionStages, StoreError> {
        self.inner.describe_secret(secret_id).await
    }

    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: &str,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.inner
            .update_version_stage(secret_id, stage, move_to_version_id, remove_from_version_id)
            .await
    }
}

#[tokio::test]
async fn test_create_secret_write_failure_is_retryable() {
    let store = Arc::new(FaultyStore {
        fail_puts: true,
        ..FaultyStore::seeded()
    });
    let coordinator = RotationCoordinator::new(store.clone());

    let err = coordinator
        .rotate(SECRET, "tok123", "createSecret")
        .await
        .unwrap_err();
    assert!(matches!(err, RotationError::CreateFailed { .. }));
    assert!(err.is_retryable());
    assert_eq!(store.inner.version_count(SECRET).await, 1);
}

#[tokio::test]
async fn test_finish_secret_without_current_version_is_not_found() {
    let store = Arc::new(FaultyStore::seeded());
    store
        .put_secret_value(SECRET, "tok123", r#"{"apiVersion": 1}"#, &[STAGE_PENDING])
        .await
        .unwrap();
    store
        .update_version_stage(SECRET, STAGE_CURRENT, None, Some("v1"))
        .await
        .unwrap();

    let coordinator = RotationCoordinator::new(store.clone());
    let err = coordinator
        .rotate(SECRET, "tok123", "finishSecret")
        .await
        .unwrap_err();
    match &err {
        RotationError::NotFound { message, .. } => {
            assert_eq!(message, "No current version found");
        }
        other => panic!("expected NotFound error, got {other:?}"),
    }

    let versions = store.describe_secret(SECRET).await.unwrap();
    assert_eq!(version_with_stage(&versions, STAGE_CURRENT), None);
    assert_eq!(version_with_stage(&versions, STAGE_PENDING), Some("tok123"));
}

#[tokio::test]
async fn test_finish_secret_unknown_secret_is_not_found() {
    let coordinator = RotationCoordinator::new(Arc::new(FaultyStore::seeded()));
    let err = coordinator
        .rotate("other/secret", "tok123", "finishSecret")
        .await
        .unwrap_err();
    assert!(matches!(err, RotationError::NotFound { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_test_secret_read_failure_is_store_error() {
    let store = Arc::new(FaultyStore {
        fail_reads_in_stage: Some(STAGE_PENDING),
        ..FaultyStore::seeded()
    });
    let coordinator = RotationCoordinator::new(store.clone());
    coordinator
        .rotate(SECRET, "tok123", "createSecret")
        .await
        .unwrap();

    let err = coordinator
        .rotate(SECRET, "tok123", "testSecret")
        .await
        .unwrap_err();
    match &err {
        RotationError::Store { source, .. } => {
            assert!(matches!(source, StoreError::Service(_)));
        }
        other => panic!("expected Store error, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_binary_pending_version_fails_validation_without_retry() {
    let store = Arc::new(FaultyStore {
        binary_versions: vec!["tok123"],
        ..FaultyStore::seeded()
    });
    let config = RotationConfig {
        max_attempts: 3,
        backoff_base_ms: 1,
        backoff_max_ms: 5,
        ..RotationConfig::default()
    };
    let runner = RotationRunner::new(RotationCoordinator::new(store.clone()), &config);

    let err = runner.run(SECRET, "tok123").await.unwrap_err();
    match &err {
        RotationError::Validation { message, .. } => {
            assert!(message.contains("SecretString"), "unexpected message: {message}");
        }
        other => panic!("expected Validation error, got {other:?}"),
    }
    assert!(!err.is_retryable());

    let versions = store.describe_secret(SECRET).await.unwrap();
    assert_eq!(version_with_stage(&versions, STAGE_CURRENT), Some("v1"));
}
