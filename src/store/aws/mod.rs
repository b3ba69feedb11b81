//! # AWS Secrets Manager Store
//!
//! [`SecretStore`] backed by the official AWS Rust SDK.
//!
//! The client is built once by the caller and handed to the rotation
//! coordinator; nothing here keeps process-wide state.

mod auth;

pub use auth::create_sdk_config;

use super::{SecretStore, SecretValue, VersionSelector, VersionStages};
use crate::config::RotationConfig;
use crate::error::StoreError;
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use std::time::Instant;
use tracing::{debug, warn};

/// AWS error codes the store distinguishes
pub mod aws_error_codes {
    pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFoundException";
    pub const RESOURCE_EXISTS: &str = "ResourceExistsException";
    pub const INVALID_PARAMETER: &str = "InvalidParameterException";
    pub const INVALID_REQUEST: &str = "InvalidRequestException";
}

/// AWS Secrets Manager store
pub struct AwsSecretsManagerStore {
    client: SecretsManagerClient,
    region: String,
}

impl std::fmt::Debug for AwsSecretsManagerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsSecretsManagerStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsSecretsManagerStore {
    /// Build a store from rotation configuration (region and optional endpoint override)
    pub async fn from_config(config: &RotationConfig) -> Self {
        let sdk_config = create_sdk_config(&config.region, config.endpoint.as_deref()).await;
        Self {
            client: SecretsManagerClient::new(&sdk_config),
            region: config.region.clone(),
        }
    }

    /// Wrap an existing SDK client
    pub fn new(client: SecretsManagerClient, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }
}

/// Map an SDK error onto the store error taxonomy by its AWS error code
fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(ToString::to_string);
    let message = format!("{operation}: {}", DisplayErrorContext(&err));
    match code.as_deref() {
        Some(aws_error_codes::RESOURCE_NOT_FOUND) => StoreError::NotFound(message),
        Some(aws_error_codes::RESOURCE_EXISTS) => StoreError::AlreadyExists(message),
        Some(aws_error_codes::INVALID_PARAMETER | aws_error_codes::INVALID_REQUEST)
            if operation == "UpdateSecretVersionStage" =>
        {
            StoreError::Conflict(message)
        }
        _ => {
            warn!(operation, code = ?code, "AWS Secrets Manager call failed");
            StoreError::Service(message)
        }
    }
}

#[async_trait]
impl SecretStore for AwsSecretsManagerStore {
    async fn get_secret_value(
        &self,
        secret_id: &str,
        selector: VersionSelector<'_>,
    ) -> Result<SecretValue, StoreError> {
        let start = Instant::now();
        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .set_version_id(selector.version_id.map(ToString::to_string))
            .set_version_stage(selector.stage.map(ToString::to_string))
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetSecretValue", e))?;
        debug!(secret_id, elapsed_ms = start.elapsed().as_millis(), "GetSecretValue");

        let version_id = output
            .version_id()
            .ok_or_else(|| StoreError::Service("GetSecretValue returned no VersionId".to_string()))?
            .to_string();
        Ok(SecretValue {
            version_id,
            secret_string: output.secret_string().map(ToString::to_string),
            stages: output.version_stages().to_vec(),
        })
    }

    async fn put_secret_value(
        &self,
        secret_id: &str,
        client_request_token: &str,
        secret_string: &str,
        stages: &[&str],
    ) -> Result<(), StoreError> {
        let start = Instant::now();
        self.client
            .put_secret_value()
            .secret_id(secret_id)
            .client_request_token(client_request_token)
            .secret_string(secret_string)
            .set_version_stages(Some(stages.iter().map(ToString::to_string).collect()))
            .send()
            .await
            .map_err(|e| classify_sdk_error("PutSecretValue", e))?;
        debug!(secret_id, elapsed_ms = start.elapsed().as_millis(), "PutSecretValue");
        Ok(())
    }

    async fn describe_secret(&self, secret_id: &str) -> Result<VersionStages, StoreError> {
        let output = self
            .client
            .describe_secret()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error("DescribeSecret", e))?;
        Ok(output.version_ids_to_stages().cloned().unwrap_or_default())
    }

    async fn update_version_stage(
        &self,
        secret_id: &str,
        stage: &str,
        move_to_version_id: Option<&str>,
        remove_from_version_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.client
            .update_secret_version_stage()
            .secret_id(secret_id)
            .version_stage(stage)
            .set_move_to_version_id(move_to_version_id.map(ToString::to_string))
            .set_remove_from_version_id(remove_from_version_id.map(ToString::to_string))
            .send()
            .await
            .map_err(|e| classify_sdk_error("UpdateSecretVersionStage", e))?;
        Ok(())
    }
}
