//! # finishSecret
//!
//! Promotes the pending version: `AWSCURRENT` moves to the token's version in a
//! single store call, then `AWSPENDING` is detached from it.

use crate::constants::{STAGE_CURRENT, STAGE_PENDING};
use crate::error::{RotationError, StoreError};
use crate::store::{version_with_stage, SecretStore};
use tracing::info;

pub async fn finish_secret(
    store: &dyn SecretStore,
    secret_id: &str,
    token: &str,
) -> Result<(), RotationError> {
    let finish_failed = |source: StoreError| RotationError::FinishFailed {
        secret_id: secret_id.to_string(),
        source,
    };

    let versions = store.describe_secret(secret_id).await.map_err(|e| {
        if e.is_not_found() {
            RotationError::not_found(secret_id, format!("secret does not exist: {e}"))
        } else {
            finish_failed(e)
        }
    })?;

    let current_version = version_with_stage(&versions, STAGE_CURRENT)
        .ok_or_else(|| RotationError::not_found(secret_id, "No current version found"))?
        .to_string();

    if current_version == token {
        info!(
            secret_id,
            version_id = token,
            "Version is already marked as {}", STAGE_CURRENT
        );
    } else {
        if !versions.contains_key(token) {
            return Err(RotationError::not_found(
                secret_id,
                format!("no version exists for token {token}"),
            ));
        }
        store
            .update_version_stage(secret_id, STAGE_CURRENT, Some(token), Some(&current_version))
            .await
            .map_err(finish_failed)?;
        info!(
            secret_id,
            version_id = token,
            previous_version_id = %current_version,
            "Successfully set {} stage", STAGE_CURRENT
        );
    }

    // A retried finish still clears a pending label the previous attempt left behind.
    let still_pending = versions
        .get(token)
        .is_some_and(|stages| stages.iter().any(|s| s == STAGE_PENDING));
    if still_pending {
        store
            .update_version_stage(secret_id, STAGE_PENDING, None, Some(token))
            .await
            .map_err(finish_failed)?;
    }

    Ok(())
}
