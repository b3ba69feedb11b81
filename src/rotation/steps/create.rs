//! # createSecret
//!
//! Stores a new `AWSPENDING` version derived from the current version.

use super::parse_payload;
use crate::constants::{STAGE_CURRENT, STAGE_PENDING};
use crate::error::RotationError;
use crate::rotation::strategy::PayloadMutator;
use crate::store::{SecretStore, VersionSelector};
use tracing::info;

/// Create the pending version for `token`
///
/// A version that already exists for the token is left untouched and the
/// call succeeds, which makes retries safe.
pub async fn create_secret(
    store: &dyn SecretStore,
    mutator: &dyn PayloadMutator,
    secret_id: &str,
    token: &str,
) -> Result<(), RotationError> {
    let current = store
        .get_secret_value(secret_id, VersionSelector::stage(STAGE_CURRENT))
        .await
        .map_err(|e| {
            if e.is_not_found() {
                RotationError::not_found(secret_id, format!("no {STAGE_CURRENT} version: {e}"))
            } else {
                RotationError::CreateFailed {
                    secret_id: secret_id.to_string(),
                    source: Box::new(e),
                }
            }
        })?;

    let create_failed = |source: crate::error::BoxError| RotationError::CreateFailed {
        secret_id: secret_id.to_string(),
        source,
    };

    let current_payload = parse_payload(current.secret_string.as_deref())
        .map_err(|m| create_failed(m.into()))?;
    let pending_payload = mutator
        .rotate(&current_payload, token)
        .map_err(|e| create_failed(e.into()))?;
    let secret_string =
        serde_json::to_string(&pending_payload).map_err(|e| create_failed(Box::new(e)))?;

    match store
        .put_secret_value(secret_id, token, &secret_string, &[STAGE_PENDING])
        .await
    {
        Ok(()) => {
            info!(secret_id, version_id = token, "Created pending secret version");
            Ok(())
        }
        Err(e) if e.is_already_exists() => {
            info!(secret_id, version_id = token, "Secret version already exists");
            Ok(())
        }
        Err(e) => Err(create_failed(Box::new(e))),
    }
}
