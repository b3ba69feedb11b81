//! # setSecret
//!
//! Hands the pending version to downstream systems. Never writes to the store.

use super::parse_payload;
use crate::constants::STAGE_PENDING;
use crate::error::RotationError;
use crate::rotation::strategy::SecretPropagator;
use crate::store::{SecretStore, VersionSelector};
use tracing::info;

pub async fn set_secret(
    store: &dyn SecretStore,
    propagator: &dyn SecretPropagator,
    secret_id: &str,
    token: &str,
) -> Result<(), RotationError> {
    if propagator.is_noop() {
        info!(secret_id, "Setting secret - no external configuration needed");
        return Ok(());
    }

    let pending = store
        .get_secret_value(secret_id, VersionSelector::version_in_stage(token, STAGE_PENDING))
        .await
        .map_err(|e| {
            if e.is_not_found() {
                RotationError::not_found(
                    secret_id,
                    format!("no {STAGE_PENDING} version for token {token}"),
                )
            } else {
                RotationError::Store {
                    secret_id: secret_id.to_string(),
                    source: e,
                }
            }
        })?;

    let set_failed = |message: String| RotationError::SetSecret {
        secret_id: secret_id.to_string(),
        message,
    };
    let payload = parse_payload(pending.secret_string.as_deref()).map_err(set_failed)?;
    propagator
        .propagate(secret_id, token, &payload)
        .await
        .map_err(|e| set_failed(format!("{e:#}")))?;

    info!(secret_id, version_id = token, "Propagated pending secret version");
    Ok(())
}
