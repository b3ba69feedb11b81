//! # testSecret
//!
//! Validates the pending version. Stage labels are never touched here, so a
//! failed validation leaves the version pending for inspection.

use super::parse_payload;
use crate::constants::STAGE_PENDING;
use crate::error::RotationError;
use crate::rotation::strategy::PayloadValidator;
use crate::store::{SecretStore, VersionSelector};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn test_secret(
    store: &dyn SecretStore,
    validators: &[Arc<dyn PayloadValidator>],
    secret_id: &str,
    token: &str,
) -> Result<(), RotationError> {
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

    let payload = parse_payload(pending.secret_string.as_deref()).map_err(|message| {
        warn!(secret_id, version_id = token, "Secret validation failed: {}", message);
        RotationError::validation(secret_id, message)
    })?;

    for validator in validators {
        if let Err(e) = validator.validate(secret_id, &payload).await {
            warn!(secret_id, version_id = token, "Secret validation failed: {:#}", e);
            return Err(RotationError::validation(secret_id, format!("{e:#}")));
        }
    }

    info!(secret_id, version_id = token, "Secret validation passed");
    Ok(())
}
