//! # Rotation
//!
//! The four-step rotation protocol:
//!
//! 1. `createSecret` - store a new version of the secret labelled `AWSPENDING`
//! 2. `setSecret` - configure downstream systems with the pending version
//! 3. `testSecret` - validate the pending version
//! 4. `finishSecret` - move `AWSCURRENT` to the pending version
//!
//! Ordering is imposed by the caller. Every step is idempotent for a given
//! client request token, so any step can be re-invoked after a failure.

pub mod coordinator;
pub mod steps;
pub mod strategy;

pub use coordinator::{RotationCoordinator, RotationCoordinatorBuilder};
pub use strategy::{
    NoopPropagator, Payload, PayloadMutator, PayloadValidator, RequiredFieldsValidator,
    SecretPropagator, TimestampMutator,
};

use crate::error::RotationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One phase of the rotation protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    CreateSecret,
    SetSecret,
    TestSecret,
    FinishSecret,
}

impl Step {
    /// Steps in protocol order
    pub const ALL: [Step; 4] = [
        Step::CreateSecret,
        Step::SetSecret,
        Step::TestSecret,
        Step::FinishSecret,
    ];

    /// Wire name used by rotation triggers
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::CreateSecret => "createSecret",
            Step::SetSecret => "setSecret",
            Step::TestSecret => "testSecret",
            Step::FinishSecret => "finishSecret",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Step {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createSecret" | "CreateSecret" => Ok(Step::CreateSecret),
            "setSecret" | "SetSecret" => Ok(Step::SetSecret),
            "testSecret" | "TestSecret" => Ok(Step::TestSecret),
            "finishSecret" | "FinishSecret" => Ok(Step::FinishSecret),
            other => Err(RotationError::InvalidStep(other.to_string())),
        }
    }
}

/// A single rotation step invocation
///
/// The step is kept as the raw name so unknown steps reach the coordinator
/// and fail there with `InvalidStep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationRequest {
    pub secret_id: String,
    pub token: String,
    pub step: String,
}

/// Rotation event as delivered by the secrets-manager rotation trigger
///
/// Only `SecretId`, `ClientRequestToken` and `Step` are read; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RotationEvent {
    #[serde(rename = "SecretId")]
    pub secret_id: String,
    #[serde(rename = "ClientRequestToken")]
    pub client_request_token: String,
    #[serde(rename = "Step")]
    pub step: String,
}

impl From<RotationEvent> for RotationRequest {
    fn from(event: RotationEvent) -> Self {
        RotationRequest {
            secret_id: event.secret_id,
            token: event.client_request_token,
            step: event.step,
        }
    }
}

/// Success response returned to the rotation trigger
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationResponse {
    pub status_code: u16,
    pub body: String,
}

impl RotationResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "\"Success\"".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parse_wire_names() {
        for step in Step::ALL {
            assert_eq!(step.as_str().parse::<Step>().unwrap(), step);
        }
        assert_eq!("FinishSecret".parse::<Step>().unwrap(), Step::FinishSecret);
    }

    #[test]
    fn test_step_parse_unknown() {
        let err = "rollbackSecret".parse::<Step>().unwrap_err();
        assert!(matches!(err, RotationError::InvalidStep(ref s) if s == "rollbackSecret"));
        assert!("createsecret".parse::<Step>().is_err());
        assert!("".parse::<Step>().is_err());
    }

    #[test]
    fn test_event_deserialize_ignores_extra_fields() {
        let raw = concat!(
            r#"{"SecretId":"arn:aws:secretsmanager:us-east-1:123:secret:app","#,
            r#""ClientRequestToken":"tok123","Step":"createSecret","#,
            r#""RotationToken":"ignored"}"#,
        );
        let event: RotationEvent = serde_json::from_str(raw).unwrap();
        let request = RotationRequest::from(event);
        assert_eq!(request.secret_id, "arn:aws:secretsmanager:us-east-1:123:secret:app");
        assert_eq!(request.token, "tok123");
        assert_eq!(request.step, "createSecret");
    }

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(RotationResponse::success()).unwrap();
        assert_eq!(json, serde_json::json!({"statusCode": 200, "body": "\"Success\""}));
    }
}
