//! # Rotation Strategies
//!
//! Pluggable behaviour injected into the rotation coordinator:
//!
//! - [`PayloadMutator`] derives the pending payload from the current one (`createSecret`)
//! - [`SecretPropagator`] pushes the pending payload to downstream systems (`setSecret`)
//! - [`PayloadValidator`] checks the pending payload before promotion (`testSecret`)
//!
//! Different secret types supply different strategies; the step handlers never
//! branch on secret type.

use crate::constants::{
    DEFAULT_REQUIRED_FIELD, LAST_ROTATED_FIELD, ROTATION_ID_FIELD, ROTATION_ID_LEN,
};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Secret payload: a JSON object
pub type Payload = Map<String, Value>;

/// Derives the pending payload from the current payload
///
/// Must be safe to call again with the same token: the store keeps the first
/// stored version, so later results are discarded.
pub trait PayloadMutator: Send + Sync + std::fmt::Debug {
    fn rotate(&self, current: &Payload, token: &str) -> Result<Payload>;
}

/// Validates the pending payload
#[async_trait]
pub trait PayloadValidator: Send + Sync + std::fmt::Debug {
    /// Return an error describing why the payload is unusable
    async fn validate(&self, secret_id: &str, payload: &Payload) -> Result<()>;
}

/// Propagates the pending payload to systems outside the secret store
#[async_trait]
pub trait SecretPropagator: Send + Sync + std::fmt::Debug {
    /// True when there is nothing to configure; `setSecret` then skips the store read
    fn is_noop(&self) -> bool {
        false
    }

    async fn propagate(&self, secret_id: &str, token: &str, pending: &Payload) -> Result<()>;
}

/// Default mutator for application configuration secrets
///
/// When the payload carries the marker field (`apiVersion` by default), stamps
/// `lastRotated` with the current unix time and `rotationId` with the first
/// eight characters of the token. Other payloads are copied unchanged.
#[derive(Debug, Clone)]
pub struct TimestampMutator {
    marker_field: String,
    clock: fn() -> i64,
}

impl Default for TimestampMutator {
    fn default() -> Self {
        Self {
            marker_field: DEFAULT_REQUIRED_FIELD.to_string(),
            clock: || chrono::Utc::now().timestamp(),
        }
    }
}

impl TimestampMutator {
    pub fn new(marker_field: impl Into<String>) -> Self {
        Self {
            marker_field: marker_field.into(),
            ..Self::default()
        }
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }
}

impl PayloadMutator for TimestampMutator {
    fn rotate(&self, current: &Payload, token: &str) -> Result<Payload> {
        let mut next = current.clone();
        if next.contains_key(&self.marker_field) {
            next.insert(LAST_ROTATED_FIELD.to_string(), Value::from((self.clock)()));
            let rotation_id: String = token.chars().take(ROTATION_ID_LEN).collect();
            next.insert(ROTATION_ID_FIELD.to_string(), Value::String(rotation_id));
        }
        Ok(next)
    }
}

/// Requires a fixed set of top-level fields
#[derive(Debug, Clone)]
pub struct RequiredFieldsValidator {
    fields: Vec<String>,
}

impl Default for RequiredFieldsValidator {
    fn default() -> Self {
        Self::new([DEFAULT_REQUIRED_FIELD])
    }
}

impl RequiredFieldsValidator {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl PayloadValidator for RequiredFieldsValidator {
    async fn validate(&self, _secret_id: &str, payload: &Payload) -> Result<()> {
        if let Some(missing) = self.fields.iter().find(|f| !payload.contains_key(*f)) {
            anyhow::bail!("Required field '{missing}' missing from secret");
        }
        Ok(())
    }
}

/// Propagator for secrets with no downstream consumer to configure
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPropagator;

#[async_trait]
impl SecretPropagator for NoopPropagator {
    fn is_noop(&self) -> bool {
        true
    }

    async fn propagate(&self, _secret_id: &str, _token: &str, _pending: &Payload) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_timestamp_mutator_stamps_marked_payload() {
        let mutator = TimestampMutator::default().with_clock(|| 1_700_000_000);
        let next = mutator
            .rotate(&payload(json!({"apiVersion": 1})), "tok123456789")
            .unwrap();
        assert_eq!(
            Value::Object(next),
            json!({"apiVersion": 1, "lastRotated": 1_700_000_000, "rotationId": "tok12345"})
        );
    }

    #[test]
    fn test_timestamp_mutator_short_token() {
        let mutator = TimestampMutator::default();
        let next = mutator
            .rotate(&payload(json!({"apiVersion": 1})), "tok123")
            .unwrap();
        assert_eq!(next["rotationId"], json!("tok123"));
        assert!(next["lastRotated"].is_i64());
    }

    #[test]
    fn test_timestamp_mutator_leaves_unmarked_payload() {
        let mutator = TimestampMutator::default();
        let current = payload(json!({"apiKey": "abc"}));
        assert_eq!(mutator.rotate(&current, "tok123").unwrap(), current);
    }

    #[test]
    fn test_timestamp_mutator_custom_marker() {
        let mutator = TimestampMutator::new("apiKey").with_clock(|| 42);
        let next = mutator
            .rotate(&payload(json!({"apiKey": "abc"})), "abcdefghij")
            .unwrap();
        assert_eq!(next["lastRotated"], json!(42));
        assert_eq!(next["rotationId"], json!("abcdefgh"));
    }

    #[tokio::test]
    async fn test_required_fields_validator() {
        let validator = RequiredFieldsValidator::new(["apiVersion", "apiKey"]);
        assert!(validator
            .validate("s", &payload(json!({"apiVersion": 2, "apiKey": "k"})))
            .await
            .is_ok());

        let err = validator
            .validate("s", &payload(json!({"apiVersion": 2})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Required field 'apiKey' missing from secret");
    }

    #[tokio::test]
    async fn test_noop_propagator() {
        let propagator = NoopPropagator;
        assert!(propagator.is_noop());
        assert!(propagator.propagate("s", "t", &Payload::new()).await.is_ok());
    }
}
