//! # Rotation Coordinator
//!
//! Validates the requested step, dispatches it to its handler and reports the
//! outcome. The coordinator owns no rotation state: the store handle and the
//! strategies are injected at construction and every call rehydrates from the
//! store.

use super::steps;
use super::strategy::{
    NoopPropagator, PayloadMutator, PayloadValidator, RequiredFieldsValidator, SecretPropagator,
    TimestampMutator,
};
use super::{RotationEvent, RotationRequest, RotationResponse, Step};
use crate::config::RotationConfig;
use crate::error::RotationError;
use crate::observability::metrics;
use crate::store::SecretStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};

/// Dispatches rotation steps against a secret store
#[derive(Debug, Clone)]
pub struct RotationCoordinator {
    store: Arc<dyn SecretStore>,
    mutator: Arc<dyn PayloadMutator>,
    propagator: Arc<dyn SecretPropagator>,
    validators: Vec<Arc<dyn PayloadValidator>>,
}

impl RotationCoordinator {
    /// Coordinator with the default strategies
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::builder(store).build()
    }

    pub fn builder(store: Arc<dyn SecretStore>) -> RotationCoordinatorBuilder {
        RotationCoordinatorBuilder::new(store)
    }

    /// Run one rotation step
    ///
    /// Handler errors are returned unchanged; retrying is the caller's decision.
    pub async fn rotate(
        &self,
        secret_id: &str,
        token: &str,
        step: &str,
    ) -> Result<(), RotationError> {
        let step = match step.parse::<Step>() {
            Ok(step) => step,
            Err(e) => {
                error!(secret_id, step, "Invalid step: {}", step);
                metrics::increment_step_errors("unknown", e.as_str());
                return Err(e);
            }
        };

        let span = info_span!("rotation.step", secret_id, step = step.as_str());
        self.run_step(step, secret_id, token).instrument(span).await
    }

    /// Run the step carried by a request
    pub async fn handle(&self, request: &RotationRequest) -> Result<(), RotationError> {
        self.rotate(&request.secret_id, &request.token, &request.step)
            .await
    }

    /// Run the step carried by a trigger event and build the trigger response
    pub async fn handle_event(
        &self,
        event: RotationEvent,
    ) -> Result<RotationResponse, RotationError> {
        self.handle(&RotationRequest::from(event)).await?;
        Ok(RotationResponse::success())
    }

    async fn run_step(
        &self,
        step: Step,
        secret_id: &str,
        token: &str,
    ) -> Result<(), RotationError> {
        info!(secret_id, step = step.as_str(), "Starting rotation step");
        metrics::increment_steps_total(step.as_str());
        let start = Instant::now();

        let store = self.store.as_ref();
        let result = match step {
            Step::CreateSecret => {
                steps::create_secret(store, self.mutator.as_ref(), secret_id, token).await
            }
            Step::SetSecret => {
                steps::set_secret(store, self.propagator.as_ref(), secret_id, token).await
            }
            Step::TestSecret => steps::test_secret(store, &self.validators, secret_id, token).await,
            Step::FinishSecret => steps::finish_secret(store, secret_id, token).await,
        };

        metrics::observe_step_duration(step.as_str(), start.elapsed().as_secs_f64());
        match &result {
            Ok(()) => info!(secret_id, step = step.as_str(), "Successfully completed step"),
            Err(e) => {
                metrics::increment_step_errors(step.as_str(), e.as_str());
                error!(
                    secret_id,
                    step = step.as_str(),
                    error_kind = e.as_str(),
                    "Error in step {}: {}",
                    step,
                    e
                );
            }
        }
        result
    }
}

/// Builder for [`RotationCoordinator`]
#[derive(Debug)]
pub struct RotationCoordinatorBuilder {
    store: Arc<dyn SecretStore>,
    mutator: Arc<dyn PayloadMutator>,
    propagator: Arc<dyn SecretPropagator>,
    validators: Vec<Arc<dyn PayloadValidator>>,
}

impl RotationCoordinatorBuilder {
    fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            mutator: Arc::new(TimestampMutator::default()),
            propagator: Arc::new(NoopPropagator),
            validators: vec![Arc::new(RequiredFieldsValidator::default())],
        }
    }

    /// Apply configured settings (required fields)
    #[must_use]
    pub fn config(self, config: &RotationConfig) -> Self {
        self.required_fields(config.required_fields.iter().cloned())
    }

    #[must_use]
    pub fn mutator(mut self, mutator: Arc<dyn PayloadMutator>) -> Self {
        self.mutator = mutator;
        self
    }

    #[must_use]
    pub fn propagator(mut self, propagator: Arc<dyn SecretPropagator>) -> Self {
        self.propagator = propagator;
        self
    }

    /// Replace the required-field schema; custom validators are kept
    #[must_use]
    pub fn required_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validators[0] = Arc::new(RequiredFieldsValidator::new(fields));
        self
    }

    /// Add a validator run after the required-field check
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn PayloadValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn build(self) -> RotationCoordinator {
        RotationCoordinator {
            store: self.store,
            mutator: self.mutator,
            propagator: self.propagator,
            validators: self.validators,
        }
    }
}
