//! # Rotation Runner
//!
//! Drives a complete rotation the way a rotation trigger does: the four steps in
//! protocol order with one token, retrying retryable failures with Fibonacci
//! backoff and stopping at the first fatal failure.

use super::backoff::FibonacciBackoff;
use crate::config::RotationConfig;
use crate::error::RotationError;
use crate::observability::metrics;
use crate::rotation::{RotationCoordinator, Step};
use tracing::{info, warn};

/// Result of a completed rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationOutcome {
    pub secret_id: String,
    pub token: String,
    /// Attempts used per step, in protocol order
    pub attempts: Vec<(Step, u32)>,
}

#[derive(Debug, Clone)]
pub struct RotationRunner {
    coordinator: RotationCoordinator,
    max_attempts: u32,
    backoff_base_ms: u64,
    backoff_max_ms: u64,
}

impl RotationRunner {
    pub fn new(coordinator: RotationCoordinator, config: &RotationConfig) -> Self {
        Self {
            coordinator,
            max_attempts: config.max_attempts.max(1),
            backoff_base_ms: config.backoff_base_ms,
            backoff_max_ms: config.backoff_max_ms,
        }
    }

    /// Run all four steps for `secret_id` with `token`
    ///
    /// # Errors
    ///
    /// Returns the first fatal step error, or the last error of a step that
    /// ran out of attempts.
    pub async fn run(
        &self,
        secret_id: &str,
        token: &str,
    ) -> Result<RotationOutcome, RotationError> {
        let mut attempts = Vec::with_capacity(Step::ALL.len());
        for step in Step::ALL {
            let used = self.run_with_retry(secret_id, token, step).await?;
            attempts.push((step, used));
        }
        info!(secret_id, version_id = token, "Rotation complete");
        Ok(RotationOutcome {
            secret_id: secret_id.to_string(),
            token: token.to_string(),
            attempts,
        })
    }

    async fn run_with_retry(
        &self,
        secret_id: &str,
        token: &str,
        step: Step,
    ) -> Result<u32, RotationError> {
        let mut backoff = FibonacciBackoff::new(self.backoff_base_ms, self.backoff_max_ms);
        let mut attempt = 1;
        loop {
            match self.coordinator.rotate(secret_id, token, step.as_str()).await {
                Ok(()) => return Ok(attempt),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = backoff.next_backoff();
                    warn!(
                        secret_id,
                        step = step.as_str(),
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying step after error: {}",
                        e
                    );
                    metrics::increment_retries(step.as_str());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
