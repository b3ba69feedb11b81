//! # Rotation Metrics
//!
//! Prometheus metrics for rotation steps: invocations, failures by error kind
//! and step duration.

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Registry, TextEncoder};
use std::sync::LazyLock;

/// Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static ROTATION_STEPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_rotation_steps_total",
            "Total number of rotation step invocations",
        ),
        &["step"],
    )
    .expect("Failed to create ROTATION_STEPS_TOTAL metric - this should never happen")
});

static ROTATION_STEP_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_rotation_step_errors_total",
            "Total number of failed rotation steps",
        ),
        &["step", "error"],
    )
    .expect("Failed to create ROTATION_STEP_ERRORS_TOTAL metric - this should never happen")
});

static ROTATION_STEP_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "secret_rotation_step_duration_seconds",
            "Duration of rotation steps in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["step"],
    )
    .expect("Failed to create ROTATION_STEP_DURATION metric - this should never happen")
});

static ROTATION_RETRIES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "secret_rotation_retries_total",
            "Total number of rotation step retries",
        ),
        &["step"],
    )
    .expect("Failed to create ROTATION_RETRIES_TOTAL metric - this should never happen")
});

/// Register rotation metrics with the registry
#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when a metric is registered twice"
)]
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(ROTATION_STEPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ROTATION_STEP_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(ROTATION_STEP_DURATION.clone()))?;
    REGISTRY.register(Box::new(ROTATION_RETRIES_TOTAL.clone()))?;
    Ok(())
}

pub fn increment_steps_total(step: &str) {
    ROTATION_STEPS_TOTAL.with_label_values(&[step]).inc();
}

pub fn increment_step_errors(step: &str, error: &str) {
    ROTATION_STEP_ERRORS_TOTAL
        .with_label_values(&[step, error])
        .inc();
}

pub fn observe_step_duration(step: &str, seconds: f64) {
    ROTATION_STEP_DURATION
        .with_label_values(&[step])
        .observe(seconds);
}

pub fn increment_retries(step: &str) {
    ROTATION_RETRIES_TOTAL.with_label_values(&[step]).inc();
}

/// Render registered metrics in the Prometheus text format
#[allow(
    clippy::missing_errors_doc,
    reason = "Fails only when encoding produces invalid UTF-8"
)]
pub fn render_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Current invocation count for a step
pub fn steps_total(step: &str) -> u64 {
    ROTATION_STEPS_TOTAL.with_label_values(&[step]).get()
}

/// Current failure count for a step and error kind
pub fn step_errors(step: &str, error: &str) -> u64 {
    ROTATION_STEP_ERRORS_TOTAL
        .with_label_values(&[step, error])
        .get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_increment() {
        let before = steps_total("metricsProbeStep");
        increment_steps_total("metricsProbeStep");
        assert_eq!(steps_total("metricsProbeStep"), before + 1);

        let before = step_errors("metricsProbeStep", "validation");
        increment_step_errors("metricsProbeStep", "validation");
        assert_eq!(step_errors("metricsProbeStep", "validation"), before + 1);
    }

    #[test]
    fn test_render_after_registration() {
        // Registration may already have happened in another test.
        let _ = register_metrics();
        observe_step_duration("renderProbeStep", 0.2);
        let text = render_metrics().unwrap();
        assert!(text.contains("secret_rotation_step_duration_seconds"));
    }
}
