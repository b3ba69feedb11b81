//! # Initialization
//!
//! Start-up wiring for the rotation binary: tracing, metrics, configuration and
//! the secret store client. Everything is built here and passed down
//! explicitly; nothing is stored in process-wide statics besides metrics.

use crate::config::{load_config, RotationConfig};
use crate::observability;
use crate::rotation::RotationCoordinator;
use crate::store::{AwsSecretsManagerStore, InMemorySecretStore, SecretStore};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Initialization result containing the wired-up components
#[derive(Debug)]
pub struct InitializationResult {
    pub config: RotationConfig,
    pub coordinator: RotationCoordinator,
}

/// Options the binary passes down from its command line
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub json_logs: bool,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// Seed an in-memory store with `(secret_id, payload)` instead of talking to AWS
    pub in_memory_seed: Option<(String, String)>,
}

/// Initialize logging, metrics, configuration, store and coordinator
pub async fn initialize(options: InitOptions) -> Result<InitializationResult> {
    observability::logging::init_logging(options.json_logs);
    observability::metrics::register_metrics().context("Failed to register metrics")?;

    let mut config = load_config();
    if let Some(region) = options.region {
        config.region = region;
    }
    if options.endpoint.is_some() {
        config.endpoint = options.endpoint;
    }

    let store: Arc<dyn SecretStore> = match options.in_memory_seed {
        Some((secret_id, payload)) => {
            info!(secret_id = %secret_id, "Using in-memory secret store");
            Arc::new(InMemorySecretStore::new().with_current(&secret_id, "initial", &payload))
        }
        None => {
            info!(
                region = %config.region,
                endpoint = ?config.endpoint,
                "Using AWS Secrets Manager store"
            );
            Arc::new(AwsSecretsManagerStore::from_config(&config).await)
        }
    };

    let coordinator = RotationCoordinator::builder(store)
        .config(&config)
        .build();

    Ok(InitializationResult {
        config,
        coordinator,
    })
}
