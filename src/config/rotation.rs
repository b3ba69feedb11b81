//! # Rotation Settings
//!
//! Store location, validation schema and retry settings.

use crate::constants::{
    DEFAULT_AWS_REGION, DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MAX_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUIRED_FIELD,
};

/// Rotation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// AWS region of the secret store
    pub region: String,
    /// Endpoint override for the secret store (local emulators, mock servers)
    pub endpoint: Option<String>,
    /// Payload fields `testSecret` requires on the pending version
    pub required_fields: Vec<String>,
    /// Attempts per step when driving a full rotation
    pub max_attempts: u32,
    /// Retry backoff base delay (milliseconds)
    pub backoff_base_ms: u64,
    /// Retry backoff cap (milliseconds)
    pub backoff_max_ms: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_AWS_REGION.to_string(),
            endpoint: None,
            required_fields: vec![DEFAULT_REQUIRED_FIELD.to_string()],
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
        }
    }
}

impl RotationConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let required_fields = lookup("ROTATION_REQUIRED_FIELDS")
            .map(|raw| parse_field_list(&raw))
            .filter(|fields| !fields.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_REQUIRED_FIELD.to_string()]);

        Self {
            region: lookup("AWS_REGION")
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            endpoint: lookup("SECRETS_MANAGER_ENDPOINT").filter(|e| !e.trim().is_empty()),
            required_fields,
            max_attempts: var_or_default(&lookup, "ROTATION_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)
                .max(1),
            backoff_base_ms: var_or_default(
                &lookup,
                "ROTATION_BACKOFF_BASE_MS",
                DEFAULT_BACKOFF_BASE_MS,
            ),
            backoff_max_ms: var_or_default(
                &lookup,
                "ROTATION_BACKOFF_MAX_MS",
                DEFAULT_BACKOFF_MAX_MS,
            ),
        }
    }
}

/// Split a comma-separated field list, dropping blanks
fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Read a variable or return default value
fn var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = RotationConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, RotationConfig::default());
        assert_eq!(config.required_fields, vec!["apiVersion".to_string()]);
    }

    #[test]
    fn test_overrides() {
        let config = RotationConfig::from_lookup(lookup_from(&[
            ("AWS_REGION", "eu-west-1"),
            ("SECRETS_MANAGER_ENDPOINT", "http://localhost:4566"),
            ("ROTATION_REQUIRED_FIELDS", "apiVersion, apiKey ,,"),
            ("ROTATION_MAX_ATTEMPTS", "5"),
            ("ROTATION_BACKOFF_BASE_MS", "100"),
        ]));
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.required_fields, vec!["apiVersion", "apiKey"]);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.backoff_base_ms, 100);
        assert_eq!(config.backoff_max_ms, DEFAULT_BACKOFF_MAX_MS);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = RotationConfig::from_lookup(lookup_from(&[
            ("ROTATION_MAX_ATTEMPTS", "lots"),
            ("ROTATION_REQUIRED_FIELDS", " , "),
        ]));
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.required_fields, vec!["apiVersion".to_string()]);
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let config = RotationConfig::from_lookup(lookup_from(&[("ROTATION_MAX_ATTEMPTS", "0")]));
        assert_eq!(config.max_attempts, 1);
    }
}
