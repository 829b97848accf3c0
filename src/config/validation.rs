//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Path names unique and non-empty
//! - Value ranges (attempts >= 1, intervals > 0, thresholds ordered)
//! - URLs parse
//!
//! Returns all validation errors, not just the first. Missing credentials
//! are NOT validation errors: such paths are disabled at startup instead.

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::HubConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no paths configured")]
    NoPaths,

    #[error("path name must not be empty")]
    EmptyPathName,

    #[error("duplicate path name '{0}'")]
    DuplicatePath(String),

    #[error("path '{path}' has invalid endpoint '{endpoint}'")]
    InvalidEndpoint { path: String, endpoint: String },

    #[error("invalid probe url '{0}'")]
    InvalidProbeUrl(String),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("healthy latency threshold must be below the degraded threshold")]
    LatencyThresholds,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HubConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.paths.is_empty() {
        errors.push(ValidationError::NoPaths);
    }

    let mut seen = HashSet::new();
    for path in &config.paths {
        if path.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPathName);
        } else if !seen.insert(path.name.as_str()) {
            errors.push(ValidationError::DuplicatePath(path.name.clone()));
        }

        if let Some(endpoint) = &path.endpoint {
            if path.kind.is_forwarding() && Url::parse(endpoint).is_err() {
                errors.push(ValidationError::InvalidEndpoint {
                    path: path.name.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
    }

    if Url::parse(&config.health_check.probe_url).is_err() {
        errors.push(ValidationError::InvalidProbeUrl(
            config.health_check.probe_url.clone(),
        ));
    }

    let positive = [
        ("retries.max_attempts", config.retries.max_attempts as u64),
        ("health_check.interval_secs", config.health_check.interval_secs),
        ("health_check.timeout_secs", config.health_check.timeout_secs),
        ("health_check.history_capacity", config.health_check.history_capacity as u64),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("health.unhealthy_after_failures", config.health.unhealthy_after_failures as u64),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.health.healthy_latency_ms >= config.health.degraded_latency_ms {
        errors.push(ValidationError::LatencyThresholds);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
