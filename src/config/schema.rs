//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the hub.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the egress hub.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Routing path definitions, one per network path.
    pub paths: Vec<PathConfig>,

    /// Health thresholds applied to every path.
    pub health: HealthThresholds,

    /// Background probe settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Per-path retry configuration.
    pub retries: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            health: HealthThresholds::default(),
            health_check: HealthCheckConfig::default(),
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

/// The kind of network path, which decides how credentials are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Plain connection from this host.
    Direct,
    /// Forwarding service keyed by an API key query parameter.
    ScraperApi,
    /// Authenticated forward proxy (`user:password`).
    BrightData,
    /// Relay endpoint with bearer token and forwarded-for annotation.
    Relay,
}

impl PathKind {
    /// Whether this kind needs a credential and endpoint to operate.
    pub fn is_forwarding(self) -> bool {
        !matches!(self, PathKind::Direct)
    }
}

/// Routing path configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathConfig {
    /// Unique path identifier.
    pub name: String,

    /// Path strategy.
    pub kind: PathKind,

    /// Lower is preferred.
    #[serde(default)]
    pub priority: u32,

    /// Administrative enable flag.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Forwarding service endpoint (ignored for direct paths).
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Inline credential. Prefer `credential_env`.
    #[serde(default, skip_serializing)]
    pub credential: Option<String>,

    /// Environment variable holding the credential.
    #[serde(default)]
    pub credential_env: Option<String>,
}

impl PathConfig {
    /// Create a direct path.
    pub fn direct(name: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            kind: PathKind::Direct,
            priority,
            enabled: true,
            endpoint: None,
            credential: None,
            credential_env: None,
        }
    }

    /// Create a forwarding path with an inline credential.
    pub fn forwarding(
        name: impl Into<String>,
        kind: PathKind,
        priority: u32,
        endpoint: impl Into<String>,
        credential: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            priority,
            enabled: true,
            endpoint: Some(endpoint.into()),
            credential,
            credential_env: None,
        }
    }

    /// Resolve the credential: inline value first, then the environment.
    /// Empty values count as missing.
    pub fn resolve_credential(&self) -> Option<String> {
        self.credential
            .clone()
            .or_else(|| {
                self.credential_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
            })
            .filter(|c| !c.trim().is_empty())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_paths() -> Vec<PathConfig> {
    vec![
        PathConfig::direct("direct", 0),
        PathConfig {
            credential_env: Some("SCRAPERAPI_KEY".to_string()),
            ..PathConfig::forwarding(
                "scraperapi",
                PathKind::ScraperApi,
                1,
                "https://api.scraperapi.com/",
                None,
            )
        },
        PathConfig {
            credential_env: Some("BRIGHTDATA_AUTH".to_string()),
            ..PathConfig::forwarding(
                "brightdata",
                PathKind::BrightData,
                2,
                "http://brd.superproxy.io:22225",
                None,
            )
        },
        // Relay endpoints are deployment specific; no default.
        PathConfig {
            name: "relay".to_string(),
            kind: PathKind::Relay,
            priority: 3,
            enabled: true,
            endpoint: None,
            credential: None,
            credential_env: Some("RELAY_TOKEN".to_string()),
        },
    ]
}

/// Thresholds driving the per-path health state machine.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthThresholds {
    /// Consecutive failures before a path is marked unhealthy.
    pub unhealthy_after_failures: u32,

    /// Average latency below which a path is healthy.
    pub healthy_latency_ms: f64,

    /// Average latency below which a path is degraded.
    pub degraded_latency_ms: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            unhealthy_after_failures: 5,
            healthy_latency_ms: 1000.0,
            degraded_latency_ms: 3000.0,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable background probes.
    pub enabled: bool,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,

    /// Canary URL requested through every path.
    pub probe_url: String,

    /// Samples kept per path.
    pub history_capacity: usize,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            timeout_secs: 10,
            probe_url: "https://httpbin.org/status/200".to_string(),
            history_capacity: 100,
        }
    }
}

/// Timeout configuration for outbound calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout used when a request carries none, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per path before moving to the next one.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for write endpoints (Bearer token).
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_four_paths() {
        let config = HubConfig::default();
        let names: Vec<_> = config.paths.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["direct", "scraperapi", "brightdata", "relay"]);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.health_check.interval_secs, 60);
    }

    #[test]
    fn test_minimal_toml() {
        let config: HubConfig = toml::from_str(
            r#"
            [[paths]]
            name = "direct"
            kind = "direct"

            [[paths]]
            name = "scraperapi"
            kind = "scraper_api"
            priority = 1
            endpoint = "https://api.scraperapi.com/"
            credential = "k"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.len(), 2);
        assert!(config.paths[0].enabled);
        assert_eq!(config.paths[1].kind, PathKind::ScraperApi);
        assert_eq!(config.paths[1].resolve_credential().as_deref(), Some("k"));
        assert_eq!(config.health.unhealthy_after_failures, 5);
    }

    #[test]
    fn test_empty_credential_is_missing() {
        let mut path = PathConfig::forwarding("relay", PathKind::Relay, 3, "http://r", None);
        path.credential = Some("  ".into());
        assert!(path.resolve_credential().is_none());
    }
}
