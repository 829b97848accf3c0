//! The hub: composition of registry, executor, dispatcher and history.
//!
//! Built once by the application's composition root and shared by cloning;
//! clones share all state.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, HubConfig, PathConfig};
use crate::executor::{HttpExecutor, PathExecutor};
use crate::health::{HealthHistory, HealthMonitor, HealthSample};
use crate::http::{HubRequest, HubResponse};
use crate::registry::{PathRegistry, PathSnapshot};
use crate::resilience::Dispatcher;

/// Errors raised while assembling a hub.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Why an enable/disable request was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToggleError {
    #[error("unknown path '{0}'")]
    UnknownPath(String),

    #[error("path '{0}' has no usable transport")]
    Unavailable(String),
}

pub struct Hub<E = HttpExecutor> {
    config: Arc<HubConfig>,
    registry: Arc<PathRegistry>,
    history: Arc<HealthHistory>,
    executor: Arc<E>,
    dispatcher: Arc<Dispatcher<E>>,
}

impl<E> Clone for Hub<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: self.registry.clone(),
            history: self.history.clone(),
            executor: self.executor.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl Hub<HttpExecutor> {
    /// Build a hub making real network calls. Paths whose credentials or
    /// endpoints are missing are disabled rather than rejected.
    pub fn from_config(config: HubConfig) -> Result<Self, HubError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let executor = HttpExecutor::from_config(&config.paths, &config.timeouts);
        Ok(Self::with_executor(config, executor))
    }
}

impl<E: PathExecutor> Hub<E> {
    /// Build a hub around any executor. Paths the executor cannot carry
    /// start disabled.
    pub fn with_executor(config: HubConfig, executor: E) -> Self {
        let registry = Arc::new(PathRegistry::new(&config.paths, config.health));
        let history = Arc::new(HealthHistory::new(config.health_check.history_capacity));
        let executor = Arc::new(executor);
        let dispatcher = Arc::new(Dispatcher::new(
            registry.clone(),
            history.clone(),
            executor.clone(),
            config.retries.clone(),
            Duration::from_secs(config.timeouts.request_secs),
        ));

        for path in &config.paths {
            if !executor.is_available(&path.name) {
                registry.set_enabled(&path.name, false);
            }
        }

        tracing::info!(
            paths = registry.len(),
            max_attempts = config.retries.max_attempts,
            "Hub initialized"
        );

        Self {
            config: Arc::new(config),
            registry,
            history,
            executor,
            dispatcher,
        }
    }

    /// Apply a reloaded configuration: enabled flags and retry settings.
    /// Paths without a transport stay disabled.
    pub fn apply_reload(&self, config: &HubConfig) {
        apply_enabled_flags(&self.registry, &config.paths, |name| {
            self.executor.is_available(name)
        });
        self.dispatcher.set_retry_config(config.retries.clone());
        tracing::info!("Configuration reload applied");
    }

    /// Execute a request over the best available path. Never fails.
    pub async fn dispatch(&self, request: &HubRequest) -> HubResponse {
        self.dispatcher.dispatch(request).await
    }

    /// Health and counters of every path, in configuration order.
    pub fn snapshot(&self) -> Vec<PathSnapshot> {
        self.registry.snapshot()
    }

    /// Enable or disable a path. Disabling always succeeds for known
    /// paths; enabling requires a usable transport.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), ToggleError> {
        if !self.registry.contains(name) {
            return Err(ToggleError::UnknownPath(name.to_string()));
        }
        if enabled && !self.executor.is_available(name) {
            tracing::warn!(path = %name, "Refusing to enable path without a transport");
            return Err(ToggleError::Unavailable(name.to_string()));
        }
        self.registry.set_enabled(name, enabled);
        Ok(())
    }

    /// Recorded samples for a path, oldest first; `None` for unknown names.
    pub fn history(&self, name: &str) -> Option<Vec<HealthSample>> {
        self.registry
            .contains(name)
            .then(|| self.history.history(name))
    }

    /// Background monitor sharing this hub's state.
    pub fn monitor(&self) -> HealthMonitor<E> {
        HealthMonitor::new(
            self.registry.clone(),
            self.history.clone(),
            self.executor.clone(),
            self.config.health_check.clone(),
        )
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher<E> {
        &self.dispatcher
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }
}

fn apply_enabled_flags(
    registry: &PathRegistry,
    paths: &[PathConfig],
    available: impl Fn(&str) -> bool,
) {
    for path in paths {
        if !registry.contains(&path.name) {
            tracing::warn!(path = %path.name, "New paths require a restart, ignoring");
            continue;
        }
        registry.set_enabled(&path.name, path.enabled && available(&path.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathKind;

    fn config() -> HubConfig {
        HubConfig {
            paths: vec![
                PathConfig::direct("direct", 0),
                PathConfig::forwarding(
                    "scraperapi",
                    PathKind::ScraperApi,
                    1,
                    "https://api.scraperapi.com/",
                    None,
                ),
                PathConfig::forwarding(
                    "relay",
                    PathKind::Relay,
                    3,
                    "http://relay.local/",
                    Some("t".into()),
                ),
            ],
            ..HubConfig::default()
        }
    }

    #[test]
    fn test_missing_credential_disables_path() {
        let hub = Hub::from_config(config()).unwrap();
        let snap = hub.snapshot();
        assert!(snap[0].enabled);
        assert!(!snap[1].enabled, "scraperapi has no key");
        assert!(snap[2].enabled);
        assert_eq!(hub.registry().list_enabled().len(), 2);
    }

    #[test]
    fn test_reload_cannot_enable_unavailable_path() {
        let hub = Hub::from_config(config()).unwrap();
        let mut reloaded = config();
        reloaded.paths[0].enabled = false;
        reloaded.retries.max_attempts = 1;
        hub.apply_reload(&reloaded);

        let snap = hub.snapshot();
        assert!(!snap[0].enabled);
        assert!(!snap[1].enabled);
        assert!(snap[2].enabled);
        assert_eq!(hub.dispatcher().retry_config().max_attempts, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config();
        bad.paths.clear();
        assert!(Hub::from_config(bad).is_err());
    }

    #[test]
    fn test_history_unknown_path() {
        let hub = Hub::from_config(config()).unwrap();
        assert!(hub.history("nope").is_none());
        assert!(hub.history("direct").unwrap().is_empty());
    }

    #[test]
    fn test_set_enabled_refuses_unavailable_path() {
        let hub = Hub::from_config(config()).unwrap();
        assert_eq!(
            hub.set_enabled("scraperapi", true),
            Err(ToggleError::Unavailable("scraperapi".into()))
        );
        assert!(!hub.registry().get("scraperapi").unwrap().enabled);

        assert_eq!(hub.set_enabled("scraperapi", false), Ok(()));
        assert_eq!(hub.set_enabled("relay", false), Ok(()));
        assert_eq!(hub.set_enabled("relay", true), Ok(()));
        assert_eq!(
            hub.set_enabled("ghost", true),
            Err(ToggleError::UnknownPath("ghost".into()))
        );
    }

    #[test]
    fn test_dispatcher_uses_configured_request_timeout() {
        let mut cfg = config();
        cfg.timeouts.request_secs = 2;
        let hub = Hub::from_config(cfg).unwrap();
        assert_eq!(hub.config().timeouts.request_secs, 2);
        assert_eq!(hub.dispatcher().request_timeout(), Duration::from_secs(2));
    }
}
