//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every enabled path, unhealthy ones included
//! - Rehabilitate unhealthy paths that answer a probe (to degraded only)
//! - Count probe failures like traffic failures
//! - Leave status of routable paths alone on probe success

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use tokio::sync::broadcast;
use tokio::time::{self, Instant};

use crate::config::HealthCheckConfig;
use crate::executor::PathExecutor;
use crate::health::history::{HealthHistory, HealthSample};
use crate::health::state::HealthStatus;
use crate::http::HubRequest;
use crate::observability::metrics;
use crate::registry::PathRegistry;
use crate::resilience::timeouts::with_deadline;

/// Outcome of probing one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub path: String,
    pub success: bool,
    /// True when the probe moved the path from unhealthy to degraded.
    pub rehabilitated: bool,
}

pub struct HealthMonitor<E> {
    registry: Arc<PathRegistry>,
    history: Arc<HealthHistory>,
    executor: Arc<E>,
    config: HealthCheckConfig,
}

impl<E: PathExecutor> HealthMonitor<E> {
    pub fn new(
        registry: Arc<PathRegistry>,
        history: Arc<HealthHistory>,
        executor: Arc<E>,
        config: HealthCheckConfig,
    ) -> Self {
        Self {
            registry,
            history,
            executor,
            config,
        }
    }

    /// Probe on a fixed interval until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Health probes disabled");
            return;
        }

        tracing::info!(
            interval = self.config.interval_secs,
            probe_url = %self.config.probe_url,
            "Health monitor starting"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_secs));
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one probe round over every enabled path.
    pub async fn probe_all(&self) -> Vec<ProbeReport> {
        let request = match self.probe_request() {
            Ok(req) => req,
            Err(e) => {
                tracing::error!(
                    probe_url = %self.config.probe_url,
                    error = %e,
                    "Invalid probe URL"
                );
                return Vec::new();
            }
        };

        let mut reports = Vec::new();
        for path in self.registry.enabled_paths() {
            reports.push(self.probe(&path.name, path.status, &request).await);
        }
        reports
    }

    async fn probe(&self, name: &str, status: HealthStatus, request: &HubRequest) -> ProbeReport {
        let deadline = request.effective_timeout(Duration::from_secs(self.config.timeout_secs));
        let start = Instant::now();
        let response = with_deadline(name, deadline, self.executor.execute(name, request)).await;
        let latency = start.elapsed();
        metrics::record_probe(name, response.success);

        let mut rehabilitated = false;
        let snapshot = if response.success {
            if status == HealthStatus::Unhealthy {
                let snapshot = self.registry.rehabilitate(name);
                rehabilitated = snapshot.is_some();
                // Raced with another update that already cleared the state.
                snapshot.or_else(|| self.registry.get(name))
            } else {
                // Routable paths earn status through real traffic only.
                self.registry.mark_checked(name)
            }
        } else {
            tracing::warn!(
                path = %name,
                status = response.status,
                error = %response.error_message(),
                "Health probe failed"
            );
            self.registry.record_outcome(name, false, latency)
        };

        if let Some(snapshot) = snapshot {
            metrics::record_path_health(name, snapshot.status);
            self.history.record(HealthSample::from_snapshot(&snapshot, latency));
        }

        ProbeReport {
            path: name.to_string(),
            success: response.success,
            rehabilitated,
        }
    }

    fn probe_request(&self) -> Result<HubRequest, url::ParseError> {
        Ok(HubRequest::get(&self.config.probe_url)?
            .with_header(USER_AGENT, HeaderValue::from_static("egress-hub-health-check"))
            .with_timeout(Duration::from_secs(self.config.timeout_secs)))
    }
}
