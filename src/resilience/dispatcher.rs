//! Request dispatcher.
//!
//! # Algorithm
//! ```text
//! ranked = registry.list_enabled()          (fixed for this call)
//! for path in ranked:
//!     for attempt in 0..max_attempts:
//!         execute under deadline
//!         record outcome + history sample
//!         success → return
//!         failure → collect "{path}: {error}", sleep backoff(attempt)
//!                   unless it was the last attempt on this path
//! all failed → provider "none", errors joined with "; "
//! ```
//!
//! Moving to the next path never sleeps.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RetryConfig;
use crate::executor::PathExecutor;
use crate::health::history::{HealthHistory, HealthSample};
use crate::http::{HubRequest, HubResponse, NO_PROVIDER};
use crate::observability::metrics;
use crate::registry::PathRegistry;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::with_deadline;

/// Error reported when no path is routable.
pub const NO_AVAILABLE_PATHS: &str = "no available paths";

/// Routes requests across ranked paths with per-path retries.
pub struct Dispatcher<E> {
    registry: Arc<PathRegistry>,
    history: Arc<HealthHistory>,
    executor: Arc<E>,
    retry: ArcSwap<RetryConfig>,
    /// Per-attempt deadline for requests without their own timeout.
    request_timeout: Duration,
}

impl<E: PathExecutor> Dispatcher<E> {
    pub fn new(
        registry: Arc<PathRegistry>,
        history: Arc<HealthHistory>,
        executor: Arc<E>,
        retry: RetryConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            history,
            executor,
            retry: ArcSwap::from_pointee(retry),
            request_timeout,
        }
    }

    /// Replace retry settings; in-flight dispatches keep the old ones.
    pub fn set_retry_config(&self, retry: RetryConfig) {
        self.retry.store(Arc::new(retry));
    }

    pub fn retry_config(&self) -> Arc<RetryConfig> {
        self.retry.load_full()
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Execute `request` over the best available path. Never fails: every
    /// error is reported through the returned response.
    pub async fn dispatch(&self, request: &HubRequest) -> HubResponse {
        let span = tracing::info_span!(
            "dispatch",
            id = %Uuid::new_v4(),
            method = %request.method,
            url = %request.url,
        );
        self.dispatch_inner(request).instrument(span).await
    }

    async fn dispatch_inner(&self, request: &HubRequest) -> HubResponse {
        let started = Instant::now();
        let retry = self.retry.load_full();
        let max_attempts = retry.max_attempts.max(1);
        let deadline = request.effective_timeout(self.request_timeout);

        let ranked = self.registry.list_enabled();
        if ranked.is_empty() {
            tracing::warn!("No available paths");
            metrics::record_dispatch(NO_PROVIDER, false, started.elapsed());
            return HubResponse::exhausted(NO_AVAILABLE_PATHS, started.elapsed());
        }

        let mut errors = Vec::new();

        for path in &ranked {
            let name = path.name.as_str();

            for attempt in 0..max_attempts {
                let attempt_start = Instant::now();
                let mut response =
                    with_deadline(name, deadline, self.executor.execute(name, request)).await;
                let latency = attempt_start.elapsed();
                response.latency = latency;
                response.provider = name.to_string();

                self.record(name, response.success, latency);

                if response.success {
                    tracing::debug!(
                        path = %name,
                        attempt,
                        status = response.status,
                        latency_ms = latency.as_millis() as u64,
                        "Request served"
                    );
                    metrics::record_dispatch(name, true, started.elapsed());
                    return response;
                }

                let error = response.error_message().to_string();
                tracing::warn!(
                    path = %name,
                    attempt,
                    status = response.status,
                    error = %error,
                    "Attempt failed"
                );
                errors.push(format!("{name}: {error}"));

                if attempt + 1 < max_attempts {
                    let delay = calculate_backoff(attempt, retry.base_delay_ms, retry.max_delay_ms);
                    tracing::info!(
                        path = %name,
                        attempt,
                        delay = ?delay,
                        "Retrying path after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }

            tracing::info!(path = %name, "Path exhausted, trying next");
        }

        tracing::error!(attempts = errors.len(), "All paths failed");
        metrics::record_dispatch(NO_PROVIDER, false, started.elapsed());
        HubResponse::exhausted(errors.join("; "), started.elapsed())
    }

    /// Apply one outcome to the registry and the history store.
    fn record(&self, path: &str, success: bool, latency: Duration) {
        metrics::record_attempt(path, success, latency);
        if let Some(snapshot) = self.registry.record_outcome(path, success, latency) {
            metrics::record_path_health(path, snapshot.status);
            self.history.record(HealthSample::from_snapshot(&snapshot, latency));
        }
    }
}
