//! reqwest-backed executor.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::time::Instant;

use crate::config::{PathConfig, TimeoutConfig};
use crate::executor::strategy::{PathStrategy, StrategyError};
use crate::executor::PathExecutor;
use crate::http::{HubRequest, HubResponse};

const USER_AGENT: &str = concat!("egress-hub/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure of one call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("path not configured")]
    NotConfigured,

    #[error("timed out: {0}")]
    Timeout(reqwest::Error),

    #[error("connect failed: {0}")]
    Connect(reqwest::Error),

    #[error("request failed: {0}")]
    Request(reqwest::Error),

    #[error("failed to read body: {0}")]
    Body(reqwest::Error),
}

impl TransportError {
    fn classify(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e)
        } else if e.is_connect() {
            TransportError::Connect(e)
        } else {
            TransportError::Request(e)
        }
    }
}

/// A path's strategy paired with the client that carries it.
#[derive(Debug, Clone)]
struct PathTransport {
    strategy: PathStrategy,
    client: Client,
}

/// Executes requests over real network paths.
#[derive(Debug, Default)]
pub struct HttpExecutor {
    transports: HashMap<String, PathTransport>,
    unavailable: Vec<String>,
}

impl HttpExecutor {
    /// Build transports for every configured path. Paths that cannot be
    /// built (missing credential, bad endpoint) are recorded as unavailable.
    pub fn from_config(paths: &[PathConfig], timeouts: &TimeoutConfig) -> Self {
        let mut executor = Self::default();

        for config in paths {
            match build_transport(config, timeouts) {
                Ok(transport) => {
                    tracing::debug!(
                        path = %config.name,
                        strategy = ?transport.strategy,
                        "Path transport ready"
                    );
                    executor.transports.insert(config.name.clone(), transport);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %config.name,
                        error = %e,
                        "Path unavailable, it will be disabled"
                    );
                    executor.unavailable.push(config.name.clone());
                }
            }
        }

        executor
    }

    /// Paths that failed to build.
    pub fn unavailable(&self) -> &[String] {
        &self.unavailable
    }

    async fn send(
        transport: &PathTransport,
        request: &HubRequest,
    ) -> Result<(u16, reqwest::header::HeaderMap, bytes::Bytes), TransportError> {
        let response = transport
            .strategy
            .prepare(&transport.client, request)
            .send()
            .await
            .map_err(TransportError::classify)?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(TransportError::Body)?;
        Ok((status, headers, body))
    }
}

impl PathExecutor for HttpExecutor {
    fn execute(
        &self,
        path: &str,
        request: &HubRequest,
    ) -> impl Future<Output = HubResponse> + Send {
        let transport = self.transports.get(path);
        async move {
            let start = Instant::now();
            let result = match transport {
                Some(transport) => Self::send(transport, request).await,
                None => Err(TransportError::NotConfigured),
            };

            match result {
                Ok((status, headers, body)) => {
                    HubResponse::from_status(path, status, headers, body, start.elapsed())
                }
                Err(e) => HubResponse::transport_failure(path, e.to_string(), start.elapsed()),
            }
        }
    }

    /// A path is available when its transport could be built.
    fn is_available(&self, path: &str) -> bool {
        self.transports.contains_key(path)
    }
}

fn build_transport(
    config: &PathConfig,
    timeouts: &TimeoutConfig,
) -> Result<PathTransport, StrategyError> {
    let strategy = PathStrategy::from_config(config)?;
    let builder = Client::builder()
        .no_proxy()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(timeouts.connect_secs));
    let client = strategy.configure_client(builder)?.build()?;
    Ok(PathTransport { strategy, client })
}
