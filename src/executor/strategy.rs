//! Per-path request strategies.
//!
//! Every forwarding service receives the same underlying call; they differ
//! only in how credentials are attached:
//! - `ScraperApi`: API key and target travel as query parameters
//! - `BrightData`: client-level proxy with basic `Proxy-Authorization`
//! - `Relay`: bearer token plus a forwarded-for annotation

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, ClientBuilder, Proxy, RequestBuilder};
use thiserror::Error;
use url::Url;

use crate::config::{PathConfig, PathKind};
use crate::http::HubRequest;

/// Header carrying the synthetic client address on relay paths.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Reasons a path cannot be constructed. The path is disabled, not failed.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("path '{0}' has no credential configured")]
    MissingCredential(String),

    #[error("path '{0}' has no endpoint configured")]
    MissingEndpoint(String),

    #[error("path '{path}' has invalid endpoint: {source}")]
    InvalidEndpoint {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("path '{0}' credential must be formatted as user:password")]
    MalformedCredential(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// How one path turns a [`HubRequest`] into a concrete call.
#[derive(Clone)]
pub enum PathStrategy {
    Direct,
    ScraperApi { endpoint: Url, api_key: String },
    BrightData { proxy: Url, username: String, password: String },
    Relay { endpoint: Url, token: String },
}

impl PathStrategy {
    /// Build the strategy for a configured path, resolving its credential.
    pub fn from_config(config: &PathConfig) -> Result<Self, StrategyError> {
        if config.kind == PathKind::Direct {
            return Ok(PathStrategy::Direct);
        }

        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| StrategyError::MissingEndpoint(config.name.clone()))?;
        let endpoint = Url::parse(endpoint).map_err(|source| StrategyError::InvalidEndpoint {
            path: config.name.clone(),
            source,
        })?;
        let credential = config
            .resolve_credential()
            .ok_or_else(|| StrategyError::MissingCredential(config.name.clone()))?;

        let strategy = match config.kind {
            PathKind::Direct => PathStrategy::Direct,
            PathKind::ScraperApi => PathStrategy::ScraperApi {
                endpoint,
                api_key: credential,
            },
            PathKind::BrightData => {
                let (username, password) = credential
                    .split_once(':')
                    .ok_or_else(|| StrategyError::MalformedCredential(config.name.clone()))?;
                PathStrategy::BrightData {
                    proxy: endpoint,
                    username: username.to_string(),
                    password: password.to_string(),
                }
            }
            PathKind::Relay => PathStrategy::Relay {
                endpoint,
                token: credential,
            },
        };
        Ok(strategy)
    }

    pub fn kind(&self) -> PathKind {
        match self {
            PathStrategy::Direct => PathKind::Direct,
            PathStrategy::ScraperApi { .. } => PathKind::ScraperApi,
            PathStrategy::BrightData { .. } => PathKind::BrightData,
            PathStrategy::Relay { .. } => PathKind::Relay,
        }
    }

    /// Apply client-level settings. Only the proxy path needs any.
    pub fn configure_client(&self, builder: ClientBuilder) -> Result<ClientBuilder, StrategyError> {
        match self {
            PathStrategy::BrightData {
                proxy,
                username,
                password,
            } => {
                let proxy = Proxy::all(proxy.as_str())?.basic_auth(username, password);
                Ok(builder.proxy(proxy))
            }
            _ => Ok(builder),
        }
    }

    /// Build the concrete call for `request`.
    pub fn prepare(&self, client: &Client, request: &HubRequest) -> RequestBuilder {
        let builder = match self {
            PathStrategy::Direct | PathStrategy::BrightData { .. } => {
                client.request(request.method.clone(), request.url.clone())
            }
            PathStrategy::ScraperApi { endpoint, api_key } => {
                let mut url = endpoint.clone();
                url.query_pairs_mut()
                    .append_pair("api_key", api_key)
                    .append_pair("url", request.url.as_str());
                client.request(request.method.clone(), url)
            }
            PathStrategy::Relay { endpoint, .. } => {
                let mut url = endpoint.clone();
                url.query_pairs_mut().append_pair("url", request.url.as_str());
                client.request(request.method.clone(), url)
            }
        };

        let mut builder = builder.headers(request.headers.clone());

        if let PathStrategy::Relay { token, .. } = self {
            builder = builder.header(X_FORWARDED_FOR, random_client_ip());
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => builder = builder.header(AUTHORIZATION, value),
                Err(_) => tracing::warn!("Relay token is not a valid header value"),
            }
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        builder
    }
}

impl std::fmt::Debug for PathStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credentials are never printed.
        match self {
            PathStrategy::Direct => f.write_str("Direct"),
            PathStrategy::ScraperApi { endpoint, .. } => f
                .debug_struct("ScraperApi")
                .field("endpoint", &endpoint.as_str())
                .finish(),
            PathStrategy::BrightData { proxy, username, .. } => f
                .debug_struct("BrightData")
                .field("proxy", &proxy.as_str())
                .field("username", username)
                .finish(),
            PathStrategy::Relay { endpoint, .. } => f
                .debug_struct("Relay")
                .field("endpoint", &endpoint.as_str())
                .finish(),
        }
    }
}

/// A random routable-looking IPv4 address.
fn random_client_ip() -> String {
    format!(
        "{}.{}.{}.{}",
        fastrand::u8(1..=223),
        fastrand::u8(..),
        fastrand::u8(..),
        fastrand::u8(1..=254)
    )
}
