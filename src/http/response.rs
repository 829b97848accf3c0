//! Normalized response returned to callers.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;

/// Provider reported when no path served the request.
pub const NO_PROVIDER: &str = "none";

/// Result of executing a request over one path, or of a whole dispatch.
///
/// Failures are values: `success == false` with `error` set. A transport
/// failure has `status == 0`.
#[derive(Debug, Clone)]
pub struct HubResponse {
    pub success: bool,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Name of the path that produced this response.
    pub provider: String,
    pub latency: Duration,
    pub error: Option<String>,
}

impl HubResponse {
    /// Response from a completed HTTP exchange. 2xx and 3xx count as success.
    pub fn from_status(
        provider: impl Into<String>,
        status: u16,
        headers: HeaderMap,
        body: Bytes,
        latency: Duration,
    ) -> Self {
        let success = is_success_status(status);
        Self {
            success,
            status,
            headers,
            body,
            provider: provider.into(),
            latency,
            error: (!success).then(|| format!("HTTP {status}")),
        }
    }

    /// Transport failure (DNS, connect, timeout, cancellation).
    pub fn transport_failure(
        provider: impl Into<String>,
        error: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            success: false,
            status: 0,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            provider: provider.into(),
            latency,
            error: Some(error.into()),
        }
    }

    /// Dispatch-level failure not attributable to any path.
    pub fn exhausted(error: impl Into<String>, latency: Duration) -> Self {
        Self::transport_failure(NO_PROVIDER, error, latency)
    }

    /// Error text, or a placeholder when none was recorded.
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("unknown error")
    }

    /// Body as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Status codes in `[200, 399]` are successful.
pub fn is_success_status(status: u16) -> bool {
    (200..=399).contains(&status)
}
