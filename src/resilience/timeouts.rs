//! Timeout enforcement.
//!
//! Every executor invocation runs under a deadline. An elapsed deadline is
//! reported like any other transport failure.

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::http::HubResponse;

/// Run `call` for `path`, converting an elapsed `deadline` into a failure.
pub async fn with_deadline<F>(path: &str, deadline: Duration, call: F) -> HubResponse
where
    F: Future<Output = HubResponse>,
{
    let start = Instant::now();
    match time::timeout(deadline, call).await {
        Ok(response) => response,
        Err(_) => HubResponse::transport_failure(
            path,
            format!("timed out after {}ms", deadline.as_millis()),
            start.elapsed(),
        ),
    }
}
