//! Path execution subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / HealthMonitor
//!     → PathExecutor::execute(path, request)
//!     → strategy.rs (attach path-specific credentials)
//!     → client.rs (reqwest call, normalize into HubResponse)
//! ```
//!
//! # Design Decisions
//! - Closed set of strategies (direct + three forwarding services)
//! - Executors never touch registry state
//! - Failures are returned as `HubResponse` values, never raised
//! - Deadlines are enforced by the caller (resilience::timeouts)

pub mod client;
pub mod strategy;

use std::future::Future;

use crate::http::{HubRequest, HubResponse};

pub use client::{HttpExecutor, TransportError};
pub use strategy::{PathStrategy, StrategyError};

/// Turns an abstract request into a concrete call over one named path.
pub trait PathExecutor: Send + Sync + 'static {
    /// Execute `request` over `path`. Must not panic; every failure is a
    /// response with `success == false`.
    fn execute(
        &self,
        path: &str,
        request: &HubRequest,
    ) -> impl Future<Output = HubResponse> + Send;

    /// Whether `path` can carry traffic at all. Unavailable paths stay
    /// disabled whatever the configuration or admin API asks for.
    fn is_available(&self, _path: &str) -> bool {
        true
    }
}
