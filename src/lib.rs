//! Outbound request hub.
//!
//! Routes HTTP requests through a ranked set of network paths (direct and
//! forwarding services), retries with backoff, and tracks per-path health.

pub mod admin;
pub mod config;
pub mod executor;
pub mod health;
pub mod http;
pub mod hub;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod resilience;

pub use config::schema::HubConfig;
pub use http::{HubRequest, HubResponse};
pub use hub::{Hub, HubError, ToggleError};
pub use lifecycle::Shutdown;
