//! Health tracking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive (every dispatch attempt):
//!     Dispatcher → registry.record_outcome → state.rs rules
//!                → history.rs sample
//!
//! Active (active.rs):
//!     Periodic timer
//!     → Probe each enabled path directly through the executor
//!     → Unhealthy + success: rehabilitate to Degraded
//!     → other success: last_checked + history sample only
//!     → failure: same record_outcome as real traffic
//! ```
//!
//! # Design Decisions
//! - Health state is per path and only derived from outcomes
//! - Rehabilitation is half-open: a path earns Healthy through real traffic
//! - History is for inspection only, routing reads live state

pub mod active;
pub mod history;
pub mod state;

pub use active::{HealthMonitor, ProbeReport};
pub use history::{HealthHistory, HealthSample};
pub use state::{HealthStatus, PathHealth};
