//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! dispatch(request):
//!     → dispatcher.rs (rank paths, loop, record outcomes)
//!     → timeouts.rs (per-attempt deadline, default 30s)
//!     → On failure: backoff.rs (1s, 2s, 4s ... before retrying the same path)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every executor call has a deadline
//! - Backoff applies between retries of one path, never between paths
//! - No aggregate deadline; callers wrap `dispatch` if they need one
//! - Failures are values, `dispatch` has no error type

pub mod backoff;
pub mod dispatcher;
pub mod timeouts;

pub use dispatcher::{Dispatcher, NO_AVAILABLE_PATHS};
