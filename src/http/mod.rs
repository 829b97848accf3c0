//! Request and response values exchanged with callers.
//!
//! # Data Flow
//! ```text
//! Caller builds HubRequest
//!     → Dispatcher ranks paths
//!     → executor turns it into a concrete call per path
//!     → HubResponse (success flag, status, serving path, latency, error)
//! ```

pub mod request;
pub mod response;

pub use request::HubRequest;
pub use response::{is_success_status, HubResponse, NO_PROVIDER};
