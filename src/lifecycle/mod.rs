//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build hub → Start monitor, watcher, admin API
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → broadcast → monitor loop exits,
//!     admin server drains → process exits
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
