//! Path registry subsystem.
//!
//! # Data Flow
//! ```text
//! HubConfig.paths
//!     → path.rs (one PathEntry per path: enabled flag + locked PathHealth)
//!     → table.rs (arena + name index)
//!
//! Dispatcher:  list_enabled() → ranked snapshots
//!              record_outcome() → health::state update under the path lock
//! Monitor:     enabled_paths(), rehabilitate()
//! Admin:       snapshot(), set_enabled()
//! ```
//!
//! # Design Decisions
//! - Paths are created once and never removed
//! - Each path is locked independently; no registry-wide lock
//! - Readers get copies, never references into live state

pub mod path;
pub mod table;

pub use path::{PathEntry, PathSnapshot};
pub use table::PathRegistry;
