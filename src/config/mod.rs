//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HubConfig (validated)
//!     → Hub::from_config builds registry + executors
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → Hub::apply_reload (enabled flags, retry settings)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Credentials may be named by environment variable instead of inlined
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, HealthCheckConfig, HealthThresholds, HubConfig, ObservabilityConfig,
    PathConfig, PathKind, RetryConfig, TimeoutConfig,
};
