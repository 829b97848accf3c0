//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Registry, dispatcher, monitor produce:
//!     → logging.rs (structured tracing events, dispatch spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
