//! Path record.
//!
//! # Responsibilities
//! - Represent a single routing path (static config + live health)
//! - Serialize health updates per path
//! - Produce consistent read-only snapshots

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::{PathConfig, PathKind};
use crate::health::state::{HealthStatus, PathHealth};

/// A single routing path owned by the registry.
#[derive(Debug)]
pub struct PathEntry {
    /// Unique path name.
    pub name: String,
    /// Strategy kind.
    pub kind: PathKind,
    /// Static priority, lower preferred.
    pub priority: u32,
    /// Administrative flag.
    enabled: AtomicBool,
    /// Live counters; one `record_outcome` applies under one lock.
    health: Mutex<PathHealth>,
}

impl PathEntry {
    /// Create a path from configuration with fresh health state.
    pub fn new(config: &PathConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: config.kind,
            priority: config.priority,
            enabled: AtomicBool::new(config.enabled),
            health: Mutex::new(PathHealth::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Lock the health record. A poisoned lock still holds valid counters.
    pub(crate) fn health(&self) -> MutexGuard<'_, PathHealth> {
        self.health.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> HealthStatus {
        self.health().status
    }

    /// Copy the current state.
    pub fn snapshot(&self) -> PathSnapshot {
        let health = self.health().clone();
        PathSnapshot::new(self, &health)
    }
}

/// Read-only view of one path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathSnapshot {
    pub name: String,
    pub kind: PathKind,
    pub priority: u32,
    pub enabled: bool,
    pub status: HealthStatus,
    pub last_checked: Option<u64>,
    pub failure_count: u32,
    pub success_count: u64,
    pub average_latency_ms: f64,
    pub failure_rate: f64,
    pub total_requests: u64,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
}

impl PathSnapshot {
    pub(crate) fn new(entry: &PathEntry, health: &PathHealth) -> Self {
        Self {
            name: entry.name.clone(),
            kind: entry.kind,
            priority: entry.priority,
            enabled: entry.is_enabled(),
            status: health.status,
            last_checked: health.last_checked,
            failure_count: health.failure_count,
            success_count: health.success_count,
            average_latency_ms: health.average_latency_ms,
            failure_rate: health.failure_rate(),
            total_requests: health.total_requests,
            last_success: health.last_success,
            last_failure: health.last_failure,
        }
    }
}
