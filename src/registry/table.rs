//! Path table.
//!
//! # Responsibilities
//! - Hold every configured path for the process lifetime
//! - Rank routable paths for dispatch
//! - Apply outcomes and administrative toggles by name

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{HealthThresholds, PathConfig};
use crate::health::state::{now_millis, HealthStatus};
use crate::registry::path::{PathEntry, PathSnapshot};

/// Source of truth for path configuration and live health.
#[derive(Debug)]
pub struct PathRegistry {
    /// Insertion-ordered arena.
    paths: Vec<Arc<PathEntry>>,
    /// Name → arena index; immutable after construction.
    index: HashMap<String, usize>,
    thresholds: HealthThresholds,
}

impl PathRegistry {
    /// Create a registry from configuration. Later duplicates of a name are
    /// ignored (validation rejects them before this point).
    pub fn new(configs: &[PathConfig], thresholds: HealthThresholds) -> Self {
        let mut paths = Vec::with_capacity(configs.len());
        let mut index = HashMap::with_capacity(configs.len());

        for config in configs {
            if index.contains_key(&config.name) {
                tracing::warn!(path = %config.name, "Duplicate path name ignored");
                continue;
            }
            index.insert(config.name.clone(), paths.len());
            paths.push(Arc::new(PathEntry::new(config)));
        }

        Self {
            paths,
            index,
            thresholds,
        }
    }

    fn entry(&self, name: &str) -> Option<&Arc<PathEntry>> {
        self.index.get(name).map(|&i| &self.paths[i])
    }

    /// Routable paths: enabled and not unhealthy, ordered by
    /// `(priority, status rank)` with insertion order breaking ties.
    pub fn list_enabled(&self) -> Vec<PathSnapshot> {
        let mut ranked: Vec<PathSnapshot> = self
            .paths
            .iter()
            .filter(|p| p.is_enabled())
            .map(|p| p.snapshot())
            .filter(|s| s.status != HealthStatus::Unhealthy)
            .collect();
        // sort_by_key is stable
        ranked.sort_by_key(|s| (s.priority, s.status.rank()));
        ranked
    }

    /// Enabled paths regardless of health, in insertion order.
    pub fn enabled_paths(&self) -> Vec<PathSnapshot> {
        self.paths
            .iter()
            .filter(|p| p.is_enabled())
            .map(|p| p.snapshot())
            .collect()
    }

    /// Toggle a path. Returns false if the name is unknown.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        match self.entry(name) {
            Some(entry) => {
                if entry.is_enabled() != enabled {
                    tracing::info!(path = %name, enabled, "Path enabled flag changed");
                }
                entry.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Apply one outcome atomically and return the resulting state.
    /// Unknown names are ignored.
    pub fn record_outcome(
        &self,
        name: &str,
        success: bool,
        latency: Duration,
    ) -> Option<PathSnapshot> {
        let Some(entry) = self.entry(name) else {
            tracing::debug!(path = %name, "Outcome for unknown path ignored");
            return None;
        };

        let mut health = entry.health();
        let before = health.status;
        let now = now_millis();
        if success {
            health.record_success(latency, now, &self.thresholds);
        } else {
            health.record_failure(now, &self.thresholds);
        }

        if health.status != before {
            tracing::info!(
                path = %name,
                from = %before,
                to = %health.status,
                failures = health.failure_count,
                avg_latency_ms = health.average_latency_ms,
                "Path health changed"
            );
        }

        Some(PathSnapshot::new(entry, &health))
    }

    /// Move an unhealthy path back to degraded. Returns the new state, or
    /// `None` if the path is unknown or was not unhealthy.
    pub fn rehabilitate(&self, name: &str) -> Option<PathSnapshot> {
        let entry = self.entry(name)?;
        let mut health = entry.health();
        if !health.rehabilitate(now_millis()) {
            return None;
        }
        tracing::info!(path = %name, "Unhealthy path rehabilitated to degraded");
        Some(PathSnapshot::new(entry, &health))
    }

    /// Note a successful probe on a routable path. Status, counters and
    /// the latency mean are only moved by real traffic.
    pub fn mark_checked(&self, name: &str) -> Option<PathSnapshot> {
        let entry = self.entry(name)?;
        let mut health = entry.health();
        health.mark_checked(now_millis());
        Some(PathSnapshot::new(entry, &health))
    }

    /// Copy of every path in insertion order.
    pub fn snapshot(&self) -> Vec<PathSnapshot> {
        self.paths.iter().map(|p| p.snapshot()).collect()
    }

    /// Copy of one path.
    pub fn get(&self, name: &str) -> Option<PathSnapshot> {
        self.entry(name).map(|p| p.snapshot())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
