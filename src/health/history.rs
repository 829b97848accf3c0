//! Per-path health history.
//!
//! Capped ring buffer of samples per path, appended on every outcome.
//! Inspection only; routing never reads it.

use std::collections::VecDeque;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

use crate::health::state::{now_millis, HealthStatus};
use crate::registry::PathSnapshot;

/// One observation of a path's health.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSample {
    pub path: String,
    pub status: HealthStatus,
    pub latency_ms: u64,
    pub failure_rate: f64,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
    pub consecutive_failures: u32,
    pub recorded_at: u64,
}

impl HealthSample {
    /// Build a sample from the state a path was left in after an outcome.
    pub fn from_snapshot(snapshot: &PathSnapshot, latency: Duration) -> Self {
        Self {
            path: snapshot.name.clone(),
            status: snapshot.status,
            latency_ms: latency.as_millis() as u64,
            failure_rate: snapshot.failure_rate,
            last_success: snapshot.last_success,
            last_failure: snapshot.last_failure,
            consecutive_failures: snapshot.failure_count,
            recorded_at: now_millis(),
        }
    }
}

/// Thread-safe store of health samples keyed by path name.
#[derive(Debug)]
pub struct HealthHistory {
    capacity: usize,
    samples: DashMap<String, VecDeque<HealthSample>>,
}

impl HealthHistory {
    /// Create a store keeping at most `capacity` samples per path.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: DashMap::new(),
        }
    }

    /// Append a sample, trimming the oldest ones beyond capacity.
    pub fn record(&self, sample: HealthSample) {
        // The entry guard holds the shard lock across push and trim.
        let mut buffer = self.samples.entry(sample.path.clone()).or_default();
        buffer.push_back(sample);
        while buffer.len() > self.capacity {
            buffer.pop_front();
        }
    }

    /// Samples for `path`, oldest first. Empty if none were recorded.
    pub fn history(&self, path: &str) -> Vec<HealthSample> {
        self.samples
            .get(path)
            .map(|buffer| buffer.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Most recent sample for `path`.
    pub fn latest(&self, path: &str) -> Option<HealthSample> {
        self.samples.get(path).and_then(|b| b.back().cloned())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
