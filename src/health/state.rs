//! Path health state machine.
//!
//! # States
//! - Healthy: preferred within a priority level
//! - Degraded: still routable, ranked after healthy paths of equal priority
//! - Unhealthy: excluded from dispatch, probed by the health monitor
//!
//! # State Transitions
//! ```text
//! Healthy ⇄ Degraded:   average success latency crosses the thresholds
//! Healthy/Degraded → Unhealthy: consecutive failures >= threshold
//! Unhealthy → Degraded: successful health probe (rehabilitation), or a
//!                       success from a dispatch that ranked the path
//!                       before it crossed the threshold
//! ```
//!
//! A single success never lifts an unhealthy path past degraded.
//!
//! There is no terminal state. Status is only ever derived from outcomes.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::config::HealthThresholds;

/// Derived health classification of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Ranking weight within a priority level; lower is preferred.
    pub fn rank(self) -> u8 {
        match self {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        }
    }

    /// Gauge value for metrics: 1=healthy, 0.5=degraded, 0=unhealthy.
    pub fn as_gauge(self) -> f64 {
        match self {
            HealthStatus::Healthy => 1.0,
            HealthStatus::Degraded => 0.5,
            HealthStatus::Unhealthy => 0.0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        };
        f.write_str(s)
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Live health counters of one path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHealth {
    pub status: HealthStatus,
    /// Epoch millis of the most recent outcome.
    pub last_checked: Option<u64>,
    /// Consecutive failures; reset by any success.
    pub failure_count: u32,
    pub success_count: u64,
    /// Running mean over successful calls only.
    pub average_latency_ms: f64,
    pub total_requests: u64,
    pub total_failures: u64,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
}

impl Default for PathHealth {
    fn default() -> Self {
        Self {
            status: HealthStatus::Healthy,
            last_checked: None,
            failure_count: 0,
            success_count: 0,
            average_latency_ms: 0.0,
            total_requests: 0,
            total_failures: 0,
            last_success: None,
            last_failure: None,
        }
    }
}

impl PathHealth {
    /// Apply a successful outcome observed at `now`.
    pub fn record_success(&mut self, latency: Duration, now: u64, thresholds: &HealthThresholds) {
        self.success_count += 1;
        self.total_requests += 1;
        self.failure_count = 0;

        let n = self.success_count as f64;
        let latency_ms = latency.as_secs_f64() * 1000.0;
        self.average_latency_ms = (self.average_latency_ms * (n - 1.0) + latency_ms) / n;

        if self.status == HealthStatus::Unhealthy {
            self.status = HealthStatus::Degraded;
        } else if self.average_latency_ms < thresholds.healthy_latency_ms {
            self.status = HealthStatus::Healthy;
        } else if self.average_latency_ms < thresholds.degraded_latency_ms {
            self.status = HealthStatus::Degraded;
        }

        self.last_success = Some(now);
        self.last_checked = Some(now);
    }

    /// Apply a failed outcome observed at `now`.
    pub fn record_failure(&mut self, now: u64, thresholds: &HealthThresholds) {
        self.failure_count += 1;
        self.total_requests += 1;
        self.total_failures += 1;

        if self.failure_count >= thresholds.unhealthy_after_failures {
            self.status = HealthStatus::Unhealthy;
        }

        self.last_failure = Some(now);
        self.last_checked = Some(now);
    }

    /// Note a check that observed no change, such as a probe answered by
    /// a routable path.
    pub fn mark_checked(&mut self, now: u64) {
        self.last_checked = Some(now);
    }

    /// Half-open transition: Unhealthy → Degraded with failures cleared.
    /// Returns false (and changes nothing) for any other status.
    pub fn rehabilitate(&mut self, now: u64) -> bool {
        if self.status != HealthStatus::Unhealthy {
            return false;
        }
        self.status = HealthStatus::Degraded;
        self.failure_count = 0;
        self.last_success = Some(now);
        self.last_checked = Some(now);
        true
    }

    /// Fraction of all recorded requests that failed.
    pub fn failure_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_failures as f64 / self.total_requests as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_unhealthy_after_five_consecutive_failures() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        for _ in 0..4 {
            h.record_failure(1, &t);
            assert_eq!(h.status, HealthStatus::Healthy);
        }
        h.record_failure(1, &t);
        assert_eq!(h.status, HealthStatus::Unhealthy);
        assert_eq!(h.average_latency_ms, 0.0);
    }

    #[test]
    fn test_success_interrupts_failure_streak() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        for _ in 0..4 {
            h.record_failure(1, &t);
        }
        h.record_success(ms(10), 2, &t);
        assert_eq!(h.failure_count, 0);
        for _ in 0..4 {
            h.record_failure(3, &t);
        }
        assert_eq!(h.status, HealthStatus::Healthy);
        h.record_failure(3, &t);
        assert_eq!(h.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_running_mean_matches_arithmetic_mean() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        let samples = [120u64, 480, 75, 1900, 333];
        for s in samples {
            h.record_success(ms(s), 1, &t);
            h.record_failure(1, &t);
        }
        let mean = samples.iter().sum::<u64>() as f64 / samples.len() as f64;
        assert!((h.average_latency_ms - mean).abs() < 1e-6);
        assert_eq!(h.success_count, 5);
        assert!((h.failure_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latency_thresholds() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        h.record_success(ms(1500), 1, &t);
        assert_eq!(h.status, HealthStatus::Degraded);
        h.record_success(ms(100), 1, &t);
        // mean 800
        assert_eq!(h.status, HealthStatus::Healthy);

        // Above the degraded threshold the status is left unchanged.
        let mut slow = PathHealth::default();
        slow.record_success(ms(5000), 1, &t);
        assert_eq!(slow.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_rehabilitate_only_from_unhealthy() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        assert!(!h.rehabilitate(1));
        for _ in 0..5 {
            h.record_failure(1, &t);
        }
        assert!(h.rehabilitate(2));
        assert_eq!(h.status, HealthStatus::Degraded);
        assert_eq!(h.failure_count, 0);
        h.record_success(ms(20), 3, &t);
        assert_eq!(h.status, HealthStatus::Healthy);
    }

    #[test]
    fn test_success_while_unhealthy_stops_at_degraded() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        for _ in 0..5 {
            h.record_failure(1, &t);
        }
        h.record_success(ms(10), 2, &t);
        assert_eq!(h.status, HealthStatus::Degraded);
        assert_eq!(h.failure_count, 0);
        h.record_success(ms(10), 3, &t);
        assert_eq!(h.status, HealthStatus::Healthy);

        // Too slow to classify, but no longer unhealthy once failures reset.
        let mut slow = PathHealth::default();
        for _ in 0..5 {
            slow.record_failure(1, &t);
        }
        slow.record_success(ms(5000), 2, &t);
        assert_eq!(slow.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_mark_checked_leaves_counters() {
        let t = HealthThresholds::default();
        let mut h = PathHealth::default();
        h.record_success(ms(1500), 1, &t);
        let before = h.clone();
        h.mark_checked(9);
        assert_eq!(h.last_checked, Some(9));
        assert_eq!(h.status, before.status);
        assert_eq!(h.success_count, before.success_count);
        assert_eq!(h.average_latency_ms, before.average_latency_ms);
    }
}
