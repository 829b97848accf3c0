//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Delay before retrying after the failed attempt `attempt` (0-based):
/// `base_ms * 2^attempt`, capped at `max_ms`, plus up to 10% jitter.
///
/// With a 1s base the sequence is 1s, 2s, 4s, ...; the jitter only ever
/// lengthens the delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential = 2u64.saturating_pow(attempt);
    let capped_delay = base_ms.saturating_mul(exponential).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
