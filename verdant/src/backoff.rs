use std::time::Duration;

use rand::Rng;
use verdant_core::BackoffConfig;

/// `base_ms` plus a random jitter of up to `jitter_percent` percent.
pub fn jitter_wait(base_ms: u64, jitter_percent: u8) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent)) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Delay before retry number `attempt` (1-based): exponential from
/// `min_backoff_ms`, jittered, capped at `max_backoff_ms`.
pub fn retry_delay(cfg: &BackoffConfig, attempt: u32) -> Duration {
    let factor = u64::from(cfg.factor.max(1));
    let base = cfg
        .min_backoff_ms
        .saturating_mul(factor.saturating_pow(attempt.saturating_sub(1)))
        .min(cfg.max_backoff_ms);
    Duration::from_millis(jitter_wait(base, cfg.jitter_percent).min(cfg.max_backoff_ms))
}
