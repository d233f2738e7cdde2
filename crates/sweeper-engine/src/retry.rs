//! Outcome classification and backoff policy for the delete protocol.
//!
//! Every attempt's HTTP status falls into exactly one disposition:
//! success, throttled, retryable, or fatal. Throttled responses wait the
//! server-directed duration when one is supplied; retryable ones wait an
//! exponentially growing, capped, jittered delay.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Retry policy for a delete batch.
///
/// `retry_limit` counts *retries*, so a target may be attempted
/// `retry_limit + 1` times in total before it is marked failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries per target.
    pub retry_limit: u32,

    /// Base delay for exponential backoff calculation.
    pub base_delay: Duration,

    /// Maximum delay between retry attempts.
    pub max_delay: Duration,

    /// Jitter fraction (0.0 to 0.25) applied to backoff delays.
    ///
    /// Bounded at 0.25 so jittered delays stay non-decreasing across
    /// consecutive retries of the same target.
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: crate::DEFAULT_RETRY_LIMIT,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
            jitter_factor: 0.25,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retry number `retry_count` (1-indexed).
    ///
    /// Doubles per retry from `base_delay`, capped at `max_delay`, with
    /// the configured jitter applied.
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.min(20);
        let multiplier = 2_u32.saturating_pow(exponent);
        let delay = self.base_delay.saturating_mul(multiplier);

        let capped = std::cmp::min(delay, self.max_delay);
        std::cmp::min(apply_jitter(capped, self.jitter_factor), self.max_delay)
    }
}

/// Classification of one attempt's HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// 2xx: the delete took effect.
    Success,
    /// 429: the service requested a slowdown.
    Throttled,
    /// Request-timeout or 5xx class: transient, safe to retry blind.
    Retryable,
    /// Anything else: retrying is assumed futile.
    Fatal,
}

/// Classifies an HTTP status code into its disposition.
pub fn classify_status(status: u16) -> Disposition {
    match status {
        200..=299 => Disposition::Success,
        429 => Disposition::Throttled,
        408 | 500..=599 => Disposition::Retryable,
        _ => Disposition::Fatal,
    }
}

/// Randomizes a delay by ±`jitter_factor` to spread retry bursts.
fn apply_jitter(duration: Duration, jitter_factor: f64) -> Duration {
    if jitter_factor <= 0.0 {
        return duration;
    }

    let clamped_jitter = jitter_factor.clamp(0.0, 0.25);

    let mut rng = rand::rng();
    let jitter_range = duration.as_secs_f64() * clamped_jitter;
    let jitter_offset = rng.random_range(-jitter_range..=jitter_range);
    let jittered_secs = duration.as_secs_f64() + jitter_offset;

    Duration::from_secs_f64(jittered_secs.max(0.0))
}
