//! Exponential backoff with ±20% jitter, and `Retry-After` parsing.
//!
//! `delay = min(base * 2^min(attempt, 3) * (1 ± 0.2), max)`.

use std::time::Duration;

/// Exponent stops growing after this many attempts.
const MAX_EXPONENT: usize = 3;

/// Jitter spread around the nominal delay (±20%).
const JITTER: f64 = 0.2;

/// Delay to sleep after a failed `attempt` (0-indexed).
pub fn backoff_delay(attempt: usize, base: Duration, max: Duration) -> Duration {
    let exponent = attempt.min(MAX_EXPONENT) as i32;
    let factor = 1.0 + (fastrand::f64() * 2.0 - 1.0) * JITTER;
    let secs = base.as_secs_f64() * 2f64.powi(exponent) * factor;
    Duration::from_secs_f64(secs.max(0.0)).min(max)
}

/// Parse a `Retry-After` header as non-negative decimal seconds.
///
/// HTTP-date values and anything else non-numeric are treated as absent.
pub fn parse_retry_after(value: Option<&str>) -> Option<f64> {
    let secs: f64 = value?.trim().parse().ok()?;
    if secs.is_finite() && secs >= 0.0 {
        Some(secs)
    } else {
        None
    }
}
