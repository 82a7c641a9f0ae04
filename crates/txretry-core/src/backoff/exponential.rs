//! Exponential backoff with optional jitter.

use rand::Rng;
use std::time::Duration;

use super::{BackoffConfig, BackoffStrategy, JitterKind};

/// Configuration for [`Exponential`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialConfig {
    pub backoff: BackoffConfig,
    /// Growth factor per attempt. Values below 1.0 (and NaN) are treated as 1.0.
    pub multiplier: f64,
    pub jitter: JitterKind,
}

/// `base_delay * multiplier^attempt`, capped at `max_delay`, then jittered.
///
/// Jitter is applied to the capped value, so the result never exceeds
/// `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    config: ExponentialConfig,
}

impl Exponential {
    pub fn new(config: ExponentialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExponentialConfig {
        &self.config
    }

    /// Deterministic part of the delay: grown and capped, before jitter.
    pub fn capped_delay(&self, attempt: u32) -> Duration {
        let BackoffConfig {
            base_delay,
            max_delay,
        } = self.config.backoff;
        if base_delay.is_zero() {
            return Duration::ZERO;
        }
        let multiplier = self.config.multiplier.max(1.0);
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);

        // Computed in nanoseconds so integral multipliers stay exact.
        let raw = base_delay.as_nanos() as f64 * multiplier.powi(exp);
        let cap = max_delay.as_nanos() as f64;
        if raw.is_nan() || raw >= cap {
            return max_delay;
        }
        Duration::from_nanos(raw as u64)
    }
}

impl BackoffStrategy for Exponential {
    fn delay(&self, attempt: u32) -> Duration {
        let capped = self.capped_delay(attempt);
        apply_jitter(capped, self.config.jitter)
    }
}

/// Layer randomness onto `delay` without ever exceeding it.
pub(crate) fn apply_jitter(delay: Duration, jitter: JitterKind) -> Duration {
    match jitter {
        JitterKind::None => delay,
        JitterKind::Full => {
            if delay.is_zero() {
                delay
            } else {
                random_below(delay)
            }
        }
        JitterKind::Equal => {
            let half = delay / 2;
            if half.is_zero() {
                delay
            } else {
                half + random_below(half)
            }
        }
    }
}

/// Uniform duration in `[0, upper)`; `upper` must be non-zero.
fn random_below(upper: Duration) -> Duration {
    let nanos = u64::try_from(upper.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rand::thread_rng().gen_range(0..nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exp(base_ms: u64, max_ms: u64, multiplier: f64, jitter: JitterKind) -> Exponential {
        Exponential::new(ExponentialConfig {
            backoff: BackoffConfig {
                base_delay: Duration::from_millis(base_ms),
                max_delay: Duration::from_millis(max_ms),
            },
            multiplier,
            jitter,
        })
    }

    #[test]
    fn grows_by_multiplier_without_jitter() {
        let b = exp(100, 10_000, 2.0, JitterKind::None);
        assert_eq!(b.delay(0), Duration::from_millis(100));
        assert_eq!(b.delay(1), Duration::from_millis(200));
        assert_eq!(b.delay(2), Duration::from_millis(400));
        assert_eq!(b.delay(3), Duration::from_millis(800));
    }

    #[test]
    fn monotonic_and_capped() {
        let b = exp(100, 5_000, 2.0, JitterKind::None);
        let mut prev = Duration::ZERO;
        for attempt in 0..64 {
            let d = b.delay(attempt);
            assert!(d >= prev, "attempt {attempt}: {d:?} < {prev:?}");
            assert!(d <= Duration::from_secs(5));
            prev = d;
        }
        assert_eq!(b.delay(63), Duration::from_secs(5));
    }

    #[test]
    fn huge_attempt_saturates_to_cap() {
        let b = exp(100, 5_000, 10.0, JitterKind::None);
        assert_eq!(b.delay(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn multiplier_below_one_is_flat() {
        let b = exp(100, 5_000, 0.5, JitterKind::None);
        assert_eq!(b.delay(0), Duration::from_millis(100));
        assert_eq!(b.delay(5), Duration::from_millis(100));
        let nan = exp(100, 5_000, f64::NAN, JitterKind::None);
        assert_eq!(nan.delay(3), Duration::from_millis(100));
    }

    #[test]
    fn cap_below_base_wins() {
        let b = exp(500, 200, 2.0, JitterKind::None);
        assert_eq!(b.delay(0), Duration::from_millis(200));
        assert_eq!(b.delay(4), Duration::from_millis(200));
    }

    #[test]
    fn full_jitter_within_zero_and_raw() {
        let b = exp(100, 5_000, 2.0, JitterKind::Full);
        for attempt in 0..10 {
            let raw = b.capped_delay(attempt);
            for _ in 0..50 {
                assert!(b.delay(attempt) < raw);
            }
        }
    }

    #[test]
    fn equal_jitter_within_half_and_raw() {
        let b = exp(100, 5_000, 2.0, JitterKind::Equal);
        for attempt in 0..10 {
            let raw = b.capped_delay(attempt);
            for _ in 0..50 {
                let d = b.delay(attempt);
                assert!(d >= raw / 2, "{d:?} below half of {raw:?}");
                assert!(d < raw);
            }
        }
    }

    #[test]
    fn jitter_on_zero_delay_is_zero() {
        assert_eq!(apply_jitter(Duration::ZERO, JitterKind::Full), Duration::ZERO);
        assert_eq!(apply_jitter(Duration::ZERO, JitterKind::Equal), Duration::ZERO);
        // half of 1ns rounds down to zero: equal jitter falls back to the raw value.
        let one = Duration::from_nanos(1);
        assert_eq!(apply_jitter(one, JitterKind::Equal), one);
        assert_eq!(apply_jitter(one, JitterKind::Full), Duration::ZERO);
    }
}
