//! Backoff strategies for spacing out transaction retries.
//!
//! A strategy maps a zero-based retry counter to the delay to wait before the
//! next attempt. Strategies are immutable values; the jittered variants draw
//! from the thread-local RNG, so a single strategy can be shared across
//! concurrent retry loops.

mod exponential;
mod linear;

pub use exponential::{Exponential, ExponentialConfig};
pub use linear::{Linear, LinearConfig};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Base delay shared by the default presets.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);
/// Delay cap shared by the default presets.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Computes the delay before retry number `attempt` (0 = first retry).
pub trait BackoffStrategy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

impl<F> BackoffStrategy for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, attempt: u32) -> Duration {
        self(attempt)
    }
}

/// Shared, type-erased strategy as stored in transaction options.
pub type SharedBackoff = Arc<dyn BackoffStrategy>;

/// Common configuration for all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any computed delay. A cap below `base_delay` wins.
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

/// How randomness is layered onto the deterministic delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterKind {
    /// Use the computed delay as is.
    #[default]
    None,
    /// Uniform in `[0, delay)`.
    Full,
    /// Half fixed plus uniform in `[0, delay / 2)`.
    Equal,
}

/// Fixed delay regardless of attempt. `Constant(Duration::ZERO)` retries immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constant(pub Duration);

impl BackoffStrategy for Constant {
    fn delay(&self, _attempt: u32) -> Duration {
        self.0
    }
}

/// Exponential backoff, 100ms doubling up to 5s, no jitter.
pub fn default_exponential() -> Exponential {
    Exponential::new(ExponentialConfig {
        backoff: BackoffConfig::default(),
        multiplier: 2.0,
        jitter: JitterKind::None,
    })
}

/// Exponential backoff, 100ms doubling up to 5s, full jitter.
pub fn default_exponential_full_jitter() -> Exponential {
    Exponential::new(ExponentialConfig {
        backoff: BackoffConfig::default(),
        multiplier: 2.0,
        jitter: JitterKind::Full,
    })
}

/// Exponential backoff, 100ms doubling up to 5s, equal jitter.
pub fn default_exponential_equal_jitter() -> Exponential {
    Exponential::new(ExponentialConfig {
        backoff: BackoffConfig::default(),
        multiplier: 2.0,
        jitter: JitterKind::Equal,
    })
}

/// Linear backoff, 100ms plus 100ms per attempt up to 5s.
pub fn default_linear() -> Linear {
    Linear::new(LinearConfig {
        backoff: BackoffConfig::default(),
        increment: Duration::from_millis(100),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_strategies() {
        let s: SharedBackoff = Arc::new(|attempt: u32| Duration::from_millis(10 * u64::from(attempt)));
        assert_eq!(s.delay(0), Duration::ZERO);
        assert_eq!(s.delay(3), Duration::from_millis(30));
    }

    #[test]
    fn constant_ignores_attempt() {
        let c = Constant(Duration::from_millis(7));
        assert_eq!(c.delay(0), Duration::from_millis(7));
        assert_eq!(c.delay(1000), Duration::from_millis(7));
    }

    #[test]
    fn presets_start_at_base_and_respect_cap() {
        assert_eq!(default_exponential().delay(0), DEFAULT_BASE_DELAY);
        assert_eq!(default_linear().delay(0), DEFAULT_BASE_DELAY);
        assert_eq!(default_exponential().delay(30), DEFAULT_MAX_DELAY);
        assert_eq!(default_linear().delay(500), DEFAULT_MAX_DELAY);

        for attempt in 0..20 {
            assert!(default_exponential_full_jitter().delay(attempt) < DEFAULT_MAX_DELAY);
            assert!(default_exponential_equal_jitter().delay(attempt) < DEFAULT_MAX_DELAY);
        }
    }

    #[test]
    fn jitter_kind_from_toml_names() {
        #[derive(Deserialize)]
        struct W {
            jitter: JitterKind,
        }
        let w: W = toml::from_str(r#"jitter = "equal""#).unwrap();
        assert_eq!(w.jitter, JitterKind::Equal);
        let w: W = toml::from_str(r#"jitter = "none""#).unwrap();
        assert_eq!(w.jitter, JitterKind::None);
    }
}
