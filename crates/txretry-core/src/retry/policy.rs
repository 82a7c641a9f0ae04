use std::fmt;
use std::time::Duration;

use crate::backoff::SharedBackoff;
use crate::classify::ErrorKind;
use crate::tx::TxOptions;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Attempt budget plus backoff strategy.
///
/// Only serialization failures are retried; every other kind, including
/// `Other` (no recognizable state code), is final.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    pub backoff: SharedBackoff,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: SharedBackoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    pub fn from_options(opts: &TxOptions) -> Self {
        Self::new(opts.effective_max_attempts(), opts.effective_backoff())
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with `kind`.
    ///
    /// The backoff strategy is zero-based, so the wait after the first
    /// failure is `backoff.delay(0)`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff.delay(attempt.saturating_sub(1)))
    }
}
