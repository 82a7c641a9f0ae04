//! Linear backoff.

use std::time::Duration;

use super::{BackoffConfig, BackoffStrategy};

/// Configuration for [`Linear`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearConfig {
    pub backoff: BackoffConfig,
    /// Added to the delay for each further attempt.
    pub increment: Duration,
}

/// `min(base_delay + attempt * increment, max_delay)`. Never jittered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linear {
    config: LinearConfig,
}

impl Linear {
    pub fn new(config: LinearConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinearConfig {
        &self.config
    }
}

impl BackoffStrategy for Linear {
    fn delay(&self, attempt: u32) -> Duration {
        let LinearConfig { backoff, increment } = self.config;
        backoff
            .base_delay
            .saturating_add(increment.saturating_mul(attempt))
            .min(backoff.max_delay)
    }
}
