//! Reconnect pacing
//!
//! A socket that opened and later closed is reopened after a fixed delay
//! (zero by default). Connect attempts that never open back off exponentially
//! up to a cap. Retries never stop.

use relay_common::ReconnectConfig;
use std::time::Duration;

/// Delay calculator for one bot's connect loop
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    after_close: Duration,
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new(after_close: Duration, initial: Duration, max: Duration) -> Self {
        Self {
            after_close,
            initial,
            max: max.max(initial),
            failures: 0,
        }
    }

    /// Delay before reopening a socket that was open
    #[must_use]
    pub fn after_close(&self) -> Duration {
        self.after_close
    }

    /// Delay after a failed connect attempt; grows with each consecutive failure
    pub fn after_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let factor = 2u32.saturating_pow(self.failures - 1);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Consecutive failed attempts since the last successful open
    #[must_use]
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Forget failures after a socket opens
    pub fn reset(&mut self) {
        self.failures = 0;
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self::new(
            Duration::from_millis(config.delay_ms),
            Duration::from_millis(config.failure_backoff_initial_ms),
            Duration::from_millis(config.failure_backoff_max_ms),
        )
    }
}
