use std::time::Duration;

use crate::Config;

/// Reconnect delay policy.
///
/// Delay stays at `min` until failure count exceeds `max_fails`, then grows as
/// `min * count²`, never beyond `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    min_ms: u64,
    max_ms: u64,
    max_fails: u32,
}

impl Backoff {
    pub fn new(config: &Config) -> Self {
        Self {
            min_ms: config.min_retry_ms,
            max_ms: config.max_retry_ms.max(config.min_retry_ms),
            max_fails: config.max_fails,
        }
    }

    pub fn delay(&self, fail_count: u32) -> Duration {
        let mut ms = self.min_ms;

        if fail_count > self.max_fails {
            let count = u64::from(fail_count);
            ms = ms.saturating_mul(count.saturating_mul(count));
            ms = ms.min(self.max_ms);
        }

        Duration::from_millis(ms)
    }
}
