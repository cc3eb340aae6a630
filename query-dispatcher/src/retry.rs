//! Retry policy for rate-limited agent calls.

use std::time::Duration;

/// Bounded exponential backoff.
///
/// The wait before attempt `n + 1` is `min(multiplier * 2^(n-1), max_delay)`, so the default
/// policy waits 1s then 2s across its three attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` attempts with no waiting in between.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.multiplier
            .checked_mul(1u32 << exp)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}
