/*!
 * Pacing and retry policies for batch submission.
 *
 * The translator asks a `BackoffPolicy` how long to pause between batches
 * and whether (and after how long) to retry a failed backend call.
 */

use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::ThrottleConfig;
use crate::errors::ProviderError;

/// Strategy deciding inter-batch pauses and retry delays
pub trait BackoffPolicy: Send + Sync + Debug {
    /// Pause before submitting every batch after the first
    fn inter_batch_delay(&self) -> Duration;

    /// Delay before retry number `attempt` (1-based) after `error`, or
    /// `None` to give up
    fn retry_delay(&self, attempt: u32, error: &ProviderError) -> Option<Duration>;
}

/// Fixed pause between batches, exponential backoff on retryable errors
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    /// Pause between successive batches
    pub inter_batch_delay: Duration,
    /// Maximum number of retries per batch
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each further attempt
    pub base_delay: Duration,
}

impl ExponentialBackoff {
    pub fn new(inter_batch_delay: Duration, max_retries: u32, base_delay: Duration) -> Self {
        Self {
            inter_batch_delay,
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        Self::new(
            Duration::from_millis(config.inter_batch_delay_ms),
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
        )
    }

    /// Retry without ever sleeping; for tests and local backends
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(Duration::ZERO, max_retries, Duration::ZERO)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::from_config(&ThrottleConfig::default())
    }
}

impl BackoffPolicy for ExponentialBackoff {
    fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    fn retry_delay(&self, attempt: u32, error: &ProviderError) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries || !error.is_retryable() {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor))
    }
}

/// Never pauses and never retries
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NoDelay;

impl BackoffPolicy for NoDelay {
    fn inter_batch_delay(&self) -> Duration {
        Duration::ZERO
    }

    fn retry_delay(&self, _attempt: u32, _error: &ProviderError) -> Option<Duration> {
        None
    }
}
