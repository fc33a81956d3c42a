use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::error::FabricaError;

/// How a failed attempt should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Retryable,
    Fatal,
}

/// Classifier used by generation and translation
pub fn classify(error: &FabricaError) -> Classification {
    if error.is_retryable() {
        Classification::Retryable
    } else {
        Classification::Fatal
    }
}

#[derive(Error, Debug)]
pub enum RetryError {
    #[error("{label} failed after {attempts} attempts: {last_error}")]
    Exhausted {
        label: String,
        attempts: u32,
        last_error: FabricaError,
    },

    #[error(transparent)]
    Fatal(FabricaError),
}

/// Bounded attempts with linear backoff (`attempt * base_delay`), no jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay slept after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Run `operation` until it succeeds, fails fatally, or runs out of attempts.
///
/// `operation` receives the 1-based attempt number. Retryable failures sleep
/// `policy.delay_after(attempt)` before the next attempt; the last failure is
/// returned as [`RetryError::Exhausted`] without sleeping.
pub async fn retry_with_backoff<T, Op, Fut, C>(
    policy: &RetryPolicy,
    label: &str,
    classifier: C,
    mut operation: Op,
) -> std::result::Result<T, RetryError>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
    C: Fn(&FabricaError) -> Classification,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let error = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if classifier(&error) == Classification::Fatal {
            return Err(RetryError::Fatal(error));
        }

        if attempt >= max_attempts {
            return Err(RetryError::Exhausted {
                label: label.to_string(),
                attempts: attempt,
                last_error: error,
            });
        }

        let delay = policy.delay_after(attempt);
        debug!("{} attempt {}/{} failed, backing off {:?}: {}", label, attempt, max_attempts, delay, error);
        tokio::time::sleep(delay).await;
    }
}
