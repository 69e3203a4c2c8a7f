//! Retry utilities with exponential backoff

use std::future::Future;
use std::time::Duration;

use crate::error::LspError;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// Attempts taken from the runtime configuration
    pub fn from_runtime() -> Self {
        Self {
            max_attempts: crate::config::retry_attempts(),
            ..Default::default()
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_factor.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

/// Execute an async operation with retry and exponential backoff
pub async fn with_retry<F, T, Fut>(config: &RetryConfig, mut op: F) -> Result<T, LspError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LspError>>,
{
    let attempts = config.max_attempts.max(1);

    for attempt in 1..attempts {
        match op().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_recoverable() => {
                let delay = config.delay_for_attempt(attempt);
                tracing::warn!(
                    "Operation failed (attempt {}/{}), retrying after {:?}: {}",
                    attempt,
                    attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    op().await
}
