//! Async utilities
//!
//! Backoff for GitHub listing calls and a deadline for LLM calls

use crate::error::{ErrorContext, ScopeError, ScopeResult};
use futures::future::BoxFuture;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, warn};

/// How often and how patiently a failed request is repeated
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts in total, the first one included
    pub max_attempts: usize,
    /// Pause after the first failure
    pub initial_delay_ms: u64,
    /// Upper bound for any pause, server hints included
    pub max_delay_ms: u64,
    /// Growth factor of the pause between consecutive failures
    pub backoff_multiplier: f64,
    /// Spread pauses by up to 10% either way
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Pause before attempt `failed + 1`, given `failed` failures so far and
    /// the server's own hint, if any. Jitter is not applied here.
    pub fn backoff_ms(&self, failed: usize, hint_ms: Option<u64>) -> u64 {
        let exponent = failed.saturating_sub(1).min(i32::MAX as usize) as i32;
        let scaled = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let backoff = if scaled.is_finite() {
            scaled as u64
        } else {
            u64::MAX
        };
        backoff.max(hint_ms.unwrap_or(0)).min(self.max_delay_ms)
    }

    fn with_jitter(&self, delay_ms: u64) -> u64 {
        if !self.jitter {
            return delay_ms;
        }
        let spread = (fastrand::f64() - 0.5) * 0.2;
        ((delay_ms as f64) * (1.0 + spread)) as u64
    }
}

/// Run `operation` until it succeeds, fails permanently or runs out of
/// attempts. Only [`ScopeError::is_recoverable`] errors are repeated.
pub async fn retry_async<F, T>(
    operation: F,
    config: RetryConfig,
    operation_name: &str,
) -> ScopeResult<T>
where
    F: Fn() -> BoxFuture<'static, ScopeResult<T>>,
{
    let mut failed = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if failed > 0 {
                    debug!(operation = operation_name, retries = failed, "Succeeded after retrying");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_recoverable() {
            return Err(err);
        }

        failed += 1;
        if failed >= config.max_attempts {
            error!(operation = operation_name, attempts = failed, error = %err, "Giving up");
            return Err(err);
        }

        let delay_ms = config.with_jitter(config.backoff_ms(failed, err.retry_delay_ms()));
        warn!(
            operation = operation_name,
            attempt = failed,
            delay_ms,
            error = %err,
            "Recoverable failure, retrying"
        );
        sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Fail with a `Network` error when `future` does not finish in time
pub async fn with_timeout<F, T>(future: F, timeout_ms: u64, operation_name: &str) -> ScopeResult<T>
where
    F: std::future::Future<Output = T>,
{
    timeout(Duration::from_millis(timeout_ms), future)
        .await
        .map_err(|elapsed| ScopeError::Network {
            message: format!("{} did not finish within {}ms", operation_name, timeout_ms),
            source: Some(Box::new(elapsed)),
            context: ErrorContext::new("async_utils")
                .with_operation(operation_name)
                .with_metadata("timeout_ms", &timeout_ms.to_string())
                .with_suggestion("Raise the timeout in the configuration"),
        })
}
