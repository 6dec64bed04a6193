//! Retry/backoff policy and the operation hook contract.
//!
//! Retry is applied only to the synchronous completion path. The decorator
//! takes both the operation and the sleep as injected closures, so tests
//! observe backoff without waiting on real timers.

use std::future::Future;
use std::time::Duration;

use crate::{GatewayError, Usage};

/// Bounded, selective retry with exponential backoff.
///
/// A persistently failing retryable operation is attempted exactly
/// `max_retries + 1` times. Non-retryable errors are surfaced immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// `retries_used` counts completed retries, zero after the first attempt.
    pub fn should_retry(&self, retries_used: u32, error: &GatewayError) -> bool {
        error.retryable && retries_used < self.max_retries
    }

    /// `base_delay * 2^retry_index`, capped at `max_delay`.
    pub fn backoff_for_retry(&self, retry_index: u32) -> Duration {
        let unbounded = self.base_delay.as_secs_f64() * 2f64.powi(retry_index as i32);
        Duration::from_secs_f64(unbounded.min(self.max_delay.as_secs_f64()))
    }
}

/// Lifecycle hooks for one retry-wrapped gateway operation.
pub trait GatewayHooks: Send + Sync {
    fn on_attempt_start(&self, _operation: &str, _attempt: u32) {}

    fn on_retry_scheduled(
        &self,
        _operation: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &GatewayError,
    ) {
    }

    fn on_success(&self, _operation: &str, _attempts: u32) {}

    fn on_failure(&self, _operation: &str, _attempts: u32, _error: &GatewayError) {}

    /// One usage report per successful synchronous completion.
    fn on_usage(&self, _model: &str, _usage: Option<&Usage>) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGatewayHooks;

impl GatewayHooks for NoopGatewayHooks {}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    operation: &str,
    policy: &RetryPolicy,
    hooks: &dyn GatewayHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, GatewayError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, GatewayError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(operation, attempt);

        match execute(attempt).await {
            Ok(value) => {
                hooks.on_success(operation, attempt);
                return Ok(value);
            }
            Err(error) => {
                let retries_used = attempt - 1;
                if policy.should_retry(retries_used, &error) {
                    let delay = policy.backoff_for_retry(retries_used);
                    hooks.on_retry_scheduled(operation, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                hooks.on_failure(operation, attempt, &error);
                return Err(error);
            }
        }
    }
}
