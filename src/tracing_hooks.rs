//! Tracing-based implementation of the gateway operation hooks.
//!
//! ```rust
//! use palaver::{GatewayHooks, TracingGatewayHooks};
//!
//! fn accepts_hooks(_hooks: &dyn GatewayHooks) {}
//!
//! let hooks = TracingGatewayHooks;
//! accepts_hooks(&hooks);
//! ```

use std::time::Duration;

use crate::{GatewayError, GatewayHooks, Usage};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingGatewayHooks;

impl GatewayHooks for TracingGatewayHooks {
    fn on_attempt_start(&self, operation: &str, attempt: u32) {
        tracing::debug!(event = "attempt_start", operation, attempt);
    }

    fn on_retry_scheduled(
        &self,
        operation: &str,
        attempt: u32,
        delay: Duration,
        error: &GatewayError,
    ) {
        tracing::warn!(
            event = "retry_scheduled",
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_success(&self, operation: &str, attempts: u32) {
        tracing::info!(event = "success", operation, attempts);
    }

    fn on_failure(&self, operation: &str, attempts: u32, error: &GatewayError) {
        tracing::error!(
            event = "failure",
            operation,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_usage(&self, model: &str, usage: Option<&Usage>) {
        match usage {
            Some(usage) => tracing::info!(
                event = "usage",
                model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens
            ),
            None => tracing::info!(event = "usage", model, tokens = "unreported"),
        }
    }
}
