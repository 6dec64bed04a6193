//! Gateway orchestration: synchronous completion, streamed completion, and
//! the connectivity probe.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::stream;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::resilience::execute_with_retry;
use crate::transport::{ChatTransport, HttpChatTransport};
use crate::wire;
use crate::{
    ChatMessage, ChatResponse, GatewayConfig, GatewayError, GatewayHooks, RequestBuilder,
    RetryPolicy, Role, StreamDecoder, TracingGatewayHooks,
};

/// Fixed user-facing message emitted when the streaming path fails.
///
/// The streaming surface never raises to its consumer; any unrecoverable
/// failure downgrades to this single fragment followed by end of stream.
pub const FALLBACK_FRAGMENT: &str =
    "The assistant is temporarily unavailable. Please try again in a moment.";

/// Lazy, finite, non-restartable sequence of text fragments.
pub type FragmentStream<'a> = Pin<Box<dyn Stream<Item = String> + Send + 'a>>;

/// Orchestrates request building, retry-wrapped transport, and decoding.
///
/// Holds no request-scoped state; the only shared resource is the pooled
/// transport, safe under concurrent use.
pub struct ChatGateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn ChatTransport>,
    policy: RetryPolicy,
    hooks: Arc<dyn GatewayHooks>,
}

impl ChatGateway {
    /// Wires the HTTP transport and tracing hooks from a validated config.
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self, GatewayError> {
        config.validate()?;
        let transport = Arc::new(HttpChatTransport::new(Arc::clone(&config))?);
        Ok(Self::with_transport(config, transport))
    }

    /// Injection point for alternate transports, used heavily by tests.
    pub fn with_transport(config: Arc<GatewayConfig>, transport: Arc<dyn ChatTransport>) -> Self {
        let policy = RetryPolicy::new(config.max_retries, config.retry_delay);
        Self {
            config,
            transport,
            policy,
            hooks: Arc::new(TracingGatewayHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn GatewayHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Synchronous completion: one decoded response or the terminal error
    /// left after retry exhaustion.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, GatewayError> {
        let request = RequestBuilder::new(&self.config).build(messages, false)?;

        let body = execute_with_retry(
            "chat",
            &self.policy,
            self.hooks.as_ref(),
            |_attempt| self.transport.send(request.clone()),
            |delay| tokio::time::sleep(delay),
        )
        .await?;

        let response = wire::decode_response(&body).inspect_err(|error| {
            tracing::error!(
                endpoint = %self.config.base_url,
                error = %error,
                "completion body failed to decode"
            );
        })?;

        self.hooks.on_usage(&response.model, response.usage.as_ref());
        Ok(response)
    }

    /// Streamed completion. Fragments arrive in source order; the stream is
    /// pull-based, so abandoning it drops the response body and releases
    /// the pooled connection. Failures yield [`FALLBACK_FRAGMENT`] once and
    /// end the stream; no error ever reaches the consumer.
    pub fn chat_stream(&self, messages: Vec<ChatMessage>) -> FragmentStream<'_> {
        Box::pin(stream! {
            if !self.config.enable_stream {
                // Streaming disabled upstream: run the synchronous path and
                // emit the whole completion as a single fragment.
                match self.chat(messages).await {
                    Ok(response) => {
                        if let Some(content) = response.first_content() {
                            if !content.is_empty() {
                                yield content.to_string();
                            }
                        }
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "stream degraded to fallback");
                        yield FALLBACK_FRAGMENT.to_string();
                    }
                }
                return;
            }

            let request = match RequestBuilder::new(&self.config).build(messages, true) {
                Ok(request) => request,
                Err(error) => {
                    tracing::warn!(error = %error, "stream degraded to fallback");
                    yield FALLBACK_FRAGMENT.to_string();
                    return;
                }
            };

            // Single attempt: the streaming path does not retry.
            let mut chunks = match self.transport.send_stream(request).await {
                Ok(chunks) => chunks,
                Err(error) => {
                    tracing::warn!(
                        endpoint = %self.config.base_url,
                        error = %error,
                        "stream degraded to fallback"
                    );
                    yield FALLBACK_FRAGMENT.to_string();
                    return;
                }
            };

            let mut decoder = StreamDecoder::new();

            while let Some(item) = chunks.next().await {
                match item {
                    Ok(bytes) => {
                        for fragment in decoder.push_chunk(&bytes) {
                            yield fragment;
                        }
                        if decoder.is_done() {
                            break;
                        }
                    }
                    Err(error) => {
                        tracing::warn!(error = %error, "stream degraded to fallback");
                        yield FALLBACK_FRAGMENT.to_string();
                        return;
                    }
                }
            }
        })
    }

    /// Liveness probe: a minimal single-message completion. Never raises;
    /// any error maps to `false`.
    pub async fn test_connection(&self) -> bool {
        let probe = vec![ChatMessage::new(Role::User, "ping")];
        match self.chat(probe).await {
            Ok(response) => !response.choices.is_empty(),
            Err(error) => {
                tracing::debug!(error = %error, "connectivity probe failed");
                false
            }
        }
    }
}
