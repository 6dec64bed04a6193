//! Resilient chat-completion gateway for OpenAI-compatible endpoints.
//!
//! Turns an ordered, role-tagged conversation into either one synchronous
//! completion ([`ChatGateway::chat`]) or an incrementally delivered sequence
//! of text fragments ([`ChatGateway::chat_stream`]). The synchronous path is
//! wrapped in bounded, selective retry with exponential backoff; the
//! streaming path decodes the line-oriented event body with a carry-over
//! buffer so arbitrary chunk boundaries never corrupt fragments, and
//! degrades to a single fallback fragment instead of surfacing errors.
//!
//! ```rust
//! use std::sync::Arc;
//! use palaver::{ChatGateway, GatewayConfig};
//!
//! let config = Arc::new(
//!     GatewayConfig::new("sk-test")
//!         .with_model("gpt-4o-mini")
//!         .with_max_retries(2),
//! );
//!
//! let gateway = ChatGateway::new(config).expect("gateway should build");
//! let _ = gateway; // ready for chat / chat_stream / test_connection
//! ```

mod config;
mod error;
mod gateway;
mod model;
mod resilience;
mod sse;
mod tracing_hooks;
mod transport;
mod wire;

pub mod prelude;

pub use config::{GatewayConfig, SecretString};
pub use error::{GatewayError, GatewayErrorKind};
pub use gateway::{ChatGateway, FragmentStream, FALLBACK_FRAGMENT};
pub use model::{ChatMessage, ChatRequest, ChatResponse, Choice, RequestBuilder, Role, Usage};
pub use resilience::{execute_with_retry, GatewayHooks, NoopGatewayHooks, RetryPolicy};
pub use sse::StreamDecoder;
pub use tracing_hooks::TracingGatewayHooks;
pub use transport::{ByteChunkStream, ChatTransport, GatewayFuture, HttpChatTransport};
