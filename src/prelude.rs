//! Common `palaver` imports for downstream crates.

pub use crate::{
    ChatGateway, ChatMessage, ChatRequest, ChatResponse, ChatTransport, Choice, FragmentStream,
    GatewayConfig, GatewayError, GatewayErrorKind, GatewayFuture, GatewayHooks, NoopGatewayHooks,
    RequestBuilder, RetryPolicy, Role, StreamDecoder, TracingGatewayHooks, Usage,
    FALLBACK_FRAGMENT,
};
