//! Conversation model types and the request builder.
//!
//! ```rust
//! use palaver::{ChatMessage, GatewayConfig, GatewayErrorKind, RequestBuilder, Role};
//!
//! let config = GatewayConfig::new("sk-test").with_model("gpt-4o-mini");
//! let builder = RequestBuilder::new(&config);
//!
//! let request = builder
//!     .build(vec![ChatMessage::new(Role::User, "hello")], false)
//!     .expect("request should build");
//! assert_eq!(request.model, "gpt-4o-mini");
//! assert!(!request.stream);
//!
//! let err = builder.build(Vec::new(), false).expect_err("empty conversation");
//! assert_eq!(err.kind, GatewayErrorKind::InvalidRequest);
//! ```

use crate::{GatewayConfig, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    pub(crate) fn parse(value: &str) -> Self {
        match value {
            "system" => Self::System,
            "user" => Self::User,
            _ => Self::Assistant,
        }
    }
}

/// One role-tagged message. Order within a conversation is significant and
/// preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Upstream request payload, built fresh per call and never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

impl ChatRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.messages.is_empty() {
            return Err(GatewayError::invalid_request(
                "at least one message is required",
            ));
        }

        if self.max_tokens == 0 {
            return Err(GatewayError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        Ok(())
    }
}

/// Assembles a [`ChatRequest`] from caller-supplied messages plus the
/// resolved configuration. Pure, no I/O.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a GatewayConfig,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a GatewayConfig) -> Self {
        Self { config }
    }

    pub fn build(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<ChatRequest, GatewayError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream,
        };

        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

/// Token accounting, absent as a whole when the upstream omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Complete synchronous completion result.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub id: String,
    pub object: String,
    pub created: u64,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Content of the first choice, when present.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}
