//! Upstream HTTP payload serde models and the synchronous response decoder.

use serde::{Deserialize, Serialize};

use crate::{ChatMessage, ChatRequest, ChatResponse, Choice, GatewayError, Role, Usage};

#[derive(Debug, Serialize)]
pub(crate) struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiMessage {
    pub role: &'static str,
    pub content: String,
}

impl From<ChatRequest> for ApiRequest {
    fn from(value: ChatRequest) -> Self {
        Self {
            model: value.model,
            messages: value
                .messages
                .into_iter()
                .map(|message| ApiMessage {
                    role: message.role.as_str(),
                    content: message.content,
                })
                .collect(),
            temperature: value.temperature,
            max_tokens: value.max_tokens,
            stream: value.stream,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ApiChoice>,
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChoice {
    pub index: Option<u32>,
    pub message: ApiResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponseMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Parses a complete JSON body into a [`ChatResponse`].
///
/// The body was already fully received, so any shape mismatch is terminal
/// and never retried.
pub(crate) fn decode_response(body: &str) -> Result<ChatResponse, GatewayError> {
    let parsed: ApiResponse = serde_json::from_str(body)
        .map_err(|err| GatewayError::parse(format!("malformed completion body: {err}")))?;

    let choices = parsed
        .choices
        .into_iter()
        .enumerate()
        .map(|(position, choice)| Choice {
            index: choice.index.unwrap_or(position as u32),
            message: ChatMessage {
                role: choice
                    .message
                    .role
                    .as_deref()
                    .map(Role::parse)
                    .unwrap_or(Role::Assistant),
                content: choice.message.content.unwrap_or_default(),
            },
            finish_reason: choice.finish_reason,
        })
        .collect();

    Ok(ChatResponse {
        id: parsed.id,
        object: parsed.object,
        created: parsed.created,
        model: parsed.model,
        choices,
        usage: parsed.usage.map(|usage| Usage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStreamChunk {
    pub choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStreamChoice {
    pub delta: ApiStreamDelta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiStreamDelta {
    pub content: Option<String>,
}

/// Extracts `choices[0].delta.content` from one streamed JSON fragment.
/// Returns `None` when the fragment is malformed or carries no content.
pub(crate) fn decode_stream_data(payload: &str) -> Option<String> {
    let parsed: ApiStreamChunk = serde_json::from_str(payload).ok()?;
    parsed.choices.into_iter().next()?.delta.content
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Mines `{"error":{"message":...}}` out of a non-2xx body.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}
