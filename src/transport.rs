//! Transport trait and the reqwest-based HTTP implementation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::wire::{self, ApiRequest};
use crate::{ChatRequest, GatewayConfig, GatewayError};

pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw byte chunks of one streamed response body, in arrival order.
pub type ByteChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<Vec<u8>, GatewayError>> + Send + 'a>>;

const CLIENT_HEADER: &str = "X-Client";

fn client_identifier() -> String {
    format!("palaver/{}", env!("CARGO_PKG_VERSION"))
}

/// Network seam of the gateway. `send` returns the complete raw body of a
/// synchronous call; `send_stream` returns the incremental body of a
/// streamed call. Implementations must be safe for concurrent use.
pub trait ChatTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: ChatRequest) -> GatewayFuture<'a, Result<String, GatewayError>>;

    fn send_stream<'a>(
        &'a self,
        request: ChatRequest,
    ) -> GatewayFuture<'a, Result<ByteChunkStream<'a>, GatewayError>>;
}

/// HTTP transport over one shared, connection-pooled `reqwest::Client`.
///
/// The client is built once with `Config.timeout` as the overall deadline,
/// measured from call start through full body or stream consumption.
#[derive(Debug, Clone)]
pub struct HttpChatTransport {
    client: Client,
    config: Arc<GatewayConfig>,
}

impl HttpChatTransport {
    pub fn new(config: Arc<GatewayConfig>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GatewayError::connection(format!("failed to build client: {err}")))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn dispatch(&self, request: ChatRequest) -> Result<Response, GatewayError> {
        let api_request = ApiRequest::from(request);
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.expose())
            .header(CLIENT_HEADER, client_identifier())
            .json(&api_request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(upstream_error(response).await);
        }

        Ok(response)
    }
}

impl ChatTransport for HttpChatTransport {
    fn send<'a>(
        &'a self,
        request: ChatRequest,
    ) -> GatewayFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let response = self.dispatch(request).await?;
            response.text().await.map_err(map_reqwest_error)
        })
    }

    fn send_stream<'a>(
        &'a self,
        mut request: ChatRequest,
    ) -> GatewayFuture<'a, Result<ByteChunkStream<'a>, GatewayError>> {
        Box::pin(async move {
            request.stream = true;
            let response = self.dispatch(request).await?;

            let chunks = response
                .bytes_stream()
                .map(|item| item.map(|bytes| bytes.to_vec()).map_err(map_reqwest_error));

            Ok(Box::pin(chunks) as ByteChunkStream<'a>)
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::timeout(err.to_string())
    } else {
        GatewayError::connection(err.to_string())
    }
}

async fn upstream_error(response: Response) -> GatewayError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = wire::extract_error_message(&body)
        .unwrap_or_else(|| format!("upstream request failed with status {status}: {body}"));

    GatewayError::upstream(status, message)
}
