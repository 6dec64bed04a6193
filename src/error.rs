//! Gateway error kinds and error value helpers.
//!
//! Errors are a closed set of tagged variants, each carrying an explicit
//! `retryable` capability so the retry layer dispatches on data instead of
//! on error types.
//!
//! ```rust
//! use palaver::GatewayError;
//!
//! let invalid = GatewayError::invalid_request("conversation is empty");
//! assert!(!invalid.retryable);
//!
//! let overloaded = GatewayError::upstream(503, "upstream overloaded");
//! assert!(overloaded.retryable);
//!
//! let rejected = GatewayError::upstream(400, "bad payload");
//! assert!(!rejected.retryable);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Bad caller input. Fails fast, no network call is made.
    InvalidRequest,
    /// Non-2xx status from the upstream endpoint.
    Upstream { status: u16 },
    /// Connection-level failure before or while talking to the upstream.
    Connection,
    /// The overall call deadline elapsed.
    Timeout,
    /// A fully received body did not conform to the expected shape.
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::InvalidRequest, message, false)
    }

    /// 5xx responses are retryable, 4xx responses are not.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::new(
            GatewayErrorKind::Upstream { status },
            message,
            status >= 500,
        )
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Connection, message, true)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message, true)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Parse, message, false)
    }

    /// Upstream HTTP status, when this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            GatewayErrorKind::Upstream { status } => Some(status),
            _ => None,
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for GatewayError {}
