//! Typed network boundary
//!
//! The harvest engine never builds HTTP requests itself. It talks to an
//! [`ApiTransport`] that resolves an endpoint path to a JSON payload or a
//! typed [`ApiError`]. Status codes travel as an explicit field on the error
//! rather than being smuggled through display strings, with a tolerant
//! fallback parse for transports that can only report a message.

use async_trait::async_trait;
use serde_json::Value;

pub mod http;

pub use http::HttpTransport;

/// Errors produced at the network boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The upstream returned a non-success HTTP status
    #[error("HTTP status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Request never produced a response (timeout, connection reset, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// Response arrived but could not be decoded as JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// A required credential is missing or unusable
    #[error("missing credential: {0}")]
    Credential(String),
}

impl ApiError {
    /// The HTTP status code behind this failure, if one can be determined.
    ///
    /// Typed failures expose it directly. Network failures fall back to
    /// scanning the message for a trailing numeric token, which covers
    /// transports that only surface "GET /x failed: 429"-style strings.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(message) => extract_status(message),
            ApiError::Parse(_) | ApiError::Credential(_) => None,
        }
    }
}

/// Result alias for transport operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// One logical network operation: resolve an endpoint path to JSON.
///
/// Implementations own authentication, base URLs, and deadlines. The engine
/// only requires that failures expose (or can be parsed for) a status code.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Fetch `endpoint` and decode the response body as JSON.
    async fn fetch(&self, endpoint: &str) -> ApiResult<Value>;
}

/// Extract an HTTP status code embedded as a trailing numeric token.
///
/// Accepts messages of the form `"... : 503"`. Anything without a `:`
/// separator or without an all-digit tail yields `None`, which classifies
/// the failure as terminal.
pub fn extract_status(message: &str) -> Option<u16> {
    let (_, tail) = message.rsplit_once(':')?;
    let tail = tail.trim();
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}
