//! HTTP transport implementations
//!
//! Two upstream APIs are supported: the public sports API used for catalog
//! and team data, and the RapidAPI-hosted TV channel API which requires an
//! `x-rapidapi-key` header. Both share the same reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{ApiError, ApiResult, ApiTransport};

/// Default per-request deadline. Requests that exceed it surface as a
/// terminal network failure without a status code.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SPORTS_API_BASE: &str = "https://api.sofascore.com/api/v1";
const CHANNEL_API_BASE: &str = "https://sportapi7.p.rapidapi.com";
const CHANNEL_API_HOST: &str = "sportapi7.p.rapidapi.com";

/// Environment variable holding the RapidAPI credential.
pub const RAPIDAPI_KEY_VAR: &str = "RAPIDAPI_KEY";

/// reqwest-backed [`ApiTransport`] with a base URL and default headers.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Transport for the public sports API (catalog, seasons, teams).
    pub fn sports_api() -> ApiResult<Self> {
        Self::with_base(SPORTS_API_BASE, HeaderMap::new())
    }

    /// Transport for the TV channel API.
    ///
    /// Reads `RAPIDAPI_KEY` from the environment and fails fast when it is
    /// absent, before any shard is processed.
    pub fn channel_api() -> ApiResult<Self> {
        let key = std::env::var(RAPIDAPI_KEY_VAR)
            .map_err(|_| ApiError::Credential(format!("{RAPIDAPI_KEY_VAR} is not set")))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-rapidapi-key",
            HeaderValue::from_str(&key)
                .map_err(|_| ApiError::Credential(format!("{RAPIDAPI_KEY_VAR} is not valid header text")))?,
        );
        headers.insert("x-rapidapi-host", HeaderValue::from_static(CHANNEL_API_HOST));
        Self::with_base(CHANNEL_API_BASE, headers)
    }

    /// Transport against an arbitrary base URL, used by tests and demos.
    pub fn with_base(base_url: impl Into<String>, headers: HeaderMap) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Base URL this transport resolves endpoints against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn fetch(&self, endpoint: &str) -> ApiResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "issuing GET request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}
