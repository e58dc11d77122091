//! HTTP Transport
//!
//! Talks to the loan backend's REST API:
//! - `POST /chat` - one conversational turn
//! - `GET /` - liveness probe

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{ChatRequest, ChatResponse, ChatTransport, TransportError};

/// Default backend address for local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP chat transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// Base address without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `base_url`.
    ///
    /// `timeout` bounds the whole exchange; `None` lets a turn run to natural
    /// completion or failure.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http_client: builder.build()?,
        })
    }

    /// Base address this transport talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat endpoint URL
    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

/// Validate a base address and strip trailing slashes
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, TransportError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).map_err(|e| TransportError::InvalidBaseUrl(format!("{trimmed}: {e}")))?;
    Ok(trimmed.to_string())
}

#[async_trait]
impl ChatTransport for HttpTransport {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        let response = self
            .http_client
            .post(self.chat_url())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status { status, body });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
