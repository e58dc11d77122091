//! Chat Transport Traits
//!
//! Wire-level contract with the loan backend. A transport performs one
//! `/chat` exchange and reports failures as [`TransportError`]; recovering
//! from them is the job of [`MessageChannel`](super::MessageChannel).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::messages::SessionId;

/// Snapshot key carrying the sanction letter address
pub const SANCTION_LETTER_KEY: &str = "sanction_letter_url";

/// Body of a conversational turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Session the turn belongs to
    pub session_id: String,
    /// Raw user text
    pub user_message: String,
}

impl ChatRequest {
    /// Create a request for a session
    pub fn new(session_id: &SessionId, user_message: impl Into<String>) -> Self {
        Self {
            session_id: session_id.0.clone(),
            user_message: user_message.into(),
        }
    }
}

/// Backend reply to a conversational turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Echo of the session ID
    pub session_id: String,
    /// Agent that produced the reply (upper-case pipeline stage)
    pub agent_name: String,
    /// Raw reply text, may contain routing annotations
    pub message: String,
    /// Backend's view of the loan application after this turn
    #[serde(default)]
    pub state_snapshot: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ChatResponse {
    /// Address of a generated document, when the turn produced one
    #[must_use]
    pub fn artifact_ref(&self) -> Option<&str> {
        self.state_snapshot
            .as_ref()?
            .get(SANCTION_LETTER_KEY)?
            .as_str()
            .filter(|url| !url.trim().is_empty())
    }
}

/// Errors from a single backend exchange
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout or body transfer failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Reply body was not a valid chat response
    #[error("could not decode backend response: {0}")]
    Decode(String),

    /// Configured base address is unusable
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Chat transport trait
///
/// Implement this to reach the backend over something other than HTTP, or to
/// script replies in tests.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Check whether the backend is reachable
    async fn health_check(&self) -> bool;

    /// Perform one request/response exchange
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}
