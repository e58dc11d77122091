//! Message Channel
//!
//! One conversational turn against the backend. [`MessageChannel`] wraps a
//! [`ChatTransport`] and never fails: transport or server errors resolve to a
//! fixed apology from the master agent, so the session state machine has no
//! error branch for a turn.
//!
//! # Usage
//!
//! ```ignore
//! use hive_assistant_core::channel::{HttpTransport, MessageChannel};
//!
//! let transport = HttpTransport::new("http://localhost:8000", None)?;
//! let channel = MessageChannel::new(transport, APOLOGY.to_string());
//! let reply = channel.request(&session_id, "Hi").await;
//! ```

mod http;
mod traits;

use std::sync::Arc;

pub use http::{HttpTransport, DEFAULT_BASE_URL};
pub(crate) use http::normalize_base_url;
pub use traits::{ChatRequest, ChatResponse, ChatTransport, TransportError, SANCTION_LETTER_KEY};

use crate::agents::AgentLabel;
use crate::messages::SessionId;

/// Text shown when a turn could not reach the backend
pub const DEFAULT_APOLOGY_TEXT: &str = "I'm sorry, I encountered an error. Please try again.";

/// Outcome of one turn, as the controller sees it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelReply {
    /// Agent that answered
    pub agent: AgentLabel,
    /// Raw reply text (not yet sanitized)
    pub text: String,
    /// Generated document address, if any
    pub artifact_ref: Option<String>,
    /// True when this reply was synthesized after a failure
    pub recovered: bool,
}

impl ChannelReply {
    fn from_response(response: ChatResponse) -> Self {
        let artifact_ref = response.artifact_ref().map(str::to_string);
        Self {
            agent: AgentLabel::from_wire(&response.agent_name),
            text: response.message,
            artifact_ref,
            recovered: false,
        }
    }

    fn apology(text: &str) -> Self {
        Self {
            agent: AgentLabel::Master,
            text: text.to_string(),
            artifact_ref: None,
            recovered: true,
        }
    }
}

/// Infallible request/response exchange for one turn
pub struct MessageChannel<T: ChatTransport> {
    transport: Arc<T>,
    apology_text: String,
}

impl<T: ChatTransport> Clone for MessageChannel<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            apology_text: self.apology_text.clone(),
        }
    }
}

impl<T: ChatTransport> MessageChannel<T> {
    /// Wrap a transport
    pub fn new(transport: T, apology_text: impl Into<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            apology_text: apology_text.into(),
        }
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `text` for `session_id` and return the backend's reply, or the
    /// apology reply if the exchange failed
    pub async fn request(&self, session_id: &SessionId, text: &str) -> ChannelReply {
        let request = ChatRequest::new(session_id, text);
        match self.transport.exchange(&request).await {
            Ok(response) => {
                if response.session_id != session_id.0 {
                    tracing::debug!(
                        sent = %session_id,
                        echoed = %response.session_id,
                        "Backend echoed a different session id"
                    );
                }
                ChannelReply::from_response(response)
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    transport = self.transport.name(),
                    error = %e,
                    "Chat exchange failed, replying with apology"
                );
                ChannelReply::apology(&self.apology_text)
            }
        }
    }
}
