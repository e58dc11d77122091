//! Controller Messages
//!
//! Messages sent from the [`SessionController`](crate::SessionController) to
//! whatever surface is rendering the conversation. Surfaces hold no
//! conversation state of their own: they draw what these messages tell them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::agents::AgentLabel;
use crate::session::Message;

/// Messages from the controller to a surface
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum ControllerMessage {
    // ============================================
    // Conversation
    // ============================================
    /// A message was appended to the visible log
    Message(Message),

    /// The backend reported a different active agent
    AgentChanged {
        /// The agent now answering
        agent: AgentLabel,
    },

    // ============================================
    // Session lifecycle
    // ============================================
    /// Controller state change (drives the typing indicator and input lock)
    State {
        /// The new state
        state: ControllerState,
    },

    /// A session was started or replaced
    SessionInfo {
        /// Identifier of the current session
        session_id: SessionId,
        /// True when this session superseded a previous one
        reset: bool,
    },

    /// The user ended the conversation; input should be closed
    SessionComplete {
        /// Session that completed
        session_id: SessionId,
    },

    // ============================================
    // Artifacts
    // ============================================
    /// A generated document was saved locally
    ArtifactSaved {
        /// Where the file was written
        path: PathBuf,
    },

    /// Download failed; the user has to fetch the document manually
    ArtifactFallback {
        /// Resolved address of the document
        url: String,
        /// Whether a system opener was launched for the address
        opened: bool,
    },

    // ============================================
    // System
    // ============================================
    /// Notification that is not part of the conversation
    Notify {
        /// Notification level
        level: NotifyLevel,
        /// Message content
        message: String,
    },
}

/// Message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session identifier
///
/// Opaque to the client; the backend keys its loan application state on it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Mint a new random session ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one request/response exchange with the backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl TurnId {
    /// Generate a new unique turn ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "turn_{}", self.0)
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// Backend agent (or a locally synthesized agent reply)
    Agent,
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Warning
    Warning,
}

/// Controller operational states
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerState {
    /// Waiting for user input
    Ready,
    /// A turn is in flight
    Thinking,
    /// Session has ended, input closed
    Complete,
}

impl ControllerState {
    /// Human-readable description
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Thinking => "Thinking...",
            Self::Complete => "Session Ended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_unique() {
        let id1 = MessageId::new();
        let id2 = MessageId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_session_id_unique() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn test_turn_ids_increase() {
        let a = TurnId::new();
        let b = TurnId::new();
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&MessageRole::Agent).unwrap(), "\"agent\"");
    }
}
