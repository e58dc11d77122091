//! Session Management
//!
//! A session is one continuous conversation with the loan backend: an opaque
//! identifier, the ordered message log, the agent currently answering and
//! whether the user has ended it.
//!
//! The log is append-only. Sessions are never cleared in place; a reset
//! builds a fresh [`Session`] with a new identifier.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::agents::AgentLabel;
use crate::messages::{MessageId, MessageRole, SessionId};

/// A message in the conversation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content (already sanitized for agent messages)
    pub content: String,
    /// Answering agent, only set on agent messages
    pub agent: Option<AgentLabel>,
    /// When the message was created
    pub timestamp: DateTime<Local>,
    /// Generated document available for download, only on agent messages
    pub artifact: Option<String>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            agent: None,
            timestamp: Local::now(),
            artifact: None,
        }
    }

    /// Create an agent message
    pub fn agent(agent: AgentLabel, content: impl Into<String>, artifact: Option<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: MessageRole::Agent,
            content: content.into(),
            agent: Some(agent),
            timestamp: Local::now(),
            artifact,
        }
    }

    /// `HH:MM` label for display
    #[must_use]
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Lifecycle phase of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, no turn issued yet
    New,
    /// Greeting issued; conversation in progress
    Active,
    /// User ended the conversation (terminal)
    Complete,
}

/// A conversation session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    messages: Vec<Message>,
    active_agent: AgentLabel,
    phase: SessionPhase,
}

impl Session {
    /// Create a new session with a freshly minted ID
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            messages: Vec::new(),
            active_agent: AgentLabel::default(),
            phase: SessionPhase::New,
        }
    }

    /// Session identifier
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Ordered message log
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Agent currently answering
    pub fn active_agent(&self) -> AgentLabel {
        self.active_agent
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the user ended this session
    pub fn is_complete(&self) -> bool {
        self.phase == SessionPhase::Complete
    }

    /// Append a message and return a reference to it in the log
    pub fn push(&mut self, message: Message) -> &Message {
        let index = self.messages.len();
        self.messages.push(message);
        &self.messages[index]
    }

    /// Record the agent reported by the backend.
    /// Returns true when the label actually changed.
    pub fn set_active_agent(&mut self, agent: AgentLabel) -> bool {
        let changed = self.active_agent != agent;
        self.active_agent = agent;
        changed
    }

    /// Move `New → Active`; no-op in any other phase
    pub fn activate(&mut self) {
        if self.phase == SessionPhase::New {
            self.phase = SessionPhase::Active;
        }
    }

    /// Enter the terminal phase
    pub fn complete(&mut self) {
        self.phase = SessionPhase::Complete;
    }

    /// Get message by ID
    pub fn get_message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Most recent message carrying an artifact
    pub fn latest_artifact(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.artifact.is_some())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
