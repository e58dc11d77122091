//! Hive Assistant Core - Headless Loan Assistant Session Controller
//!
//! This crate drives a conversation with the Hive Capital multi-agent loan
//! backend, independent of any UI. A terminal, a web page or a test harness
//! can all sit on top of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Surfaces                              │
//! │       ┌────────────────┐       ┌──────────────────┐          │
//! │       │ hive-assistant │       │ tests / headless │          │
//! │       │     (REPL)     │       │                  │          │
//! │       └───────┬────────┘       └────────┬─────────┘          │
//! │               └────────────┬────────────┘                    │
//! │          method calls (up) │ ControllerMessage (down)        │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │
//! ┌────────────────────────────┼─────────────────────────────────┐
//! │                     SessionController                        │
//! │  ┌─────────┐ ┌───────────┐ ┌────────────┐ ┌───────────────┐  │
//! │  │ Session │ │ Sanitizer │ │ Classifier │ │ TaskScheduler │  │
//! │  └─────────┘ └───────────┘ └────────────┘ └───────────────┘  │
//! │        │                                        │            │
//! │  MessageChannel ── ChatTransport      ArtifactDownloader     │
//! └──────────────────────┬──────────────────────────┬────────────┘
//!                        │  POST /chat              │ GET /download/…
//!                        ▼                          ▼
//!                     loan backend (agents: MASTER, SALES, …)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use hive_assistant_core::{
//!     ControllerConfig, HttpArtifactDownloader, HttpTransport, SessionController,
//! };
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::channel(100);
//! let transport = HttpTransport::new("http://localhost:8000", None)?;
//! let downloader = HttpArtifactDownloader::new("http://localhost:8000", "./downloads")?;
//! let mut controller = SessionController::new(transport, downloader, ControllerConfig::default(), tx);
//!
//! controller.start().await?;
//! controller.settle().await;
//!
//! controller.send("I need a personal loan").await?;
//! controller.settle().await;
//!
//! while let Ok(msg) = rx.try_recv() {
//!     // render
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`agents`]: Agent labels and how surfaces present them
//! - [`artifact`]: Downloading generated documents
//! - [`channel`]: One conversational turn against the backend
//! - [`config`]: TOML / environment / CLI configuration
//! - [`controller`]: The session state machine
//! - [`messages`]: Messages from the controller to surfaces
//! - [`sanitizer`]: Stripping backend annotations from replies
//! - [`scheduler`]: Delayed, cancellable side effects
//! - [`session`]: Session and message log
//! - [`termination`]: Detecting when the user ends the conversation
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on terminal or UI frameworks.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agents;
pub mod artifact;
pub mod channel;
pub mod config;
pub mod controller;
pub mod messages;
pub mod sanitizer;
pub mod scheduler;
pub mod session;
pub mod termination;

// Re-exports for convenience
pub use agents::{AgentLabel, AgentProfile, UnknownAgentLabel};
pub use artifact::{
    ArtifactDownloader, DownloadOutcome, HttpArtifactDownloader, LinkOpener, SystemLinkOpener,
    DEFAULT_ARTIFACT_FILENAME,
};
pub use channel::{
    ChannelReply, ChatRequest, ChatResponse, ChatTransport, HttpTransport, MessageChannel,
    TransportError, DEFAULT_APOLOGY_TEXT, DEFAULT_BASE_URL,
};
pub use controller::{
    ControllerConfig, ControllerError, ControllerEvent, SendOutcome, SessionController,
    DEFAULT_FAREWELL_TEXT, DEFAULT_GREETING, SALARY_SLIP_TEXT,
};
pub use messages::{
    ControllerMessage, ControllerState, MessageId, MessageRole, NotifyLevel, SessionId, TurnId,
};
pub use sanitizer::ContentSanitizer;
pub use scheduler::{TaskKind, TaskScheduler};
pub use session::{Message, Session, SessionPhase};
pub use termination::{KeywordClassifier, TerminationClassifier, DEFAULT_TERMINATION_KEYWORDS};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, AssistantConfig, AssistantToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
