//! Session Controller - The Conversation State Machine
//!
//! The controller owns the current [`Session`] and is the only thing that
//! mutates it. It talks to:
//! - the loan backend, through a [`MessageChannel`]
//! - the surface, through `ControllerMessage`s on an mpsc channel
//! - the [`ArtifactDownloader`], for generated documents
//!
//! # Turns
//!
//! A turn is one request/response exchange. At most one turn is in flight.
//! The exchange runs on a spawned task and reports back over an internal
//! channel; the controller applies the result when it is polled
//! ([`poll`](SessionController::poll), [`next_update`](SessionController::next_update)
//! or [`settle`](SessionController::settle)). Event loops that race the
//! controller against other sources receive with
//! [`next_event`](SessionController::next_event) and apply afterwards.
//!
//! Every turn is tagged with the session it was issued for. A result that
//! arrives after a reset belongs to a session that no longer exists and is
//! dropped, so it can neither append to the new log nor clear the new
//! session's in-flight marker.
//!
//! # Lifecycle
//!
//! `New → Active` when the greeting turn is issued, `Active → Complete` when
//! the user ends the conversation. [`reset`](SessionController::reset) always
//! starts over with a fresh session.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::agents::AgentLabel;
use crate::artifact::{ArtifactDownloader, DownloadOutcome, DEFAULT_ARTIFACT_FILENAME};
use crate::channel::{ChannelReply, ChatTransport, MessageChannel, DEFAULT_APOLOGY_TEXT};
use crate::messages::{
    ControllerMessage, ControllerState, MessageId, NotifyLevel, SessionId, TurnId,
};
use crate::sanitizer::ContentSanitizer;
use crate::scheduler::{TaskKind, TaskScheduler};
use crate::session::{Message, Session, SessionPhase};
use crate::termination::{KeywordClassifier, TerminationClassifier};

/// Hidden text that opens every session
pub const DEFAULT_GREETING: &str = "Hi";

/// Local reply to a termination request
pub const DEFAULT_FAREWELL_TEXT: &str = "Thank you for using Hive Capital! If you need any further assistance, feel free to start a new conversation. Have a great day! 🙌";

/// Text sent on behalf of the user by the upload shortcut
pub const SALARY_SLIP_TEXT: &str = "I am uploading my Salary Slip [Simulated Attachment]";

/// Controller configuration
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    /// Greeting sent (but never shown) when a session starts
    pub greeting: String,
    /// Reply appended when the user ends the session
    pub farewell_text: String,
    /// Reply appended when a turn fails
    pub apology_text: String,
    /// Delay between the farewell and the completion flag
    pub completion_delay: Duration,
    /// Delay before an automatic artifact download
    pub download_delay: Duration,
    /// File name downloaded documents are saved under
    pub artifact_filename: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            farewell_text: DEFAULT_FAREWELL_TEXT.to_string(),
            apology_text: DEFAULT_APOLOGY_TEXT.to_string(),
            completion_delay: Duration::from_millis(1000),
            download_delay: Duration::from_millis(500),
            artifact_filename: DEFAULT_ARTIFACT_FILENAME.to_string(),
        }
    }
}

/// Errors returned by controller operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// `start` was called twice
    #[error("controller already started")]
    AlreadyStarted,

    /// A turn is still waiting for the backend
    #[error("a turn is already in flight")]
    TurnInFlight,

    /// The user ended this session; reset to continue
    #[error("session is complete")]
    SessionComplete,

    /// The upload shortcut is only offered during underwriting
    #[error("salary slip upload not expected while {active} is active")]
    UploadNotExpected {
        /// Agent that was active
        active: AgentLabel,
    },

    /// No message with that id in the current session
    #[error("unknown message {0}")]
    UnknownMessage(MessageId),

    /// The message has no document attached
    #[error("message {0} has no artifact")]
    NoArtifact(MessageId),
}

/// What `send` did with the input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// The user ended the session; answered locally
    Farewell,
    /// A turn was issued to the backend
    Dispatched(TurnId),
}

/// Tag of the turn currently awaiting the backend
#[derive(Clone, Debug, PartialEq, Eq)]
struct PendingTurn {
    session_id: SessionId,
    turn_id: TurnId,
}

/// Results reported back by spawned work
#[derive(Debug)]
enum Internal {
    TurnSettled {
        session_id: SessionId,
        turn_id: TurnId,
        reply: ChannelReply,
    },
    CompletionDue {
        session_id: SessionId,
    },
    DownloadFinished {
        session_id: SessionId,
        outcome: DownloadOutcome,
    },
}

/// A result of spawned work, waiting to be applied to the session
#[derive(Debug)]
pub struct ControllerEvent(Internal);

/// The session controller - headless conversation core
pub struct SessionController<T: ChatTransport, D: ArtifactDownloader> {
    /// Configuration
    config: ControllerConfig,
    /// Backend exchange
    channel: MessageChannel<T>,
    /// Document downloader
    downloader: Arc<D>,
    /// Decides when the user is ending the conversation
    classifier: Box<dyn TerminationClassifier>,
    /// Strips backend annotations from replies
    sanitizer: ContentSanitizer,
    /// Current session
    session: Session,
    /// Whether `start` has run
    started: bool,
    /// Turn awaiting the backend
    in_flight: Option<PendingTurn>,
    /// Current operational state
    state: ControllerState,
    /// Delayed side effects
    scheduler: TaskScheduler,
    /// Spawned work reports here
    internal_tx: mpsc::UnboundedSender<Internal>,
    internal_rx: mpsc::UnboundedReceiver<Internal>,
    /// Channel to the surface
    tx: mpsc::Sender<ControllerMessage>,
}

impl<T, D> SessionController<T, D>
where
    T: ChatTransport + 'static,
    D: ArtifactDownloader + 'static,
{
    /// Create a controller using the default keyword classifier
    pub fn new(
        transport: T,
        downloader: D,
        config: ControllerConfig,
        tx: mpsc::Sender<ControllerMessage>,
    ) -> Self {
        let channel = MessageChannel::new(transport, config.apology_text.clone());
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();

        Self {
            config,
            channel,
            downloader: Arc::new(downloader),
            classifier: Box::new(KeywordClassifier::default()),
            sanitizer: ContentSanitizer::new(),
            session: Session::new(),
            started: false,
            in_flight: None,
            state: ControllerState::Ready,
            scheduler: TaskScheduler::new(),
            internal_tx,
            internal_rx,
            tx,
        }
    }

    /// Replace the termination classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl TerminationClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    // ============================================
    // Accessors
    // ============================================

    /// Current session identifier
    pub fn session_id(&self) -> &SessionId {
        self.session.id()
    }

    /// Visible message log
    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    /// Agent currently answering
    pub fn active_agent(&self) -> AgentLabel {
        self.session.active_agent()
    }

    /// Whether the user ended the session
    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    /// Whether a turn is awaiting the backend
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Session lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Current operational state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Header text for surfaces
    pub fn status_line(&self) -> &'static str {
        if self.session.is_complete() {
            ControllerState::Complete.description()
        } else {
            self.session.active_agent().profile().display_name
        }
    }

    /// Most recent message carrying a document
    pub fn latest_artifact(&self) -> Option<&Message> {
        self.session.latest_artifact()
    }

    /// The backend transport
    pub fn transport(&self) -> &T {
        self.channel.transport()
    }

    // ============================================
    // Operations
    // ============================================

    /// Start the controller and issue the greeting turn
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        if self.started {
            return Err(ControllerError::AlreadyStarted);
        }
        self.started = true;

        let healthy = self.channel.transport().health_check().await;

        self.emit(ControllerMessage::SessionInfo {
            session_id: self.session.id().clone(),
            reset: false,
        })
        .await;

        if healthy {
            let name = self.channel.transport().name().to_string();
            self.notify(NotifyLevel::Info, &format!("Connected to {name}"))
                .await;
        } else {
            self.notify(
                NotifyLevel::Warning,
                "Backend not reachable - the first reply may be an error",
            )
            .await;
        }

        tracing::info!(session_id = %self.session.id(), "Session started");
        self.greet().await;
        Ok(())
    }

    /// Handle user input
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, ControllerError> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.session.is_complete() {
            return Err(ControllerError::SessionComplete);
        }
        if self.in_flight.is_some() {
            return Err(ControllerError::TurnInFlight);
        }

        self.append(Message::user(text)).await;

        if self.classifier.is_termination_request(text) {
            self.farewell().await;
            return Ok(SendOutcome::Farewell);
        }

        let turn_id = self.dispatch(text.to_string()).await;
        Ok(SendOutcome::Dispatched(turn_id))
    }

    /// Send the simulated salary slip upload
    pub async fn send_salary_slip(&mut self) -> Result<SendOutcome, ControllerError> {
        let active = self.session.active_agent();
        if !active.accepts_salary_slip() {
            return Err(ControllerError::UploadNotExpected { active });
        }
        self.send(SALARY_SLIP_TEXT).await
    }

    /// Abandon the current session and start a new one
    pub async fn reset(&mut self) {
        let old = self.session.id().clone();
        let cancelled = self.scheduler.cancel_session(&old);

        self.session = Session::new();
        self.in_flight = None;

        tracing::info!(
            old_session = %old,
            session_id = %self.session.id(),
            cancelled,
            "Session reset"
        );

        self.emit(ControllerMessage::SessionInfo {
            session_id: self.session.id().clone(),
            reset: true,
        })
        .await;
        self.emit(ControllerMessage::AgentChanged {
            agent: self.session.active_agent(),
        })
        .await;

        self.greet().await;
    }

    /// Download a message's document right away
    pub async fn download_artifact(
        &mut self,
        message_id: &MessageId,
    ) -> Result<DownloadOutcome, ControllerError> {
        let message = self
            .session
            .get_message(message_id)
            .ok_or_else(|| ControllerError::UnknownMessage(message_id.clone()))?;
        let url = message
            .artifact
            .clone()
            .ok_or_else(|| ControllerError::NoArtifact(message_id.clone()))?;

        let outcome = self
            .downloader
            .download(&url, &self.config.artifact_filename)
            .await;
        self.report_download(&outcome).await;
        Ok(outcome)
    }

    // ============================================
    // Polling
    // ============================================

    /// Apply every result that is already available.
    ///
    /// Returns true if anything was applied.
    pub async fn poll(&mut self) -> bool {
        let mut applied = false;
        while let Ok(event) = self.internal_rx.try_recv() {
            applied |= self.apply(event).await;
        }
        applied
    }

    /// Wait for the next result and apply it.
    ///
    /// Returns whether it changed anything; stale results are dropped and
    /// return false.
    ///
    /// # Cancel safety
    ///
    /// Not cancel safe. Applying a result talks to the surface, and dropping
    /// the future at that point loses the result. Inside `tokio::select!`,
    /// wait with [`next_event`](Self::next_event) and hand the event to
    /// [`apply_event`](Self::apply_event) after the select.
    pub async fn next_update(&mut self) -> bool {
        let event = self.next_event().await;
        self.apply_event(event).await
    }

    /// Wait for the next result without applying it.
    ///
    /// # Cancel safety
    ///
    /// Cancel safe: if the future is dropped before it completes, no result
    /// has been taken and the next call receives it.
    pub async fn next_event(&mut self) -> ControllerEvent {
        match self.internal_rx.recv().await {
            Some(event) => ControllerEvent(event),
            // The controller holds a sender, so the channel never closes
            None => std::future::pending().await,
        }
    }

    /// Apply a result received with [`next_event`](Self::next_event).
    ///
    /// Returns whether it changed anything. Await it to completion.
    pub async fn apply_event(&mut self, event: ControllerEvent) -> bool {
        self.apply(event.0).await
    }

    /// Wait until no turn is in flight
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            self.next_update().await;
        }
    }

    // ============================================
    // Internals
    // ============================================

    /// Issue the hidden greeting turn for the current session
    async fn greet(&mut self) {
        self.session.activate();
        let greeting = self.config.greeting.clone();
        self.dispatch(greeting).await;
    }

    /// Spawn one exchange with the backend, tagged with the current session
    async fn dispatch(&mut self, text: String) -> TurnId {
        let turn_id = TurnId::new();
        let session_id = self.session.id().clone();

        self.in_flight = Some(PendingTurn {
            session_id: session_id.clone(),
            turn_id,
        });

        tracing::debug!(session_id = %session_id, turn = %turn_id, "Dispatching turn");

        let channel = self.channel.clone();
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let reply = channel.request(&session_id, &text).await;
            let _ = internal_tx.send(Internal::TurnSettled {
                session_id,
                turn_id,
                reply,
            });
        });

        self.set_state(ControllerState::Thinking).await;
        turn_id
    }

    /// Answer a termination request locally
    async fn farewell(&mut self) {
        if self.session.set_active_agent(AgentLabel::Master) {
            self.emit(ControllerMessage::AgentChanged {
                agent: AgentLabel::Master,
            })
            .await;
        }
        let farewell = Message::agent(AgentLabel::Master, self.config.farewell_text.clone(), None);
        self.append(farewell).await;

        let session_id = self.session.id().clone();
        let internal_tx = self.internal_tx.clone();
        let due = session_id.clone();
        self.scheduler.schedule(
            &session_id,
            TaskKind::Completion,
            self.config.completion_delay,
            async move {
                let _ = internal_tx.send(Internal::CompletionDue { session_id: due });
            },
        );

        tracing::info!(session_id = %session_id, "User ended the session");
    }

    /// Schedule the automatic download of a new document
    fn schedule_download(&mut self, url: String) {
        let session_id = self.session.id().clone();
        let downloader = Arc::clone(&self.downloader);
        let filename = self.config.artifact_filename.clone();
        let internal_tx = self.internal_tx.clone();
        let owner = session_id.clone();

        self.scheduler.schedule(
            &session_id,
            TaskKind::Download,
            self.config.download_delay,
            async move {
                let outcome = downloader.download(&url, &filename).await;
                let _ = internal_tx.send(Internal::DownloadFinished {
                    session_id: owner,
                    outcome,
                });
            },
        );
    }

    /// Apply one internal event; returns whether it changed anything
    async fn apply(&mut self, event: Internal) -> bool {
        match event {
            Internal::TurnSettled {
                session_id,
                turn_id,
                reply,
            } => {
                let pending = PendingTurn {
                    session_id,
                    turn_id,
                };
                if self.in_flight.as_ref() != Some(&pending) {
                    tracing::debug!(
                        session_id = %pending.session_id,
                        turn = %pending.turn_id,
                        current = %self.session.id(),
                        "Discarding stale turn result"
                    );
                    return false;
                }
                self.in_flight = None;
                self.apply_reply(reply).await;
                true
            }
            Internal::CompletionDue { session_id } => {
                if &session_id != self.session.id() {
                    tracing::debug!(session_id = %session_id, "Discarding stale completion");
                    return false;
                }
                self.session.complete();
                self.set_state(ControllerState::Complete).await;
                self.emit(ControllerMessage::SessionComplete { session_id })
                    .await;
                true
            }
            Internal::DownloadFinished {
                session_id,
                outcome,
            } => {
                tracing::debug!(session_id = %session_id, ?outcome, "Scheduled download finished");
                self.report_download(&outcome).await;
                true
            }
        }
    }

    /// Record a settled turn's reply
    async fn apply_reply(&mut self, reply: ChannelReply) {
        // A failed turn does not tell us who is answering
        if !reply.recovered && self.session.set_active_agent(reply.agent) {
            tracing::debug!(agent = %reply.agent, "Active agent changed");
            self.emit(ControllerMessage::AgentChanged { agent: reply.agent })
                .await;
        }

        let content = self.sanitizer.clean(&reply.text);
        let artifact = reply.artifact_ref.clone();
        self.append(Message::agent(reply.agent, content, artifact))
            .await;

        if let Some(url) = reply.artifact_ref {
            self.schedule_download(url);
        }

        self.set_state(ControllerState::Ready).await;
    }

    /// Append to the log and show it
    async fn append(&mut self, message: Message) {
        let shown = self.session.push(message).clone();
        self.emit(ControllerMessage::Message(shown)).await;
    }

    /// Tell the surface how a download went
    async fn report_download(&self, outcome: &DownloadOutcome) {
        let msg = match outcome {
            DownloadOutcome::Saved { path } => ControllerMessage::ArtifactSaved { path: path.clone() },
            DownloadOutcome::OpenedExternally { url } => ControllerMessage::ArtifactFallback {
                url: url.clone(),
                opened: true,
            },
            DownloadOutcome::LinkOnly { url } => ControllerMessage::ArtifactFallback {
                url: url.clone(),
                opened: false,
            },
        };
        self.emit(msg).await;
    }

    /// Set state and notify the surface
    async fn set_state(&mut self, state: ControllerState) {
        self.state = state;
        self.emit(ControllerMessage::State { state }).await;
    }

    /// Send notification
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.emit(ControllerMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the surface
    async fn emit(&self, msg: ControllerMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}
