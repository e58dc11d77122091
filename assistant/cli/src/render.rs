//! Plain-text rendering of controller messages

use std::io::{self, Write};

use hive_assistant_core::{
    AgentLabel, AgentProfile, ControllerMessage, ControllerState, Message, MessageRole,
    NotifyLevel, SessionId,
};

/// ANSI foreground code for an agent accent
fn accent_code(accent: &str) -> &'static str {
    match accent {
        "emerald" => "32",
        "amber" => "33",
        "blue" => "34",
        "purple" => "35",
        _ => "90",
    }
}

/// Writes the conversation to a line-oriented terminal
pub struct Renderer<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, color: false }
    }

    /// Paint agent names in their accent color
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Icon and name of an agent, colored when enabled
    fn agent_name(&self, profile: &AgentProfile) -> String {
        if self.color {
            format!(
                "{} \x1b[{}m{}\x1b[0m",
                profile.icon,
                accent_code(profile.accent),
                profile.display_name
            )
        } else {
            format!("{} {}", profile.icon, profile.display_name)
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one controller message
    pub fn render(&mut self, msg: &ControllerMessage) -> io::Result<()> {
        match msg {
            ControllerMessage::Message(message) => self.message(message)?,
            ControllerMessage::AgentChanged { agent } => {
                let name = self.agent_name(&agent.profile());
                writeln!(self.out, "── now with {name} ──")?;
                if agent.accepts_salary_slip() {
                    writeln!(self.out, "   (type /upload to share your salary slip)")?;
                }
            }
            ControllerMessage::State { state } => {
                if *state == ControllerState::Thinking {
                    writeln!(self.out, "   …")?;
                }
            }
            ControllerMessage::SessionInfo { session_id, reset } => {
                if *reset {
                    writeln!(self.out)?;
                    writeln!(self.out, "── new conversation ({session_id}) ──")?;
                } else {
                    writeln!(self.out, "── session {session_id} ──")?;
                }
            }
            ControllerMessage::SessionComplete { .. } => {
                writeln!(
                    self.out,
                    "── {} · type /new to start over or /quit to exit ──",
                    ControllerState::Complete.description()
                )?;
            }
            ControllerMessage::ArtifactSaved { path } => {
                writeln!(self.out, "📄 Sanction letter saved to {}", path.display())?;
            }
            ControllerMessage::ArtifactFallback { url, opened } => {
                if *opened {
                    writeln!(self.out, "📄 Could not save the letter; opened {url}")?;
                } else {
                    writeln!(self.out, "📄 Could not save the letter; download it from {url}")?;
                }
            }
            ControllerMessage::Notify { level, message } => {
                let tag = match level {
                    NotifyLevel::Info => "i",
                    NotifyLevel::Warning => "!",
                };
                writeln!(self.out, "[{tag}] {message}")?;
            }
        }
        self.out.flush()
    }

    fn message(&mut self, message: &Message) -> io::Result<()> {
        match message.role {
            MessageRole::User => {
                writeln!(self.out, "[{}] You: {}", message.time_label(), message.content)?;
            }
            MessageRole::Agent => {
                let name = self.agent_name(&message.agent.unwrap_or_default().profile());
                writeln!(
                    self.out,
                    "[{}] {name}: {}",
                    message.time_label(),
                    message.content
                )?;
                if message.artifact.is_some() {
                    writeln!(self.out, "   📎 Sanction letter ready (type /download to fetch it again)")?;
                }
            }
        }
        Ok(())
    }

    /// Header and pipeline progress
    pub fn status(
        &mut self,
        status_line: &str,
        active: AgentLabel,
        session_id: &SessionId,
    ) -> io::Result<()> {
        let stages: Vec<String> = AgentLabel::PIPELINE
            .iter()
            .map(|stage| {
                if *stage == active {
                    format!("[{stage}]")
                } else {
                    stage.to_string()
                }
            })
            .collect();

        writeln!(self.out, "{status_line}")?;
        writeln!(self.out, "  {}", stages.join(" › "))?;
        writeln!(self.out, "  session {session_id}")?;
        self.out.flush()
    }

    /// Local notice that is not part of the conversation
    pub fn info(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "[i] {text}")?;
        self.out.flush()
    }

    pub fn help(&mut self) -> io::Result<()> {
        writeln!(self.out, "Commands:")?;
        writeln!(self.out, "  /new       start a new conversation")?;
        writeln!(self.out, "  /upload    share your salary slip (during underwriting)")?;
        writeln!(self.out, "  /download  fetch the latest sanction letter again")?;
        writeln!(self.out, "  /status    show the current agent and progress")?;
        writeln!(self.out, "  /quit      exit")?;
        self.out.flush()
    }
}
