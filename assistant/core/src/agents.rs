//! Loan Pipeline Agents
//!
//! The backend answers every turn on behalf of one of a fixed set of agents,
//! each representing a stage of the loan pipeline. The label it reports is
//! authoritative: the client never checks that transitions follow any order.
//!
//! Display information (name, icon, accent) is an exhaustive mapping over
//! [`AgentLabel`], so adding a stage forces every surface lookup to be
//! updated at compile time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Backend agent currently answering the conversation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentLabel {
    /// Router that greets the user and hands off to the pipeline
    #[default]
    Master,
    /// Collects loan amount and tenure
    Sales,
    /// KYC verification
    Verification,
    /// Credit assessment, may ask for a salary slip
    Underwriting,
    /// Issues the sanction letter
    Sanction,
}

/// How a surface should present an agent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentProfile {
    /// Human-readable name
    pub display_name: &'static str,
    /// Single-glyph icon
    pub icon: &'static str,
    /// Accent color name (surface decides the actual palette)
    pub accent: &'static str,
}

impl AgentLabel {
    /// Pipeline stages in the order the backend normally walks them.
    /// `Master` is the router and is not a stage.
    pub const PIPELINE: [AgentLabel; 4] = [
        AgentLabel::Sales,
        AgentLabel::Verification,
        AgentLabel::Underwriting,
        AgentLabel::Sanction,
    ];

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::Sales => "SALES",
            Self::Verification => "VERIFICATION",
            Self::Underwriting => "UNDERWRITING",
            Self::Sanction => "SANCTION",
        }
    }

    /// Display profile for this agent
    #[must_use]
    pub fn profile(&self) -> AgentProfile {
        match self {
            Self::Master => AgentProfile {
                display_name: "Master Agent",
                icon: "🤖",
                accent: "slate",
            },
            Self::Sales => AgentProfile {
                display_name: "Sales Agent",
                icon: "💼",
                accent: "emerald",
            },
            Self::Verification => AgentProfile {
                display_name: "Verification Agent",
                icon: "🔍",
                accent: "blue",
            },
            Self::Underwriting => AgentProfile {
                display_name: "Underwriting Agent",
                icon: "📊",
                accent: "amber",
            },
            Self::Sanction => AgentProfile {
                display_name: "Sanction Agent",
                icon: "📄",
                accent: "purple",
            },
        }
    }

    /// Whether this stage expects the user to provide a salary slip
    #[must_use]
    pub fn accepts_salary_slip(&self) -> bool {
        matches!(self, Self::Underwriting)
    }

    /// Parse a backend label, falling back to `Master` for anything unknown
    #[must_use]
    pub fn from_wire(label: &str) -> Self {
        label.parse().unwrap_or_else(|_| {
            tracing::warn!(label = %label, "Unknown agent label from backend, using MASTER");
            Self::Master
        })
    }
}

impl fmt::Display for AgentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for labels outside the known pipeline
#[derive(Debug, thiserror::Error)]
#[error("unknown agent label: {0}")]
pub struct UnknownAgentLabel(pub String);

impl FromStr for AgentLabel {
    type Err = UnknownAgentLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MASTER" => Ok(Self::Master),
            "SALES" => Ok(Self::Sales),
            "VERIFICATION" => Ok(Self::Verification),
            "UNDERWRITING" => Ok(Self::Underwriting),
            "SANCTION" => Ok(Self::Sanction),
            _ => Err(UnknownAgentLabel(s.to_string())),
        }
    }
}
