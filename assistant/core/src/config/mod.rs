//! TOML Configuration File Support
//!
//! Configuration for the assistant, loaded from
//! `~/.config/hive-assistant/assistant.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 120
//!
//! [session]
//! greeting = "Hi"
//! completion_delay_ms = 1000
//! download_delay_ms = 500
//! artifact_filename = "Hive_Capital_Sanction_Letter.txt"
//! termination_keywords = ["done", "bye", "thank you"]
//!
//! [downloads]
//! directory = "/home/me/Downloads"
//! open_on_failure = true
//! ```
//!
//! # Environment Variables
//!
//! - `HIVE_API_URL`: backend base address
//! - `HIVE_REQUEST_TIMEOUT`: per-turn timeout in seconds (`0` disables it)
//! - `HIVE_DOWNLOAD_DIR`: where generated documents are saved

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::DEFAULT_BASE_URL;
use crate::controller::ControllerConfig;
use crate::termination::DEFAULT_TERMINATION_KEYWORDS;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[backend]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Base address of the loan backend
    pub base_url: Option<String>,

    /// Per-turn timeout in seconds (0 = none)
    pub request_timeout_secs: Option<u64>,
}

/// `[session]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Hidden message that opens every session
    pub greeting: Option<String>,

    /// Local reply to a termination request
    pub farewell_text: Option<String>,

    /// Reply shown when a turn fails
    pub apology_text: Option<String>,

    /// Delay between the farewell and the completion flag
    pub completion_delay_ms: Option<u64>,

    /// Delay before an automatic artifact download
    pub download_delay_ms: Option<u64>,

    /// File name for downloaded documents
    pub artifact_filename: Option<String>,

    /// Phrases that end the session
    pub termination_keywords: Option<Vec<String>>,
}

/// `[downloads]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadsToml {
    /// Directory documents are saved to
    pub directory: Option<PathBuf>,

    /// Launch the system opener when a download fails
    pub open_on_failure: Option<bool>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantToml {
    /// Backend section
    pub backend: BackendToml,

    /// Session section
    pub session: SessionToml,

    /// Downloads section
    pub downloads: DownloadsToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved assistant configuration
#[derive(Clone, Debug)]
pub struct AssistantConfig {
    /// Backend base address
    pub base_url: String,

    /// Per-turn timeout; `None` lets turns run to completion
    pub request_timeout: Option<Duration>,

    /// Session controller settings
    pub controller: ControllerConfig,

    /// Phrases that end the session
    pub termination_keywords: Vec<String>,

    /// Directory documents are saved to
    pub download_dir: PathBuf,

    /// Launch the system opener when a download fails
    pub open_on_failure: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
            controller: ControllerConfig::default(),
            termination_keywords: DEFAULT_TERMINATION_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
            download_dir: default_download_dir(),
            open_on_failure: true,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl AssistantConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Check values that would make the assistant unusable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("backend base_url is empty".into()));
        }
        if !self.termination_keywords.iter().any(|k| !k.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "termination_keywords must contain at least one phrase".into(),
            ));
        }
        if self.controller.greeting.trim().is_empty() {
            return Err(ConfigError::ValidationError("greeting is empty".into()));
        }
        if self.controller.artifact_filename.trim().is_empty() {
            return Err(ConfigError::ValidationError("artifact_filename is empty".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/hive-assistant/assistant.toml` or the platform
/// equivalent.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hive-assistant").join("assistant.toml"))
}

/// Default directory for downloaded documents
#[must_use]
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Load configuration from the default path, then the environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<AssistantConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path, then the environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<AssistantConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` to look up environment variables
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<AssistantConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AssistantConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: AssistantToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut AssistantConfig, toml: &AssistantToml) {
    // Backend
    if let Some(ref url) = toml.backend.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = toml.backend.request_timeout_secs {
        config.request_timeout = timeout_from_secs(secs);
    }

    // Session
    let session = &toml.session;
    if let Some(ref greeting) = session.greeting {
        config.controller.greeting = greeting.clone();
    }
    if let Some(ref text) = session.farewell_text {
        config.controller.farewell_text = text.clone();
    }
    if let Some(ref text) = session.apology_text {
        config.controller.apology_text = text.clone();
    }
    if let Some(ms) = session.completion_delay_ms {
        config.controller.completion_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = session.download_delay_ms {
        config.controller.download_delay = Duration::from_millis(ms);
    }
    if let Some(ref name) = session.artifact_filename {
        config.controller.artifact_filename = name.clone();
    }
    if let Some(ref keywords) = session.termination_keywords {
        config.termination_keywords = keywords.clone();
    }

    // Downloads
    if let Some(ref dir) = toml.downloads.directory {
        config.download_dir = dir.clone();
    }
    if let Some(open) = toml.downloads.open_on_failure {
        config.open_on_failure = open;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut AssistantConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("HIVE_API_URL") {
        if !url.trim().is_empty() {
            config.base_url = url;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(timeout) = env("HIVE_REQUEST_TIMEOUT") {
        if let Ok(secs) = timeout.trim().parse::<u64>() {
            config.request_timeout = timeout_from_secs(secs);
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring invalid HIVE_REQUEST_TIMEOUT");
        }
    }
    if let Some(dir) = env("HIVE_DOWNLOAD_DIR") {
        if !dir.trim().is_empty() {
            config.download_dir = PathBuf::from(dir);
            config.source = ConfigSource::Env;
        }
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend base address override
    pub base_url: Option<String>,

    /// Download directory override
    pub download_dir: Option<PathBuf>,

    /// Request timeout override (seconds, 0 = none)
    pub request_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base address override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set download directory override
    #[must_use]
    pub fn with_download_dir(mut self, dir: PathBuf) -> Self {
        self.download_dir = Some(dir);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut AssistantConfig) {
        if self.base_url.is_some() || self.download_dir.is_some() || self.request_timeout_secs.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ref dir) = self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout = timeout_from_secs(secs);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
