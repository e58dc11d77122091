//! Hive Assistant - Terminal Client
//!
//! Line-oriented chat with the Hive Capital loan assistant. Type a message
//! and press enter; slash commands control the session.
//!
//! # Usage
//!
//! ```bash
//! # Local backend on http://localhost:8000
//! hive-assistant
//!
//! # Remote backend, letters saved to ./letters
//! hive-assistant --api-url https://loans.example.com --download-dir ./letters
//!
//! # Verbose logging (written to stderr)
//! RUST_LOG=debug hive-assistant
//! ```
//!
//! # Commands
//!
//! - `/new`: start a new conversation
//! - `/upload`: share the salary slip (while underwriting)
//! - `/download`: fetch the latest sanction letter again
//! - `/status`: show the current agent and pipeline progress
//! - `/quit`: exit

mod render;

use std::io::{IsTerminal, Stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use hive_assistant_core::{
    default_config_path, load_config_from_path, ConfigOverrides, ControllerError, ControllerEvent,
    ControllerMessage, HttpArtifactDownloader, HttpTransport, KeywordClassifier, SendOutcome,
    SessionController, SystemLinkOpener,
};

use render::Renderer;

type Controller = SessionController<HttpTransport, HttpArtifactDownloader>;

/// Hive Assistant - chat with the Hive Capital loan assistant
#[derive(Parser, Debug)]
#[command(name = "hive-assistant")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Loan backend base address
    #[arg(short = 'u', long, value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "HIVE_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory sanction letters are saved to
    #[arg(short = 'd', long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "HIVE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Something the main loop woke up for
enum Event {
    Line(Option<String>),
    Update(ControllerEvent),
    Interrupt,
}

/// What the input loop should do next
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "hive_assistant={level},hive_assistant_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Build the controller from resolved configuration
fn build_controller(args: &Args, tx: mpsc::Sender<ControllerMessage>) -> Result<Controller> {
    let mut config = load_config_from_path(args.config.clone().or_else(default_config_path))
        .context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref url) = args.api_url {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(ref dir) = args.download_dir {
        overrides = overrides.with_download_dir(dir.clone());
    }
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    info!(
        base_url = %config.base_url,
        download_dir = %config.download_dir.display(),
        source = %config.source(),
        "Configuration resolved"
    );

    let transport = HttpTransport::new(&config.base_url, config.request_timeout)
        .with_context(|| format!("Invalid backend address: {}", config.base_url))?;

    let mut downloader = HttpArtifactDownloader::new(&config.base_url, config.download_dir.clone())
        .context("Failed to create downloader")?;
    if config.open_on_failure {
        downloader = downloader.with_opener(SystemLinkOpener);
    }

    let classifier = KeywordClassifier::new(&config.termination_keywords);

    Ok(SessionController::new(transport, downloader, config.controller.clone(), tx)
        .with_classifier(classifier))
}

/// Handle one line of user input
async fn handle_line(
    controller: &mut Controller,
    renderer: &mut Renderer<Stdout>,
    line: &str,
) -> Result<Flow> {
    match line.trim() {
        "/quit" | "/exit" => return Ok(Flow::Quit),
        "/new" => controller.reset().await,
        "/help" => renderer.help()?,
        "/status" => renderer.status(
            controller.status_line(),
            controller.active_agent(),
            controller.session_id(),
        )?,
        "/upload" => match controller.send_salary_slip().await {
            Ok(_) => {}
            Err(ControllerError::UploadNotExpected { active }) => renderer.info(&format!(
                "Uploads are only needed during underwriting ({} is handling your application)",
                active.profile().display_name
            ))?,
            Err(e) => report(renderer, &e)?,
        },
        "/download" => {
            let latest = controller.latest_artifact().map(|m| m.id.clone());
            match latest {
                Some(id) => {
                    if let Err(e) = controller.download_artifact(&id).await {
                        report(renderer, &e)?;
                    }
                }
                None => renderer.info("No sanction letter yet")?,
            }
        }
        command if command.starts_with('/') => {
            renderer.info(&format!("Unknown command {command} (try /help)"))?;
        }
        text => match controller.send(text).await {
            Ok(SendOutcome::Ignored | SendOutcome::Farewell | SendOutcome::Dispatched(_)) => {}
            Err(e) => report(renderer, &e)?,
        },
    }
    Ok(Flow::Continue)
}

/// Explain a rejected operation
fn report(renderer: &mut Renderer<Stdout>, error: &ControllerError) -> Result<()> {
    let text = match error {
        ControllerError::TurnInFlight => "Still waiting for the previous reply…".to_string(),
        ControllerError::SessionComplete => {
            "This conversation has ended. Type /new to start over.".to_string()
        }
        other => other.to_string(),
    };
    renderer.info(&text)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let (tx, mut rx) = mpsc::channel::<ControllerMessage>(100);
    let mut controller = build_controller(&args, tx)?;
    let stdout = std::io::stdout();
    let color = stdout.is_terminal();
    let mut renderer = Renderer::new(stdout).with_color(color);

    controller
        .start()
        .await
        .context("Failed to start the assistant")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        while let Ok(msg) = rx.try_recv() {
            renderer.render(&msg)?;
        }

        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line.context("Failed to read input")?),
            event = controller.next_event() => Event::Update(event),
            _ = tokio::signal::ctrl_c() => Event::Interrupt,
        };

        match event {
            Event::Line(Some(line)) => {
                if handle_line(&mut controller, &mut renderer, &line).await? == Flow::Quit {
                    break;
                }
            }
            Event::Line(None) => break,
            Event::Update(event) => {
                controller.apply_event(event).await;
            }
            Event::Interrupt => {
                info!("Interrupted");
                break;
            }
        }
    }

    while let Ok(msg) = rx.try_recv() {
        renderer.render(&msg)?;
    }
    info!(session_id = %controller.session_id(), "Exiting");
    Ok(())
}
