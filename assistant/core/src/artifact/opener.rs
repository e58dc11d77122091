//! System link opener, used when a download cannot be completed in-process.

use async_trait::async_trait;
use tokio::process::Command;

/// Hands an address to something that can show it to the user
#[async_trait]
pub trait LinkOpener: Send + Sync {
    /// Open `url`
    async fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens links with the platform's default handler
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLinkOpener;

impl SystemLinkOpener {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", url]);
            cmd
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

#[async_trait]
impl LinkOpener for SystemLinkOpener {
    async fn open(&self, url: &str) -> std::io::Result<()> {
        let status = Self::command(url)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!("opener exited with {status}")))
        }
    }
}
