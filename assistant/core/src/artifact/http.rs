//! HTTP artifact downloader

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use super::{ArtifactDownloader, DownloadError, DownloadOutcome, LinkOpener};
use crate::channel::{normalize_base_url, TransportError};

/// Downloads documents from the loan backend into a local directory
pub struct HttpArtifactDownloader {
    /// Backend base address without trailing slash
    base_url: String,
    /// Directory files are written to
    download_dir: PathBuf,
    /// HTTP client
    http_client: reqwest::Client,
    /// Fallback when a download fails
    opener: Option<Box<dyn LinkOpener>>,
}

impl HttpArtifactDownloader {
    /// Create a downloader saving into `download_dir`
    pub fn new(base_url: &str, download_dir: impl Into<PathBuf>) -> Result<Self, TransportError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            download_dir: download_dir.into(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()?,
            opener: None,
        })
    }

    /// Use `opener` when a download fails
    #[must_use]
    pub fn with_opener(mut self, opener: impl LinkOpener + 'static) -> Self {
        self.opener = Some(Box::new(opener));
        self
    }

    /// Resolve a document reference against the base address.
    ///
    /// Absolute `http(s)` addresses are used unchanged; anything else is
    /// appended to the base address.
    #[must_use]
    pub fn resolve(&self, url: &str) -> String {
        let url = url.trim();
        match reqwest::Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => url.to_string(),
            _ => format!("{}/{}", self.base_url, url.trim_start_matches('/')),
        }
    }

    /// Destination path; only the final component of `filename` is used
    fn target_path(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| super::DEFAULT_ARTIFACT_FILENAME.into());
        self.download_dir.join(name)
    }

    async fn fetch_and_save(&self, resolved: &str, filename: &str) -> Result<PathBuf, DownloadError> {
        let response = self.http_client.get(resolved).send().await?;
        if !response.status().is_success() {
            return Err(DownloadError::Status(response.status().as_u16()));
        }
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let path = self.target_path(filename);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

#[async_trait]
impl ArtifactDownloader for HttpArtifactDownloader {
    async fn download(&self, url: &str, filename: &str) -> DownloadOutcome {
        let resolved = self.resolve(url);

        match self.fetch_and_save(&resolved, filename).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Saved artifact");
                DownloadOutcome::Saved { path }
            }
            Err(e) => {
                tracing::warn!(url = %resolved, error = %e, "Artifact download failed, falling back to link");
                let Some(opener) = &self.opener else {
                    return DownloadOutcome::LinkOnly { url: resolved };
                };
                match opener.open(&resolved).await {
                    Ok(()) => DownloadOutcome::OpenedExternally { url: resolved },
                    Err(e) => {
                        tracing::warn!(url = %resolved, error = %e, "Could not open artifact link");
                        DownloadOutcome::LinkOnly { url: resolved }
                    }
                }
            }
        }
    }
}
