//! Artifact Downloads
//!
//! When the backend generates a document (the sanction letter) it puts its
//! address in the turn's state snapshot. The downloader fetches it and saves
//! it locally; if anything goes wrong it falls back to handing the address to
//! the system opener so the user can still retrieve the file by hand.
//!
//! Downloads are fire-and-forget for the session state machine. The
//! [`DownloadOutcome`] only feeds surface notifications.

mod http;
mod opener;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpArtifactDownloader;
pub use opener::{LinkOpener, SystemLinkOpener};

/// File name used for the sanction letter
pub const DEFAULT_ARTIFACT_FILENAME: &str = "Hive_Capital_Sanction_Letter.txt";

/// What happened to a download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Document written to disk
    Saved {
        /// Where it was written
        path: PathBuf,
    },
    /// Download failed; the address was handed to the system opener
    OpenedExternally {
        /// Resolved document address
        url: String,
    },
    /// Download failed and no opener was available or it failed too
    LinkOnly {
        /// Resolved document address
        url: String,
    },
}

/// Errors while fetching and saving a document
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Connection or transfer failure
    #[error("download request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server refused the download
    #[error("download returned status {0}")]
    Status(u16),

    /// Could not write the file
    #[error("could not save download: {0}")]
    Io(#[from] std::io::Error),
}

/// Retrieves generated documents
#[async_trait]
pub trait ArtifactDownloader: Send + Sync {
    /// Fetch `url` (relative to the backend base address) and save it as
    /// `filename`, falling back to opening the address directly
    async fn download(&self, url: &str, filename: &str) -> DownloadOutcome;
}
