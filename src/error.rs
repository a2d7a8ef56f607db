//! Error taxonomy for binary resolution, download and launch
//!
//! Every failure is terminal: nothing in the launcher retries or recovers
//! locally, so each variant carries enough context to name the failing step.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, LaunchError>;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// The credential tool failed, could not be run, or printed nothing
    #[error("{0}")]
    Credential(String),

    /// Transport-level failure (DNS, TLS, connect, timeout, body read)
    #[error("{context}: {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-200 response from the release endpoint or asset host
    #[error("{context}: HTTP {status} - {body}")]
    Status {
        context: String,
        status: u16,
        body: String,
    },

    /// The asset host sent nothing for longer than the allowed window
    #[error("download timed out: no data received for {secs} seconds ({received} bytes received)")]
    Stalled { secs: u64, received: u64 },

    /// Malformed release listing
    #[error("failed to parse release info: {0}")]
    Parse(#[from] serde_json::Error),

    /// No asset name matched the current OS/arch
    #[error("no suitable binary found for {os}/{arch}{hint}")]
    NoMatchingAsset {
        os: String,
        arch: String,
        hint: String,
    },

    /// No matching entry inside a downloaded archive
    #[error("binary not found in {format}")]
    BinaryNotInArchive { format: &'static str },

    /// The archive container itself could not be read
    #[error("failed to read {format} archive: {source}")]
    Archive {
        format: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory creation, file write, permission or rename failure
    #[error("{context} ({}): {source}", .path.display())]
    Filesystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Helper binary could not be started
    #[error("failed to start {}: {source}", .path.display())]
    ChildProcess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable or malformed configuration overlay
    #[error("invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// A blocking extraction task panicked or was cancelled
    #[error("extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LaunchError {
    pub(crate) fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn fs(
        context: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            context,
            path: path.into(),
            source,
        }
    }
}
