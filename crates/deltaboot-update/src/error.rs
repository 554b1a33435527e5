//! Error types for the update engine
//!
//! Every failure is classified where it is detected and travels unchanged to
//! the top-level driver, which decides what to show and which exit code to use.
//! Expected outcomes (no update available, user declined, corrupt or absent
//! artifact) are not errors and never appear here.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for the update engine
pub type Result<T> = std::result::Result<T, UpdateError>;

/// Classified engine failures
#[derive(Error, Debug)]
pub enum UpdateError {
    /// Non-200 response, transport failure, timeout or unreadable catalog body
    #[error("Network error while {context}: {message}")]
    Network { context: String, message: String },

    /// The launcher itself must be upgraded out of band
    #[error("Launcher is out of date: {detail}")]
    LauncherOutOfDate { detail: String },

    /// A build in the chain is missing, failed, or its patch cannot be fetched
    #[error("Remote build {build} is unavailable: {detail}")]
    RemoteBuildUnavailable { build: u64, detail: String },

    /// The delta codec refused the patch or the base artifact
    #[error("Patch for build {build} could not be applied: {detail}")]
    PatchRejected { build: u64, detail: String },

    /// The artifact does not carry the expected metadata after an install step
    #[error("Installed artifact {} is invalid: {detail}", path.display())]
    InvalidArtifact { path: PathBuf, detail: String },

    /// Rename or copy failure mid-chain or during restore; disk state may be ambiguous
    #[error("Irrecoverable I/O failure while {operation} ({}): {source}", path.display())]
    IrrecoverableIo {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Recoverable filesystem failure (nothing has been mutated yet)
    #[error("I/O error while {operation} ({}): {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A forced update is already holding the backup slot
    #[error("A backup is already active for {}", path.display())]
    BackupActive { path: PathBuf },

    /// A child process could not be started
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The launched artifact could not be run
    #[error("Failed to launch {}: {detail}", path.display())]
    LaunchFailed { path: PathBuf, detail: String },
}

impl UpdateError {
    /// Create a network error from a reqwest failure
    pub fn network(context: impl Into<String>, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out ({})", err)
        } else {
            err.to_string()
        };
        Self::Network {
            context: context.into(),
            message,
        }
    }

    /// Create a network error for a non-success status code
    pub fn network_status(context: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Network {
            context: context.into(),
            message: format!("server returned {}", status),
        }
    }

    /// Create a launcher out-of-date error
    pub fn launcher_out_of_date(detail: impl Into<String>) -> Self {
        Self::LauncherOutOfDate {
            detail: detail.into(),
        }
    }

    /// Create a remote build unavailable error
    pub fn build_unavailable(build: u64, detail: impl Into<String>) -> Self {
        Self::RemoteBuildUnavailable {
            build,
            detail: detail.into(),
        }
    }

    /// Create an irrecoverable I/O error
    pub fn irrecoverable(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::IrrecoverableIo {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a recoverable I/O error
    pub fn io(operation: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the artifact on disk may be left in an inconsistent state
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::IrrecoverableIo { .. })
    }
}
