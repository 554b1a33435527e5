//! Data directory layout
//!
//! Every file the engine touches lives directly inside the data directory,
//! so all replacements are same-filesystem renames.

use crate::error::Result;
use crate::types::ArtifactConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the downloaded patch
pub const PATCH_FILE_NAME: &str = "delta.patch";

/// Resolved locations of the installed artifact and its companions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherPaths {
    data_dir: PathBuf,
    artifact_name: String,
    artifact_file: String,
}

impl LauncherPaths {
    /// Build the layout for an artifact inside `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>, artifact: &ArtifactConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            artifact_name: artifact.name.clone(),
            artifact_file: artifact.file_name(),
        }
    }

    /// Create the data directory if it does not exist
    pub fn ensure_data_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Canonical path of the installed artifact
    pub fn artifact(&self) -> PathBuf {
        self.data_dir.join(&self.artifact_file)
    }

    /// The single backup slot
    pub fn backup(&self) -> PathBuf {
        self.data_dir.join(format!("{}.jar.bak", self.artifact_name))
    }

    /// Staging file for a backup copy in progress
    pub fn backup_staging(&self) -> PathBuf {
        self.data_dir.join(format!("{}.jar.bak.partial", self.artifact_name))
    }

    /// Downloaded patch for the current chain step
    pub fn patch(&self) -> PathBuf {
        self.data_dir.join(PATCH_FILE_NAME)
    }

    /// Where the artifact is moved while the patch for `build` is decoded
    pub fn aside(&self, build: u64) -> PathBuf {
        self.data_dir
            .join(format!("{}-{}.jar.old", self.artifact_name, build))
    }

    /// Whether `file_name` is an aside file left by an interrupted chain step
    pub fn is_aside_file(&self, file_name: &str) -> bool {
        file_name
            .strip_prefix(&self.artifact_name)
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|rest| rest.strip_suffix(".jar.old"))
            .map(|build| !build.is_empty() && build.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    }

    /// Staging output for decode and restore, renamed over the artifact on success
    pub fn artifact_staging(&self) -> PathBuf {
        self.data_dir.join(format!("{}.partial", self.artifact_file))
    }

    /// Staging file for a full baseline download
    pub fn download_staging(&self) -> PathBuf {
        self.data_dir.join(format!("{}.download", self.artifact_file))
    }
}
