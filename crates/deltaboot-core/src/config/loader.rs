//! Hierarchical configuration loader
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Config file (`<data-dir>/launcher.yaml`, or an explicit `--config` path)
//! 3. Environment variables (DELTABOOT_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::LauncherConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Default config file name inside the data directory
pub const CONFIG_FILE_NAME: &str = "launcher.yaml";

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Data directory holding the default config file
    data_dir: Utf8PathBuf,
}

impl ConfigLoader {
    /// Create a loader rooted at a data directory
    pub fn with_dir(data_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the launcher configuration
    ///
    /// An explicit path must exist; the default `launcher.yaml` is optional.
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<LauncherConfig> {
        let mut config = LauncherConfig::default();

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::config_not_found(path.as_str()));
                }
                config = Self::load_yaml_file(path)?;
            }
            None => {
                let default_path = self.config_path();
                if default_path.exists() {
                    config = Self::load_yaml_file(&default_path)?;
                }
            }
        }

        Self::apply_env_overrides(config)
    }

    /// Path of the default config file
    pub fn config_path(&self) -> Utf8PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<LauncherConfig> {
        debug!("Loading launcher config from {}", path);
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: LauncherConfig) -> Result<LauncherConfig> {
        if let Ok(val) = env::var("DELTABOOT_JOB_URL") {
            config.server.job_url = Some(val);
        }

        if let Ok(val) = env::var("DELTABOOT_ARTIFACT_DIR") {
            config.server.artifact_dir = val;
        }

        if let Ok(val) = env::var("DELTABOOT_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("DELTABOOT_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("DELTABOOT_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("DELTABOOT_DOWNLOAD_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("DELTABOOT_CODEC") {
            config.update.codec_program = val;
        }

        if let Ok(val) = env::var("DELTABOOT_JAVA") {
            config.launch.java = val;
        }

        if let Ok(val) = env::var("DELTABOOT_BACKGROUND_CHECK") {
            config.update.background_check = val.parse().map_err(|_| {
                Error::invalid_config("DELTABOOT_BACKGROUND_CHECK must be true or false")
            })?;
        }

        Ok(config)
    }
}
