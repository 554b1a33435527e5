//! Artifact launch seam
//!
//! The engine only knows that an artifact has a path and an entry point.
//! How that entry point is started is up to the [`ArtifactLauncher`].

use async_trait::async_trait;
use deltaboot_core::types::LaunchConfig;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};

/// Runs an installed artifact's entry point
#[async_trait]
pub trait ArtifactLauncher: Send + Sync {
    /// Start `entry_point` from the artifact at `path` and wait for it to end
    ///
    /// Returns the artifact's exit code. Dropping the future stops the artifact.
    async fn launch(&self, path: &Path, entry_point: &str, args: &[String]) -> Result<i32>;
}

/// Starts the artifact in a JVM: `java [jvm-args] -cp <artifact> <entry> [args]`
#[derive(Debug, Clone)]
pub struct JavaLauncher {
    java: String,
    jvm_args: Vec<String>,
    env: Vec<(String, String)>,
}

impl JavaLauncher {
    pub fn new(config: &LaunchConfig) -> Self {
        Self {
            java: config.java.clone(),
            jvm_args: config.jvm_args.clone(),
            env: Vec::new(),
        }
    }

    /// Expose an environment variable to the artifact
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    fn command(&self, path: &Path, entry_point: &str, args: &[String]) -> Command {
        let mut command = Command::new(&self.java);
        command
            .args(&self.jvm_args)
            .arg("-cp")
            .arg(path)
            .arg(entry_point)
            .args(args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl ArtifactLauncher for JavaLauncher {
    async fn launch(&self, path: &Path, entry_point: &str, args: &[String]) -> Result<i32> {
        info!("Launching {} from {:?}", entry_point, path);
        debug!("Artifact arguments: {:?}", args);

        let mut child = self
            .command(path, entry_point, args)
            .spawn()
            .map_err(|e| UpdateError::LaunchFailed {
                path: path.to_path_buf(),
                detail: format!("could not start {}: {}", self.java, e),
            })?;

        let status = child.wait().await.map_err(|e| UpdateError::LaunchFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        debug!("Artifact exited with {}", status);
        Ok(status.code().unwrap_or(1))
    }
}
