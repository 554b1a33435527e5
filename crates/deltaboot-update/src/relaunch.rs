//! Handing off to a fresh launcher process

use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::info;

use crate::error::{Result, UpdateError};

/// Flag that puts the launcher into forced-update mode
pub const FORCE_UPDATE_FLAG: &str = "--force-update";

/// Starts a new launcher process without waiting for it
///
/// After a successful call the caller is expected to exit with code 0.
pub trait Relauncher: Send + Sync {
    fn relaunch(&self, extra_args: &[String]) -> Result<()>;
}

/// Spawns the launcher binary as a detached child
#[derive(Debug, Clone)]
pub struct ProcessRelauncher {
    launcher_path: PathBuf,
    base_args: Vec<String>,
}

impl ProcessRelauncher {
    /// Relaunch `launcher_path`, always passing `base_args` first
    pub fn new(launcher_path: impl Into<PathBuf>, base_args: Vec<String>) -> Self {
        Self {
            launcher_path: launcher_path.into(),
            base_args,
        }
    }

    /// Relaunch the currently running executable
    pub fn current(base_args: Vec<String>) -> Result<Self> {
        let exe = std::env::current_exe().map_err(|e| UpdateError::SpawnFailed {
            program: "current executable".to_string(),
            source: e,
        })?;
        Ok(Self::new(exe, base_args))
    }
}

impl Relauncher for ProcessRelauncher {
    fn relaunch(&self, extra_args: &[String]) -> Result<()> {
        let mut args = self.base_args.clone();
        args.extend_from_slice(extra_args);

        info!("Relaunching {:?} {:?}", self.launcher_path, args);
        Command::new(&self.launcher_path)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map(|_child| ())
            .map_err(|e| UpdateError::SpawnFailed {
                program: self.launcher_path.display().to_string(),
                source: e,
            })
    }
}
