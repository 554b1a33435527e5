//! Forced update: apply every pending patch, then relaunch

use deltaboot_update::UpdateResult;
use std::process::ExitCode;

use super::{Failure, Launcher};
use crate::output;

/// Runs the chain synchronously; the engine relaunches before returning
pub async fn run(launcher: &Launcher) -> Result<ExitCode, Failure> {
    match launcher.updater().force_update().await? {
        UpdateResult::AlreadyUpToDate { build } => {
            output::success(&format!("Build {} is already the latest", build));
        }
        UpdateResult::Updated { from, to } => {
            output::success(&format!(
                "Updated {} from build {} to {}",
                launcher.config.artifact.name, from, to
            ));
        }
    }
    Ok(ExitCode::SUCCESS)
}
