//! Normal startup: install if needed, run the artifact, check for updates alongside

use deltaboot_update::{
    ArtifactLauncher, BackgroundUpdateChecker, CheckOutcome, FixedAnswer, JavaLauncher,
    UpdatePrompt,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{Failure, Launcher};
use crate::cli::Cli;
use crate::output;
use crate::prompt::TerminalPrompt;

/// Environment variable carrying the installed build number
pub const BUILD_NUMBER_ENV: &str = "DELTABOOT_BUILD_NUMBER";
/// Environment variable carrying the launcher executable path
pub const LAUNCHER_ENV: &str = "DELTABOOT_LAUNCHER";

pub async fn run(cli: &Cli, launcher: &Launcher) -> Result<ExitCode, Failure> {
    let installed = launcher.updater().ensure_installed().await?;
    let artifact = installed.artifact().clone();

    let mut java = JavaLauncher::new(&launcher.config.launch)
        .with_env(BUILD_NUMBER_ENV, artifact.build_number.to_string());
    if let Ok(exe) = std::env::current_exe() {
        java = java.with_env(LAUNCHER_ENV, exe.display().to_string());
    }

    let args = cli.artifact_args();
    let launch = java.launch(&artifact.path, &artifact.entry_point, &args);
    tokio::pin!(launch);

    let checker = if cli.no_update_check || !launcher.config.update.background_check {
        debug!("Background update check disabled");
        None
    } else {
        let prompt: Arc<dyn UpdatePrompt> = if cli.yes {
            Arc::new(FixedAnswer(true))
        } else {
            Arc::new(TerminalPrompt)
        };
        Some(
            BackgroundUpdateChecker::new(
                launcher.catalog.clone(),
                artifact.build_number,
                prompt,
                launcher.relauncher.clone(),
            )
            .with_events(launcher.events.clone())
            .spawn(),
        )
    };

    let code = match checker {
        Some(mut handle) => {
            tokio::select! {
                code = &mut launch => {
                    handle.abort();
                    code?
                }
                joined = &mut handle => {
                    match joined {
                        Ok(CheckOutcome::Relaunched { latest }) => {
                            // Dropping the launch future stops the artifact
                            output::info(&format!("Restarting to install build {}", latest));
                            return Ok(ExitCode::SUCCESS);
                        }
                        Ok(CheckOutcome::RelaunchFailed(err)) => {
                            output::error(&format!("Could not start the update: {}", err));
                        }
                        Ok(outcome) => debug!("Background update check finished: {:?}", outcome),
                        Err(e) => warn!("Background update check did not complete: {}", e),
                    }
                    launch.await?
                }
            }
        }
        None => launch.await?,
    };

    debug!("Artifact exited with code {}", code);
    Ok(ExitCode::from(exit_status_byte(code)))
}

/// Clamp a child exit code into the range a process can return
fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
