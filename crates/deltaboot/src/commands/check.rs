//! Report installed and latest stable builds without changing anything

use deltaboot_update::{probe, ProbeResult};
use std::process::ExitCode;

use super::{Failure, Launcher};
use crate::output;
use crate::render::pluralize;

pub async fn run(launcher: &Launcher) -> Result<ExitCode, Failure> {
    let artifact_path = launcher.paths.artifact();
    let installed = probe(&artifact_path);

    output::header("Installed artifact");
    output::kv("Path", &artifact_path.display().to_string());
    match &installed {
        ProbeResult::Valid(artifact) => {
            output::kv("Build", &artifact.build_number.to_string());
            output::kv("Version", &artifact.display_version);
            output::kv("Entry point", &artifact.entry_point);
        }
        ProbeResult::Corrupt { reason } => output::kv("Status", &format!("corrupt ({})", reason)),
        ProbeResult::Absent => output::kv("Status", "not installed"),
    }

    let spinner = output::spinner("Checking for updates...");
    let latest = launcher.catalog.latest_stable().await;
    spinner.finish_and_clear();
    let latest = latest?;

    output::header("Build server");
    output::kv("Latest stable", &latest.to_string());
    println!();

    let current = installed.effective_build();
    match installed {
        ProbeResult::Valid(_) if latest <= current => {
            output::success("Already on the latest build");
        }
        ProbeResult::Valid(_) => {
            output::info(&format!(
                "{} available; run with --force-update to install",
                pluralize(latest - current, "patch", "patches")
            ));
        }
        _ => output::info("The baseline artifact will be downloaded on the next launch"),
    }

    Ok(ExitCode::SUCCESS)
}
