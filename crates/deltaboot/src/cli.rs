//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;
use deltaboot_update::FORCE_UPDATE_FLAG;

/// deltaboot - keeps an application patched to its latest stable build, then runs it
#[derive(Parser, Debug)]
#[command(name = "deltaboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Apply every pending patch now, then relaunch
    #[arg(short = 'u', long)]
    pub force_update: bool,

    /// Show the installed and latest stable builds without changing anything
    #[arg(long, conflicts_with = "force_update")]
    pub check: bool,

    /// Arguments for the application (repeatable; split on whitespace)
    #[arg(short = 'a', long = "arg", value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Skip the background update check
    #[arg(long)]
    pub no_update_check: bool,

    /// Accept available updates without asking
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Data directory holding the artifact (default: ~/.deltaboot)
    #[arg(long, env = "DELTABOOT_DATA_DIR")]
    pub data_dir: Option<Utf8PathBuf>,

    /// Build server job URL
    #[arg(long)]
    pub job_url: Option<String>,

    /// Path to launcher.yaml
    #[arg(short, long)]
    pub config: Option<Utf8PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Arguments handed to the application
    pub fn artifact_args(&self) -> Vec<String> {
        self.args
            .iter()
            .flat_map(|value| value.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    /// Arguments a relaunched launcher needs to behave like this one
    ///
    /// The forced-update flag is never included; the relauncher adds it
    /// when needed.
    pub fn relaunch_args(&self) -> Vec<String> {
        let mut out = Vec::new();

        if let Some(dir) = &self.data_dir {
            out.push("--data-dir".to_string());
            out.push(dir.to_string());
        }
        if let Some(url) = &self.job_url {
            out.push("--job-url".to_string());
            out.push(url.clone());
        }
        if let Some(config) = &self.config {
            out.push("--config".to_string());
            out.push(config.to_string());
        }
        if self.no_update_check {
            out.push("--no-update-check".to_string());
        }
        if self.yes {
            out.push("--yes".to_string());
        }
        if self.quiet {
            out.push("--quiet".to_string());
        }
        for _ in 0..self.verbose {
            out.push("--verbose".to_string());
        }
        for value in &self.args {
            out.push(format!("--arg={}", value));
        }

        debug_assert!(!out.iter().any(|a| a == FORCE_UPDATE_FLAG));
        out
    }
}
