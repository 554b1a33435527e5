//! Command drivers
//!
//! The single place where engine errors are reported to the user and turned
//! into an exit code.

pub mod check;
pub mod force_update;
pub mod launch;

use anyhow::{anyhow, Context as _};
use camino::Utf8PathBuf;
use deltaboot_core::{default_data_dir, ConfigLoader, LauncherConfig, LauncherPaths};
use deltaboot_update::{
    BackupManager, CommandCodec, EventSink, NamingChecker, ProcessRelauncher, RemoteCatalog,
    UpdateError, Updater,
};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cli::Cli;
use crate::output;
use crate::render;

/// Exit code when the published artifact no longer matches this launcher
pub const EXIT_LAUNCHER_OUT_OF_DATE: u8 = 2;
/// Exit code when the artifact on disk may be inconsistent
pub const EXIT_IRRECOVERABLE: u8 = 3;
/// Exit code for unusable configuration
pub const EXIT_CONFIG: u8 = 4;

/// Why a command did not complete
#[derive(Debug)]
pub enum Failure {
    /// Configuration or environment problem found before the engine ran
    Setup(anyhow::Error),
    /// Classified engine failure
    Engine(UpdateError),
}

impl From<UpdateError> for Failure {
    fn from(err: UpdateError) -> Self {
        Self::Engine(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Setup(err)
    }
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Setup(_) => EXIT_CONFIG,
            Self::Engine(UpdateError::LauncherOutOfDate { .. }) => EXIT_LAUNCHER_OUT_OF_DATE,
            Self::Engine(err) if err.is_critical() => EXIT_IRRECOVERABLE,
            Self::Engine(_) => 1,
        }
    }

    /// Print the failure with a hint where one helps
    pub fn report(&self, paths: Option<&LauncherPaths>) {
        match self {
            Self::Setup(err) => output::error(&format!("{:#}", err)),
            Self::Engine(err) => {
                output::error(&err.to_string());
                match err {
                    UpdateError::LauncherOutOfDate { .. } => {
                        output::info("This launcher is out of date; install a newer release")
                    }
                    UpdateError::IrrecoverableIo { .. } => {
                        if let Some(paths) = paths {
                            output::warning(&format!(
                                "The artifact may be inconsistent; delete {} to force a fresh download",
                                paths.artifact().display()
                            ));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Everything a command needs, resolved from the CLI and configuration
pub struct Launcher {
    pub config: LauncherConfig,
    pub paths: LauncherPaths,
    pub catalog: Arc<RemoteCatalog>,
    pub relauncher: Arc<ProcessRelauncher>,
    /// The one backup slot for this artifact, shared by every updater
    pub backups: Arc<BackupManager>,
    pub events: EventSink,
}

impl Launcher {
    /// Resolve configuration with CLI flags taking precedence
    pub fn from_cli(cli: &Cli, events: EventSink) -> Result<Self, Failure> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = default_data_dir().context("Failed to locate the data directory")?;
                Utf8PathBuf::from_path_buf(dir)
                    .map_err(|p| anyhow!("Data directory {:?} is not valid UTF-8", p))?
            }
        };

        let mut config = ConfigLoader::with_dir(data_dir.clone())
            .load(cli.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(url) = &cli.job_url {
            config.server.job_url = Some(url.clone());
        }

        let job_url = config
            .server
            .job_url
            .clone()
            .ok_or_else(|| anyhow!("No job URL configured; pass --job-url or set server.job-url"))?;
        debug!("Using job {} and data directory {}", job_url, data_dir);

        let paths = LauncherPaths::new(data_dir.into_std_path_buf(), &config.artifact);
        paths
            .ensure_data_dir()
            .context("Failed to create the data directory")?;

        let catalog = RemoteCatalog::new(&job_url, &config)?.with_events(events.clone());
        let relauncher = ProcessRelauncher::current(cli.relaunch_args())?;
        let backups = BackupManager::new(paths.backup());

        Ok(Self {
            config,
            paths,
            catalog: Arc::new(catalog),
            relauncher: Arc::new(relauncher),
            backups: Arc::new(backups),
            events,
        })
    }

    /// Engine driver for install and forced update
    pub fn updater(&self) -> Updater {
        Updater::new(
            self.paths.clone(),
            self.catalog.clone(),
            Arc::new(CommandCodec::from_config(&self.config.update)),
            NamingChecker::new(&self.config.artifact),
            self.backups.clone(),
            self.relauncher.clone(),
        )
        .with_events(self.events.clone())
    }
}

/// Run the command selected by the CLI flags
pub async fn run(cli: Cli) -> ExitCode {
    let (events, renderer) = render::start(cli.quiet);

    let launcher = match Launcher::from_cli(&cli, events) {
        Ok(launcher) => launcher,
        Err(failure) => {
            failure.report(None);
            return ExitCode::from(failure.exit_code());
        }
    };
    let paths = launcher.paths.clone();

    let result = if cli.check {
        check::run(&launcher).await
    } else if cli.force_update {
        force_update::run(&launcher).await
    } else {
        launch::run(&cli, &launcher).await
    };
    drop(launcher);

    // Let the renderer drain; a lingering background task may still hold a sink
    if let Some(handle) = renderer {
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }

    match result {
        Ok(code) => code,
        Err(failure) => {
            failure.report(Some(&paths));
            ExitCode::from(failure.exit_code())
        }
    }
}
