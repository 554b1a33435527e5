//! Engine entry points
//!
//! This module provides:
//! - `ensure_installed`: probe the artifact and fetch the full baseline when
//!   it is absent or corrupt
//! - `force_update`: back up, walk the patch chain to the latest stable
//!   build, then commit and relaunch, or restore the backup on any abort

use deltaboot_core::LauncherPaths;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::backup::BackupManager;
use crate::catalog::RemoteCatalog;
use crate::chain::{ChainOutcome, PatchChainApplier};
use crate::codec::DeltaCodec;
use crate::error::{Result, UpdateError};
use crate::events::{EventSink, UpdateEvent, UpdatePhase};
use crate::naming::NamingChecker;
use crate::probe::{probe, InstalledArtifact, ProbeResult};
use crate::relaunch::Relauncher;
use crate::utils::remove_quietly;

/// What `ensure_installed` had to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// A valid artifact was already on disk
    Present(InstalledArtifact),

    /// The baseline artifact was downloaded
    Downloaded(InstalledArtifact),
}

impl InstallResult {
    pub fn artifact(&self) -> &InstalledArtifact {
        match self {
            Self::Present(artifact) | Self::Downloaded(artifact) => artifact,
        }
    }
}

/// Result of a forced update that reached the relaunch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Nothing newer was published
    AlreadyUpToDate { build: u64 },

    /// The chain completed
    Updated { from: u64, to: u64 },
}

/// Drives the install and forced-update flows
///
/// Updaters for the same artifact must share one [`BackupManager`] so that
/// only a single backup can be outstanding at a time.
pub struct Updater {
    paths: LauncherPaths,
    catalog: Arc<RemoteCatalog>,
    codec: Arc<dyn DeltaCodec>,
    naming: NamingChecker,
    backups: Arc<BackupManager>,
    relauncher: Arc<dyn Relauncher>,
    events: EventSink,
}

impl Updater {
    pub fn new(
        paths: LauncherPaths,
        catalog: Arc<RemoteCatalog>,
        codec: Arc<dyn DeltaCodec>,
        naming: NamingChecker,
        backups: Arc<BackupManager>,
        relauncher: Arc<dyn Relauncher>,
    ) -> Self {
        Self {
            paths,
            catalog,
            codec,
            naming,
            backups,
            relauncher,
            events: EventSink::disabled(),
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn paths(&self) -> &LauncherPaths {
        &self.paths
    }

    /// Make sure a valid artifact is installed
    ///
    /// Corrupt artifacts are treated exactly like missing ones: the full
    /// baseline is downloaded and the patch chain is not involved.
    pub async fn ensure_installed(&self) -> Result<InstallResult> {
        let artifact_path = self.paths.artifact();

        match probe(&artifact_path) {
            ProbeResult::Valid(artifact) => {
                debug!("Installed build {} ({})", artifact.build_number, artifact.display_version);
                return Ok(InstallResult::Present(artifact));
            }
            ProbeResult::Corrupt { reason } => {
                warn!("Installed artifact is corrupt ({}), downloading a fresh copy", reason)
            }
            ProbeResult::Absent => info!("No artifact installed, downloading baseline"),
        }

        fs::create_dir_all(self.paths.data_dir())
            .await
            .map_err(|e| UpdateError::io("creating the data directory", self.paths.data_dir(), e))?;

        self.catalog
            .download_baseline(&artifact_path, &self.paths.download_staging())
            .await?;

        match probe(&artifact_path) {
            ProbeResult::Valid(artifact) => {
                info!("Installed build {}", artifact.build_number);
                self.events.emit(UpdateEvent::Installed {
                    build: artifact.build_number,
                });
                Ok(InstallResult::Downloaded(artifact))
            }
            ProbeResult::Corrupt { reason } => Err(UpdateError::InvalidArtifact {
                path: artifact_path,
                detail: format!("downloaded artifact is unusable: {}", reason),
            }),
            ProbeResult::Absent => Err(UpdateError::InvalidArtifact {
                path: artifact_path,
                detail: "downloaded artifact disappeared".to_string(),
            }),
        }
    }

    /// Run the forced-update path to completion
    ///
    /// This performs the following steps:
    /// 1. Clear leftovers from an interrupted run and install a baseline if needed
    /// 2. Ask the catalog for the latest stable build
    /// 3. Back up the artifact
    /// 4. Apply the patch chain
    /// 5. Commit the backup and relaunch, or restore it on abort
    pub async fn force_update(&self) -> Result<UpdateResult> {
        self.events.phase(UpdatePhase::Idle);
        self.cleanup_stale_files().await;

        let current = self.ensure_installed().await?.artifact().clone();
        let latest = self.catalog.latest_stable().await?;

        if latest <= current.build_number {
            info!("Build {} is up to date (latest stable {})", current.build_number, latest);
            self.relaunch()?;
            return Ok(UpdateResult::AlreadyUpToDate {
                build: current.build_number,
            });
        }

        self.events.phase(UpdatePhase::BackingUp);
        let record = self
            .backups
            .begin_backup(&current.path, current.build_number)
            .await
            .inspect_err(|_| self.events.phase(UpdatePhase::Terminal { success: false }))?;

        self.events.phase(UpdatePhase::PatchingChain);
        let applier = PatchChainApplier::new(
            &self.catalog,
            self.codec.as_ref(),
            &self.naming,
            &self.paths,
        )
        .with_events(self.events.clone());

        match applier.apply(current.build_number, latest).await {
            ChainOutcome::FinalBuild(build) => {
                self.events.phase(UpdatePhase::Committing);
                if let Err(e) = self.backups.commit(record).await {
                    warn!("Update applied but the backup could not be removed: {}", e);
                }
                info!("Updated from build {} to {}", current.build_number, build);
                self.events.emit(UpdateEvent::Installed { build });

                self.relaunch()?;
                Ok(UpdateResult::Updated {
                    from: current.build_number,
                    to: build,
                })
            }
            ChainOutcome::Aborted { at_build, reason } => {
                self.events.phase(UpdatePhase::Aborting);
                error!("Update aborted at build {}: {}", at_build, reason);

                self.events.phase(UpdatePhase::RollingBack);
                let restored = self.backups.restore(record).await;
                self.events.phase(UpdatePhase::Terminal { success: false });

                match restored {
                    Ok(()) => {
                        info!("Restored build {}", current.build_number);
                        Err(reason)
                    }
                    Err(restore_error) => {
                        error!("Rollback failed: {}", restore_error);
                        Err(restore_error)
                    }
                }
            }
        }
    }

    fn relaunch(&self) -> Result<()> {
        self.events.phase(UpdatePhase::Relaunching);
        let result = self.relauncher.relaunch(&[]);
        self.events.phase(UpdatePhase::Terminal {
            success: result.is_ok(),
        });
        result
    }

    /// Remove transient files an interrupted run may have left behind
    ///
    /// If the artifact itself is gone but a backup survived, the backup is
    /// moved back into place first.
    async fn cleanup_stale_files(&self) {
        for path in [
            self.paths.patch(),
            self.paths.artifact_staging(),
            self.paths.download_staging(),
            self.paths.backup_staging(),
        ] {
            remove_quietly(&path).await;
        }

        let artifact = self.paths.artifact();
        if !fs::try_exists(&artifact).await.unwrap_or(false) {
            let backup = self.paths.backup();
            if fs::try_exists(&backup).await.unwrap_or(false) {
                warn!("Artifact missing, recovering it from {:?}", backup);
                if let Err(e) = fs::rename(&backup, &artifact).await {
                    warn!("Could not recover backup: {}", e);
                }
            }
        }

        if !fs::try_exists(&artifact).await.unwrap_or(false) {
            return;
        }

        let mut entries = match fs::read_dir(self.paths.data_dir()).await {
            Ok(entries) => entries,
            Err(_) => return,
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            if self.paths.is_aside_file(&name.to_string_lossy()) {
                remove_quietly(&entry.path()).await;
            }
        }
    }
}
