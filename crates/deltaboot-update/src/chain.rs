//! Sequential patch-chain application
//!
//! Walks from the installed build to a target build one build number at a
//! time. Each step:
//! 1. Confirms the remote build succeeded
//! 2. Checks its produced files still belong to our distribution
//! 3. Downloads `delta.patch`
//! 4. Moves the artifact aside and decodes the patch into a staging file
//! 5. Renames the staging file over the canonical artifact path
//! 6. Re-probes the artifact and checks it reports the step's build
//!
//! The applier never restores the backup itself; the caller owns the
//! [`BackupRecord`](crate::backup::BackupRecord) and restores on abort.

use deltaboot_core::LauncherPaths;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::catalog::{BuildStatus, RemoteCatalog};
use crate::codec::DeltaCodec;
use crate::error::UpdateError;
use crate::events::{EventSink, UpdateEvent};
use crate::naming::NamingChecker;
use crate::probe::{probe, ProbeResult};
use crate::utils::remove_quietly;

/// Result of a chain run
#[derive(Debug)]
pub enum ChainOutcome {
    /// The artifact now reports this build
    FinalBuild(u64),

    /// The chain stopped while producing `at_build`
    Aborted { at_build: u64, reason: UpdateError },
}

/// One patch application, alive for a single iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStep {
    pub from_build: u64,
    pub to_build: u64,
}

/// Applies incremental patches in strict ascending order
pub struct PatchChainApplier<'a> {
    catalog: &'a RemoteCatalog,
    codec: &'a dyn DeltaCodec,
    naming: &'a NamingChecker,
    paths: &'a LauncherPaths,
    events: EventSink,
}

impl<'a> PatchChainApplier<'a> {
    pub fn new(
        catalog: &'a RemoteCatalog,
        codec: &'a dyn DeltaCodec,
        naming: &'a NamingChecker,
        paths: &'a LauncherPaths,
    ) -> Self {
        Self {
            catalog,
            codec,
            naming,
            paths,
            events: EventSink::disabled(),
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Bring the artifact from `current` to `target`
    ///
    /// Returns `FinalBuild(current)` without touching the network when there
    /// is nothing to do.
    pub async fn apply(&self, current: u64, target: u64) -> ChainOutcome {
        if current >= target {
            debug!("Build {} is already at or past {}", current, target);
            return ChainOutcome::FinalBuild(current);
        }

        info!("Applying patches {} -> {}", current, target);
        self.events.emit(UpdateEvent::ChainStarted {
            from: current,
            to: target,
        });

        let mut effective = current;
        while effective < target {
            let step = PatchStep {
                from_build: effective,
                to_build: effective + 1,
            };

            if let Err(reason) = self.apply_step(&step).await {
                warn!("Patch chain aborted at build {}: {}", step.to_build, reason);
                return ChainOutcome::Aborted {
                    at_build: step.to_build,
                    reason,
                };
            }

            info!("Patched to build {}", step.to_build);
            self.events.emit(UpdateEvent::PatchApplied {
                build: step.to_build,
            });
            effective = step.to_build;
        }

        ChainOutcome::FinalBuild(effective)
    }

    /// Check the artifact on disk reports `expected`
    fn verify(&self, expected: u64) -> Result<(), UpdateError> {
        let artifact = self.paths.artifact();
        let detail = match probe(&artifact) {
            ProbeResult::Valid(installed) if installed.build_number == expected => return Ok(()),
            ProbeResult::Valid(installed) => format!(
                "expected build {} after patching, found {}",
                expected, installed.build_number
            ),
            ProbeResult::Corrupt { reason } => format!("corrupt after patching: {}", reason),
            ProbeResult::Absent => "missing after patching".to_string(),
        };

        Err(UpdateError::InvalidArtifact {
            path: artifact,
            detail,
        })
    }

    async fn apply_step(&self, step: &PatchStep) -> Result<(), UpdateError> {
        let build = step.to_build;

        let info = self
            .catalog
            .status_of(build)
            .await
            .map_err(|e| UpdateError::build_unavailable(build, e.to_string()))?;

        if info.status != BuildStatus::Success {
            return Err(UpdateError::build_unavailable(
                build,
                format!("build status is {:?}", info.status),
            ));
        }

        let naming = self.naming.check(&info.artifact_names);
        if !naming.compatible {
            return Err(UpdateError::launcher_out_of_date(format!(
                "build {} publishes {}",
                build,
                naming.incompatible_names.join(", ")
            )));
        }

        let patch = self.paths.patch();
        if let Err(e) = self.catalog.fetch_patch(build, &patch).await {
            remove_quietly(&patch).await;
            return Err(e);
        }

        let result = self.recompose(step, &patch).await;
        remove_quietly(&patch).await;
        result?;

        self.verify(build)
    }

    /// Move the artifact aside and decode the patch into its place
    async fn recompose(&self, step: &PatchStep, patch: &Path) -> Result<(), UpdateError> {
        let artifact = self.paths.artifact();
        let aside = self.paths.aside(step.from_build);
        let staging = self.paths.artifact_staging();

        if fs::try_exists(&aside).await.unwrap_or(false) {
            return Err(UpdateError::irrecoverable(
                "moving the artifact aside",
                &aside,
                io::Error::new(io::ErrorKind::AlreadyExists, "target path already occupied"),
            ));
        }

        fs::rename(&artifact, &aside)
            .await
            .map_err(|e| UpdateError::irrecoverable("moving the artifact aside", &artifact, e))?;

        if let Err(detail) = self.codec.decode(&aside, patch, &staging).await {
            remove_quietly(&staging).await;
            if let Err(e) = fs::rename(&aside, &artifact).await {
                warn!("Could not move {:?} back into place: {}", aside, e);
            }
            return Err(UpdateError::PatchRejected {
                build: step.to_build,
                detail,
            });
        }

        if let Err(e) = fs::rename(&staging, &artifact).await {
            remove_quietly(&staging).await;
            if let Err(back) = fs::rename(&aside, &artifact).await {
                warn!("Could not move {:?} back into place: {}", aside, back);
            }
            return Err(UpdateError::irrecoverable("installing the patched artifact", &artifact, e));
        }

        remove_quietly(&aside).await;
        Ok(())
    }
}
