//! Background update check
//!
//! Runs next to the launched artifact. It asks the catalog once for the
//! latest stable build and, when the user agrees, hands the update to a new
//! launcher process in forced-update mode. It never touches the artifact.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::RemoteCatalog;
use crate::error::UpdateError;
use crate::events::{EventSink, UpdateEvent};
use crate::relaunch::{Relauncher, FORCE_UPDATE_FLAG};

/// Asks the user whether to install pending builds
#[async_trait]
pub trait UpdatePrompt: Send + Sync {
    /// `pending` is the number of builds between installed and latest
    async fn confirm(&self, pending: u64) -> bool;
}

/// Prompt that always answers the same way
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl UpdatePrompt for FixedAnswer {
    async fn confirm(&self, _pending: u64) -> bool {
        self.0
    }
}

/// How a background check ended
#[derive(Debug)]
pub enum CheckOutcome {
    UpToDate,
    Declined { latest: u64 },
    /// A forced-update launcher was started; the caller should exit with 0
    Relaunched { latest: u64 },
    /// The catalog query failed; already reported through events
    CheckFailed,
    /// The user accepted but the new process could not be started
    RelaunchFailed(UpdateError),
}

/// One-shot update check against the installed build
pub struct BackgroundUpdateChecker {
    catalog: Arc<RemoteCatalog>,
    current_build: u64,
    prompt: Arc<dyn UpdatePrompt>,
    relauncher: Arc<dyn Relauncher>,
    events: EventSink,
}

impl BackgroundUpdateChecker {
    pub fn new(
        catalog: Arc<RemoteCatalog>,
        current_build: u64,
        prompt: Arc<dyn UpdatePrompt>,
        relauncher: Arc<dyn Relauncher>,
    ) -> Self {
        Self {
            catalog,
            current_build,
            prompt,
            relauncher,
            events: EventSink::disabled(),
        }
    }

    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Run the check on its own task
    pub fn spawn(self) -> JoinHandle<CheckOutcome> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) -> CheckOutcome {
        let latest = match self.catalog.latest_stable().await {
            Ok(latest) => latest,
            Err(e) => {
                warn!("Background update check failed: {}", e);
                self.events.emit(UpdateEvent::BackgroundCheckFailed {
                    message: e.to_string(),
                });
                return CheckOutcome::CheckFailed;
            }
        };

        if latest <= self.current_build {
            debug!("Build {} is current (latest stable {})", self.current_build, latest);
            return CheckOutcome::UpToDate;
        }

        let pending = latest - self.current_build;
        info!("{} new build(s) available ({} -> {})", pending, self.current_build, latest);

        if !self.prompt.confirm(pending).await {
            debug!("Update to {} declined", latest);
            return CheckOutcome::Declined { latest };
        }

        match self.relauncher.relaunch(&[FORCE_UPDATE_FLAG.to_string()]) {
            Ok(()) => CheckOutcome::Relaunched { latest },
            Err(e) => CheckOutcome::RelaunchFailed(e),
        }
    }
}
