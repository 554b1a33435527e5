//! Incremental patch engine for the deltaboot launcher
//!
//! Provides:
//! - Installed artifact probing (embedded manifest build number)
//! - Remote build catalog queries and streaming downloads
//! - Sequential patch-chain application through an external delta codec
//! - Single-slot backup with atomic restore
//! - Background update check with user confirmation and relaunch
//! - Progress events for any presentation layer

pub mod backup;
pub mod catalog;
pub mod chain;
pub mod checker;
pub mod codec;
pub mod download;
pub mod error;
pub mod events;
pub mod launch;
pub mod naming;
pub mod probe;
pub mod relaunch;
pub mod updater;
mod utils;

pub use backup::{BackupManager, BackupRecord};
pub use catalog::{BuildStatus, RemoteBuildInfo, RemoteCatalog};
pub use chain::{ChainOutcome, PatchChainApplier, PatchStep};
pub use checker::{BackgroundUpdateChecker, CheckOutcome, FixedAnswer, UpdatePrompt};
pub use codec::{CommandCodec, DeltaCodec};
pub use download::human_readable_size;
pub use error::{Result, UpdateError};
pub use events::{EventSink, UpdateEvent, UpdatePhase};
pub use launch::{ArtifactLauncher, JavaLauncher};
pub use naming::{NamingCheck, NamingChecker};
pub use probe::{probe, InstalledArtifact, ProbeResult};
pub use relaunch::{ProcessRelauncher, Relauncher, FORCE_UPDATE_FLAG};
pub use updater::{InstallResult, UpdateResult, Updater};
