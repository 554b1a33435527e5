//! Pre-chain backup and rollback
//!
//! One backup slot per artifact. A [`BackupRecord`] holds the slot from
//! `begin_backup` until it is committed or restored; dropping a record without
//! resolving it releases the slot but leaves the backup file on disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, UpdateError};
use crate::utils::remove_quietly;

/// Active snapshot of the artifact taken before a chain starts
#[derive(Debug)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub build_number_at_backup: u64,
    slot: Arc<AtomicBool>,
}

impl Drop for BackupRecord {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::SeqCst);
    }
}

/// Creates, commits and restores the artifact backup
#[derive(Debug)]
pub struct BackupManager {
    backup_path: PathBuf,
    active: Arc<AtomicBool>,
}

impl BackupManager {
    pub fn new(backup_path: impl Into<PathBuf>) -> Self {
        Self {
            backup_path: backup_path.into(),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a record is currently outstanding
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Snapshot `artifact_path` (currently at `build`) into the backup slot
    ///
    /// A stale backup left by an earlier run is cleared first. The copy is
    /// staged next to the backup and renamed into place.
    pub async fn begin_backup(&self, artifact_path: &Path, build: u64) -> Result<BackupRecord> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(UpdateError::BackupActive {
                path: self.backup_path.clone(),
            });
        }

        match self.write_backup(artifact_path).await {
            Ok(()) => {
                info!(
                    "Backed up build {} to {:?}",
                    build, self.backup_path
                );
                Ok(BackupRecord {
                    original_path: artifact_path.to_path_buf(),
                    backup_path: self.backup_path.clone(),
                    build_number_at_backup: build,
                    slot: Arc::clone(&self.active),
                })
            }
            Err(e) => {
                self.active.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn write_backup(&self, artifact_path: &Path) -> Result<()> {
        let metadata = fs::metadata(artifact_path)
            .await
            .map_err(|e| UpdateError::io("reading the artifact", artifact_path, e))?;
        if !metadata.is_file() {
            return Err(UpdateError::io(
                "reading the artifact",
                artifact_path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        if fs::try_exists(&self.backup_path).await.unwrap_or(false) {
            warn!("Clearing stale backup {:?}", self.backup_path);
            fs::remove_file(&self.backup_path)
                .await
                .map_err(|e| UpdateError::io("clearing the old backup", &self.backup_path, e))?;
        }

        let staging = staging_path(&self.backup_path);
        if let Err(e) = fs::copy(artifact_path, &staging).await {
            remove_quietly(&staging).await;
            return Err(UpdateError::io("copying the artifact to the backup", &staging, e));
        }

        fs::rename(&staging, &self.backup_path)
            .await
            .map_err(|e| UpdateError::io("finalizing the backup", &self.backup_path, e))
    }

    /// Make the chain's changes permanent by deleting the backup
    pub async fn commit(&self, record: BackupRecord) -> Result<()> {
        debug!("Committing backup {:?}", record.backup_path);
        match fs::remove_file(&record.backup_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UpdateError::io("deleting the backup", &record.backup_path, e)),
        }
    }

    /// Put the backed-up bytes back at the original path, then delete the backup
    ///
    /// The copy is staged beside the artifact and renamed over it, so the
    /// artifact is never half written. A failure here is irrecoverable.
    pub async fn restore(&self, record: BackupRecord) -> Result<()> {
        warn!(
            "Restoring build {} from {:?}",
            record.build_number_at_backup, record.backup_path
        );

        let staging = staging_path(&record.original_path);
        if let Err(e) = fs::copy(&record.backup_path, &staging).await {
            remove_quietly(&staging).await;
            return Err(UpdateError::irrecoverable(
                "copying the backup",
                &record.backup_path,
                e,
            ));
        }

        fs::rename(&staging, &record.original_path)
            .await
            .map_err(|e| UpdateError::irrecoverable("restoring the artifact", &record.original_path, e))?;

        if let Err(e) = fs::remove_file(&record.backup_path).await {
            warn!("Restored artifact but could not delete backup {:?}: {}", record.backup_path, e);
        }

        Ok(())
    }
}

/// Sibling path used for staged writes (`<file>.partial`)
pub(crate) fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        artifact: PathBuf,
        manager: BackupManager,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("app-1.0.jar");
        std::fs::write(&artifact, b"build 100").unwrap();
        let manager = BackupManager::new(temp.path().join("app.jar.bak"));
        Fixture {
            _temp: temp,
            artifact,
            manager,
        }
    }

    #[tokio::test]
    async fn test_backup_then_commit_deletes_backup() {
        let f = fixture();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        let backup = record.backup_path.clone();
        assert_eq!(std::fs::read(&backup).unwrap(), b"build 100");
        assert!(f.manager.is_active());

        f.manager.commit(record).await.unwrap();
        assert!(!backup.exists());
        assert!(!f.manager.is_active());
    }

    #[tokio::test]
    async fn test_restore_brings_back_original_bytes() {
        let f = fixture();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        let backup = record.backup_path.clone();

        std::fs::write(&f.artifact, b"half-patched").unwrap();
        f.manager.restore(record).await.unwrap();

        assert_eq!(std::fs::read(&f.artifact).unwrap(), b"build 100");
        assert!(!backup.exists());
        assert!(!staging_path(&f.artifact).exists());
    }

    #[tokio::test]
    async fn test_restore_when_artifact_is_missing() {
        let f = fixture();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        std::fs::remove_file(&f.artifact).unwrap();

        f.manager.restore(record).await.unwrap();
        assert_eq!(std::fs::read(&f.artifact).unwrap(), b"build 100");
    }

    #[tokio::test]
    async fn test_second_backup_is_refused_while_active() {
        let f = fixture();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        let err = f.manager.begin_backup(&f.artifact, 100).await.unwrap_err();
        assert!(matches!(err, UpdateError::BackupActive { .. }));

        drop(record);
        assert!(f.manager.begin_backup(&f.artifact, 100).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_artifact_is_io_error() {
        let f = fixture();
        std::fs::remove_file(&f.artifact).unwrap();
        let err = f.manager.begin_backup(&f.artifact, 100).await.unwrap_err();
        assert!(matches!(err, UpdateError::Io { .. }));
        assert!(!f.manager.is_active());
    }

    #[tokio::test]
    async fn test_stale_backup_is_replaced() {
        let f = fixture();
        std::fs::write(&f.manager.backup_path, b"stale").unwrap();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        assert_eq!(std::fs::read(&record.backup_path).unwrap(), b"build 100");
    }

    #[tokio::test]
    async fn test_restore_fails_irrecoverably_without_backup() {
        let f = fixture();
        let record = f.manager.begin_backup(&f.artifact, 100).await.unwrap();
        std::fs::remove_file(&record.backup_path).unwrap();

        let err = f.manager.restore(record).await.unwrap_err();
        assert!(err.is_critical());
    }

    #[test]
    fn test_staging_path() {
        assert_eq!(
            staging_path(Path::new("/d/app-1.0.jar")),
            PathBuf::from("/d/app-1.0.jar.partial")
        );
    }
}
