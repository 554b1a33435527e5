//! Temporary launcher environment wired to a mock CI server

use deltaboot_core::types::{ArtifactConfig, LauncherConfig};
use deltaboot_core::LauncherPaths;
use deltaboot_update::{
    BackupManager, DeltaCodec, EventSink, NamingChecker, Relauncher, RemoteCatalog, Updater,
};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

use super::artifacts::write_artifact;
use super::constants::*;

/// A data directory plus a mock server, torn down on drop
pub struct TestEnv {
    pub temp: TempDir,
    pub server: MockServer,
    pub config: LauncherConfig,
    pub paths: LauncherPaths,
    /// Shared by every updater built from this environment
    pub backups: Arc<BackupManager>,
}

impl TestEnv {
    /// Start a mock server and an empty data directory
    pub async fn start() -> Self {
        let temp = TempDir::new().unwrap();
        let server = MockServer::start().await;

        let mut config = LauncherConfig::default();
        config.artifact = ArtifactConfig {
            name: ARTIFACT_NAME.to_string(),
            distribution: DISTRIBUTION.to_string(),
        };
        config.server.job_url = Some(format!("{}{}", server.uri(), JOB_PATH));
        config.network.http_timeout_secs = 2;
        config.network.download_timeout_secs = 5;

        let paths = LauncherPaths::new(temp.path(), &config.artifact);
        let backups = Arc::new(BackupManager::new(paths.backup()));

        Self {
            temp,
            server,
            config,
            paths,
            backups,
        }
    }

    /// Start with an artifact at `build` already installed
    pub async fn with_installed(build: u64) -> Self {
        let env = Self::start().await;
        write_artifact(&env.paths.artifact(), build);
        env
    }

    pub fn job_url(&self) -> String {
        self.config.server.job_url.clone().unwrap()
    }

    pub fn catalog(&self) -> RemoteCatalog {
        RemoteCatalog::new(&self.job_url(), &self.config).unwrap()
    }

    pub fn naming(&self) -> NamingChecker {
        NamingChecker::new(&self.config.artifact)
    }

    pub fn updater(
        &self,
        codec: Arc<dyn DeltaCodec>,
        relauncher: Arc<dyn Relauncher>,
        events: EventSink,
    ) -> Updater {
        Updater::new(
            self.paths.clone(),
            Arc::new(self.catalog().with_events(events.clone())),
            codec,
            self.naming(),
            self.backups.clone(),
            relauncher,
        )
        .with_events(events)
    }

    /// Current bytes of the installed artifact
    pub fn artifact_bytes(&self) -> Vec<u8> {
        std::fs::read(self.paths.artifact()).unwrap()
    }

    /// File names currently in the data directory, sorted
    pub fn data_dir_listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.paths.data_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
