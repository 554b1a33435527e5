//! Remote build catalog
//!
//! Talks to a CI job exposing the usual build-server endpoints:
//! - `{job}/lastStableBuild/buildNumber` (plain-text integer)
//! - `{job}/{build}/api/json` (build result and produced artifacts)
//! - `{job}/{build}/artifact/{dir}/delta.patch`
//! - `{job}/lastSuccessfulBuild/artifact/{dir}/{name}-{distribution}.jar`
//!
//! Nothing is cached and nothing is retried; every call hits the server once.

use deltaboot_core::types::LauncherConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use crate::download::stream_to_file;
use crate::error::{Result, UpdateError};
use crate::events::EventSink;
use crate::utils::remove_quietly;

/// Published file name of the incremental patch
pub const PATCH_ARTIFACT: &str = "delta.patch";

/// Outcome of a remote build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Failure,
    /// Still running, or the response could not be understood
    Unknown,
}

/// Snapshot of one remote build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteBuildInfo {
    pub build_number: u64,
    pub status: BuildStatus,
    /// Produced file names, in server order
    pub artifact_names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuildJson {
    result: Option<String>,
    #[serde(default)]
    artifacts: Vec<ArtifactJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactJson {
    file_name: String,
}

impl RemoteBuildInfo {
    fn from_body(build_number: u64, body: &str) -> Self {
        match serde_json::from_str::<BuildJson>(body) {
            Ok(json) => {
                let status = match json.result.as_deref() {
                    Some("SUCCESS") => BuildStatus::Success,
                    Some(_) => BuildStatus::Failure,
                    None => BuildStatus::Unknown,
                };
                Self {
                    build_number,
                    status,
                    artifact_names: json.artifacts.into_iter().map(|a| a.file_name).collect(),
                }
            }
            Err(e) => {
                debug!("Malformed status for build {}: {}", build_number, e);
                Self {
                    build_number,
                    status: BuildStatus::Unknown,
                    artifact_names: Vec::new(),
                }
            }
        }
    }
}

/// Client for the remote build catalog
pub struct RemoteCatalog {
    /// Client for small catalog queries
    client: reqwest::Client,

    /// Client for patch and baseline downloads
    download_client: reqwest::Client,

    job_url: String,
    artifact_dir: String,
    baseline_file: String,
    events: EventSink,
}

impl RemoteCatalog {
    /// Create a catalog for `job_url` using the launcher's network settings
    pub fn new(job_url: &str, config: &LauncherConfig) -> Result<Self> {
        let network = &config.network;
        let build_client = |timeout_secs: u64| {
            reqwest::Client::builder()
                .user_agent(&network.user_agent)
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| UpdateError::network("creating HTTP client", e))
        };

        Ok(Self {
            client: build_client(network.http_timeout_secs)?,
            download_client: build_client(network.download_timeout_secs)?,
            job_url: job_url.trim_end_matches('/').to_string(),
            artifact_dir: config.server.artifact_dir.trim_matches('/').to_string(),
            baseline_file: config.artifact.file_name(),
            events: EventSink::disabled(),
        })
    }

    /// Report download progress to `events`
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    /// Latest stable build number
    pub async fn latest_stable(&self) -> Result<u64> {
        let url = format!("{}/lastStableBuild/buildNumber", self.job_url);
        debug!("Fetching latest stable build from: {}", url);
        let context = "fetching the latest stable build";

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::network(context, e))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::network_status(context, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::network(context, e))?;

        body.trim().parse::<u64>().map_err(|_| UpdateError::Network {
            context: context.to_string(),
            message: format!("unexpected response body {:?}", body.trim()),
        })
    }

    /// Status and produced files of `build`
    pub async fn status_of(&self, build: u64) -> Result<RemoteBuildInfo> {
        let url = format!("{}/{}/api/json", self.job_url, build);
        debug!("Fetching status of build {} from: {}", build, url);
        let context = format!("fetching the status of build {}", build);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::network(context.as_str(), e))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::network_status(context, response.status()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdateError::network(context.as_str(), e))?;

        Ok(RemoteBuildInfo::from_body(build, &body))
    }

    /// Download the incremental patch producing `build` into `dest`
    pub async fn fetch_patch(&self, build: u64, dest: &Path) -> Result<u64> {
        let url = format!(
            "{}/{}/artifact/{}/{}",
            self.job_url, build, self.artifact_dir, PATCH_ARTIFACT
        );
        debug!("Fetching patch for build {} from: {}", build, url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::build_unavailable(build, format!("patch request failed: {}", e)))?;

        if response.status() != StatusCode::OK {
            return Err(UpdateError::build_unavailable(
                build,
                format!("patch download returned {}", response.status()),
            ));
        }

        let name = format!("patch for build {}", build);
        stream_to_file(response, dest, &name, &self.events)
            .await
            .map_err(|e| match e {
                UpdateError::Network { message, .. } => UpdateError::build_unavailable(build, message),
                other => other,
            })
    }

    /// Download the full baseline artifact to `dest` via `staging`
    ///
    /// The artifact only appears at `dest` once completely written.
    pub async fn download_baseline(&self, dest: &Path, staging: &Path) -> Result<u64> {
        let url = format!(
            "{}/lastSuccessfulBuild/artifact/{}/{}",
            self.job_url, self.artifact_dir, self.baseline_file
        );
        info!("Downloading {} from {}", self.baseline_file, url);
        let context = format!("downloading {}", self.baseline_file);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpdateError::network(context.as_str(), e))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(UpdateError::launcher_out_of_date(format!(
                    "the server no longer publishes {}",
                    self.baseline_file
                )))
            }
            status => return Err(UpdateError::network_status(context, status)),
        }

        let result = stream_to_file(response, staging, &self.baseline_file, &self.events).await;
        let bytes = match result {
            Ok(0) => Err(UpdateError::Network {
                context,
                message: "server sent an empty artifact".to_string(),
            }),
            other => other,
        };

        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_quietly(staging).await;
                return Err(e);
            }
        };

        fs::rename(staging, dest)
            .await
            .map_err(|e| UpdateError::io("installing the downloaded artifact", dest, e))?;

        Ok(bytes)
    }
}
