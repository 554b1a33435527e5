//! Mock CI server helpers
//!
//! Endpoints mirror a build server job mounted at `JOB_PATH`.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::artifacts::artifact_bytes;
use super::constants::*;

/// Serve `build` as the latest stable build number
pub async fn mock_latest_stable(server: &MockServer, build: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{}/lastStableBuild/buildNumber", JOB_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("{}\n", build)))
        .mount(server)
        .await;
}

/// Answer the latest stable query with `status`
pub async fn mock_latest_stable_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}/lastStableBuild/buildNumber", JOB_PATH)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Answer the latest stable query after `delay`
pub async fn mock_latest_stable_delayed(server: &MockServer, build: u64, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("{}/lastStableBuild/buildNumber", JOB_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(build.to_string())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// Serve a build status document
pub async fn mock_build_status(server: &MockServer, build: u64, result: &str, files: &[&str]) {
    let artifacts: Vec<_> = files.iter().map(|f| json!({ "fileName": f })).collect();
    Mock::given(method("GET"))
        .and(path(format!("{}/{}/api/json", JOB_PATH, build)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": result,
            "artifacts": artifacts,
        })))
        .mount(server)
        .await;
}

/// Answer the status query for `build` with `status` and no body
pub async fn mock_build_status_code(server: &MockServer, build: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}/api/json", JOB_PATH, build)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve raw bytes as the patch for `build`
pub async fn mock_patch(server: &MockServer, build: u64, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}/artifact/target/delta.patch", JOB_PATH, build)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Answer the patch download for `build` with `status`
pub async fn mock_patch_status(server: &MockServer, build: u64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("{}/{}/artifact/target/delta.patch", JOB_PATH, build)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Publish a successful, compatible build whose patch yields that build
///
/// Works with [`WholeArtifactCodec`](super::fakes::WholeArtifactCodec).
pub async fn mock_good_build(server: &MockServer, build: u64) {
    mock_build_status(server, build, "SUCCESS", &[ARTIFACT_FILE, "delta.patch"]).await;
    mock_patch(server, build, artifact_bytes(build)).await;
}

/// Publish a chain of good builds from `first` to `last` inclusive
pub async fn mock_good_chain(server: &MockServer, first: u64, last: u64) {
    for build in first..=last {
        mock_good_build(server, build).await;
    }
}

/// Serve the baseline artifact
pub async fn mock_baseline(server: &MockServer, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!(
            "{}/lastSuccessfulBuild/artifact/target/{}",
            JOB_PATH, ARTIFACT_FILE
        )))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Answer the baseline download with `status`
pub async fn mock_baseline_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!(
            "{}/lastSuccessfulBuild/artifact/target/{}",
            JOB_PATH, ARTIFACT_FILE
        )))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Paths of every request the server has seen, in order
pub async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}
