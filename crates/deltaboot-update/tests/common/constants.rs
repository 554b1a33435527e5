//! Shared test constants

/// Artifact base name
pub const ARTIFACT_NAME: &str = "app";

/// Distribution this launcher is built for
pub const DISTRIBUTION: &str = "1.2.0";

/// Published file name for our distribution
pub const ARTIFACT_FILE: &str = "app-1.2.0.jar";

/// Published file name of a newer, incompatible distribution
pub const FOREIGN_ARTIFACT_FILE: &str = "app-2.0.0.jar";

/// Entry point written into test manifests
pub const ENTRY_POINT: &str = "app.Main";

/// Job path on the mock CI server
pub const JOB_PATH: &str = "/job/app";

/// Build installed at the start of most scenarios
pub const INSTALLED_BUILD: u64 = 100;
