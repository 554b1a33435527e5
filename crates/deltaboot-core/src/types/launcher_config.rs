//! Launcher configuration types
//!
//! These types describe where the remote build server lives, how the
//! installed artifact is named, and the operational limits applied to the
//! update engine (timeouts, codec program, launch command).

use serde::{Deserialize, Serialize};

/// Distribution this launcher was built for.
///
/// Remote artifacts published under a different distribution cannot be
/// patched by this launcher.
pub const DEFAULT_DISTRIBUTION: &str = env!("CARGO_PKG_VERSION");

/// Complete launcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LauncherConfig {
    /// Remote build server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Installed artifact naming
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Update behaviour
    #[serde(default)]
    pub update: UpdateConfig,

    /// Artifact launch command
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// Remote build server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Job URL on the build server, e.g. `https://ci.example.org/job/app`
    #[serde(default)]
    pub job_url: Option<String>,

    /// Directory under each build's `artifact/` path holding published files
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            job_url: None,
            artifact_dir: default_artifact_dir(),
        }
    }
}

/// Installed artifact naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactConfig {
    /// Base name of the artifact (`<name>-<distribution>.jar`)
    #[serde(default = "default_artifact_name")]
    pub name: String,

    /// Distribution the installed artifact must belong to
    #[serde(default = "default_distribution")]
    pub distribution: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            name: default_artifact_name(),
            distribution: default_distribution(),
        }
    }
}

impl ArtifactConfig {
    /// File name of the installed artifact
    pub fn file_name(&self) -> String {
        format!("{}-{}.jar", self.name, self.distribution)
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Timeout for catalog queries in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Timeout for patch and baseline downloads in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Update behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateConfig {
    /// Run the background update check after launching
    #[serde(default = "default_true")]
    pub background_check: bool,

    /// Delta decoder program
    #[serde(default = "default_codec_program")]
    pub codec_program: String,

    /// Arguments for the decoder. `{base}`, `{patch}` and `{output}` are substituted.
    #[serde(default = "default_codec_args")]
    pub codec_args: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            background_check: true,
            codec_program: default_codec_program(),
            codec_args: default_codec_args(),
        }
    }
}

/// Artifact launch command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LaunchConfig {
    /// Java executable used to run the artifact
    #[serde(default = "default_java")]
    pub java: String,

    /// Extra JVM options placed before the classpath
    #[serde(default)]
    pub jvm_args: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            java: default_java(),
            jvm_args: Vec::new(),
        }
    }
}

fn default_artifact_dir() -> String {
    "target".to_string()
}
fn default_artifact_name() -> String {
    "app".to_string()
}
fn default_distribution() -> String {
    DEFAULT_DISTRIBUTION.to_string()
}
fn default_http_timeout() -> u64 {
    30
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_user_agent() -> String {
    format!(
        "deltaboot/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
fn default_true() -> bool {
    true
}
fn default_codec_program() -> String {
    "xdelta3".to_string()
}
fn default_codec_args() -> Vec<String> {
    ["-d", "-f", "-s", "{base}", "{patch}", "{output}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_java() -> String {
    "java".to_string()
}
