//! Delta codec seam
//!
//! Decoding is delegated to an external implementation. The default one
//! shells out to a VCDIFF decoder such as `xdelta3`.

use async_trait::async_trait;
use deltaboot_core::types::UpdateConfig;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Reconstructs an artifact from a base file and a patch
#[async_trait]
pub trait DeltaCodec: Send + Sync {
    /// Write the decoded artifact to `output`
    ///
    /// Fails on a malformed patch or a base the patch was not made against.
    /// The error string is shown to the user.
    async fn decode(&self, base: &Path, patch: &Path, output: &Path) -> Result<(), String>;
}

/// Runs an external decoder program
///
/// `{base}`, `{patch}` and `{output}` in the argument template are replaced
/// with the corresponding paths.
#[derive(Debug, Clone)]
pub struct CommandCodec {
    program: String,
    args: Vec<String>,
}

impl CommandCodec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &UpdateConfig) -> Self {
        Self::new(config.codec_program.clone(), config.codec_args.clone())
    }

    fn render_args(&self, base: &Path, patch: &Path, output: &Path) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{base}", &base.to_string_lossy())
                    .replace("{patch}", &patch.to_string_lossy())
                    .replace("{output}", &output.to_string_lossy())
            })
            .collect()
    }
}

#[async_trait]
impl DeltaCodec for CommandCodec {
    async fn decode(&self, base: &Path, patch: &Path, output: &Path) -> Result<(), String> {
        let args = self.render_args(base, patch, output);
        debug!("Running {} {:?}", self.program, args);

        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| format!("could not run {}: {}", self.program, e))?;

        if result.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&result.stderr);
            Err(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            ))
        }
    }
}
