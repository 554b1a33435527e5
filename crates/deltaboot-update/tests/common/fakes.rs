//! Fake collaborators
//!
//! These stand in for the external delta codec, the user prompt and the
//! process relauncher so tests can observe every interaction.

use async_trait::async_trait;
use deltaboot_update::{DeltaCodec, Relauncher, Result, UpdateError, UpdatePrompt};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Codec whose patches are simply the complete next artifact
///
/// Records every base it was given so tests can check the chain order.
#[derive(Default)]
pub struct WholeArtifactCodec {
    pub bases: Mutex<Vec<String>>,
}

#[async_trait]
impl DeltaCodec for WholeArtifactCodec {
    async fn decode(&self, base: &Path, patch: &Path, output: &Path) -> std::result::Result<(), String> {
        if !base.exists() {
            return Err(format!("base {} missing", base.display()));
        }
        self.bases
            .lock()
            .unwrap()
            .push(base.file_name().unwrap().to_string_lossy().to_string());
        let bytes = tokio::fs::read(patch).await.map_err(|e| e.to_string())?;
        tokio::fs::write(output, bytes).await.map_err(|e| e.to_string())
    }
}

/// Codec that rejects the patch for one build and passes the rest through
pub struct RejectingCodec {
    pub reject_base_suffix: String,
    pub inner: WholeArtifactCodec,
}

impl RejectingCodec {
    /// Reject the step whose base is the artifact of `from_build`
    pub fn rejecting_from(from_build: u64) -> Self {
        Self {
            reject_base_suffix: format!("-{}.jar.old", from_build),
            inner: WholeArtifactCodec::default(),
        }
    }
}

#[async_trait]
impl DeltaCodec for RejectingCodec {
    async fn decode(&self, base: &Path, patch: &Path, output: &Path) -> std::result::Result<(), String> {
        if base.to_string_lossy().ends_with(&self.reject_base_suffix) {
            // Leave garbage behind like a decoder that died half way
            let _ = tokio::fs::write(output, b"partial").await;
            return Err("checksum mismatch in target window".to_string());
        }
        self.inner.decode(base, patch, output).await
    }
}

/// Prompt that counts how often it was asked
pub struct CountingPrompt {
    pub answer: bool,
    pub calls: AtomicU64,
    pub last_pending: AtomicU64,
}

impl CountingPrompt {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            calls: AtomicU64::new(0),
            last_pending: AtomicU64::new(0),
        }
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpdatePrompt for CountingPrompt {
    async fn confirm(&self, pending: u64) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_pending.store(pending, Ordering::SeqCst);
        self.answer
    }
}

/// Relauncher that records invocations instead of spawning
#[derive(Default)]
pub struct RecordingRelauncher {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub fail: bool,
}

impl RecordingRelauncher {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Relauncher for RecordingRelauncher {
    fn relaunch(&self, extra_args: &[String]) -> Result<()> {
        self.calls.lock().unwrap().push(extra_args.to_vec());
        if self.fail {
            return Err(UpdateError::SpawnFailed {
                program: "deltaboot".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        Ok(())
    }
}
