//! Progress events emitted by the engine
//!
//! The engine never renders anything itself. Presentation layers hold the
//! receiving end of the channel and draw whatever they like.

use tokio::sync::mpsc;

/// Phases of the forced-update state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    BackingUp,
    PatchingChain,
    Committing,
    Relaunching,
    Aborting,
    RollingBack,
    Terminal { success: bool },
}

/// Something the engine wants a presentation layer to know about
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// Forced-update state transition
    PhaseChanged(UpdatePhase),

    /// A download started; `total` is the advertised length if any
    DownloadStarted { name: String, total: Option<u64> },

    /// Bytes received so far for the current download
    DownloadProgress { downloaded: u64 },

    /// The current download completed
    DownloadFinished { name: String, bytes: u64 },

    /// A patch chain from `from` to `to` is about to run
    ChainStarted { from: u64, to: u64 },

    /// Build `build` was reconstructed from its patch
    PatchApplied { build: u64 },

    /// The installed artifact now reports `build`
    Installed { build: u64 },

    /// Background check failed; never fatal
    BackgroundCheckFailed { message: String },
}

/// Sending half of the progress channel
///
/// A disabled sink drops every event. Sends never fail: a presentation layer
/// that went away must not affect the engine.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<UpdateEvent>>,
}

impl EventSink {
    /// Create a sink and the receiver a subscriber reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UpdateEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A sink with no subscriber
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: UpdateEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn phase(&self, phase: UpdatePhase) {
        self.emit(UpdateEvent::PhaseChanged(phase));
    }
}
