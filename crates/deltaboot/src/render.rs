//! Draws engine progress events on the terminal

use deltaboot_update::{human_readable_size, EventSink, UpdateEvent, UpdatePhase};
use indicatif::ProgressBar;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::output;

/// Start rendering events; returns the sink to hand to the engine
///
/// With `quiet` set the sink is disabled and no task is spawned.
pub fn start(quiet: bool) -> (EventSink, Option<JoinHandle<()>>) {
    if quiet {
        return (EventSink::disabled(), None);
    }
    let (sink, rx) = EventSink::channel();
    (sink, Some(tokio::spawn(render(rx))))
}

async fn render(mut rx: UnboundedReceiver<UpdateEvent>) {
    let mut renderer = Renderer::default();
    while let Some(event) = rx.recv().await {
        renderer.handle(event);
    }
    renderer.clear();
}

#[derive(Default)]
struct Renderer {
    bar: Option<ProgressBar>,
}

impl Renderer {
    fn handle(&mut self, event: UpdateEvent) {
        match event {
            UpdateEvent::DownloadStarted { name, total } => {
                self.clear();
                let message = format!("Downloading {}", name);
                self.bar = Some(match total {
                    Some(len) => output::download_bar(len, &message),
                    None => output::spinner(&message),
                });
            }
            UpdateEvent::DownloadProgress { downloaded } => {
                if let Some(bar) = &self.bar {
                    bar.set_position(downloaded);
                }
            }
            UpdateEvent::DownloadFinished { name, bytes } => {
                self.clear();
                debug!("Downloaded {} ({})", name, human_readable_size(bytes));
            }
            UpdateEvent::ChainStarted { from, to } => {
                output::info(&format!(
                    "Applying {} from build {} to {}",
                    pluralize(to.saturating_sub(from), "patch", "patches"),
                    from,
                    to
                ));
            }
            UpdateEvent::PatchApplied { build } => {
                output::success(&format!("Patched to build {}", build));
            }
            UpdateEvent::Installed { build } => {
                self.clear();
                output::success(&format!("Installed build {}", build));
            }
            UpdateEvent::PhaseChanged(phase) => self.phase(phase),
            // The main launch never reports background failures
            UpdateEvent::BackgroundCheckFailed { message } => {
                debug!("Background update check failed: {}", message);
            }
        }
    }

    fn phase(&mut self, phase: UpdatePhase) {
        match phase {
            UpdatePhase::BackingUp => output::info("Backing up the installed artifact"),
            UpdatePhase::Aborting => {
                self.clear();
                output::warning("Update aborted");
            }
            UpdatePhase::RollingBack => output::info("Restoring the previous build"),
            UpdatePhase::Relaunching => output::info("Relaunching"),
            _ => {}
        }
    }

    fn clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// "1 patch" / "3 patches"
pub fn pluralize(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
