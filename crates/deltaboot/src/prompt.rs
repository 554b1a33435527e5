//! Interactive update confirmation

use async_trait::async_trait;
use deltaboot_update::UpdatePrompt;
use dialoguer::Confirm;
use tracing::debug;

/// Asks on the terminal whether to install pending patches
///
/// Anything other than an explicit yes, including a missing terminal,
/// counts as a decline.
pub struct TerminalPrompt;

pub fn question(pending: u64) -> String {
    if pending == 1 {
        "There is 1 patch available. Update?".to_string()
    } else {
        format!("There are {} patches available. Update?", pending)
    }
}

#[async_trait]
impl UpdatePrompt for TerminalPrompt {
    async fn confirm(&self, pending: u64) -> bool {
        let prompt = question(pending);
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact()
        })
        .await;

        match answer {
            Ok(Ok(accepted)) => accepted,
            Ok(Err(e)) => {
                debug!("Update prompt unavailable: {}", e);
                false
            }
            Err(e) => {
                debug!("Update prompt task failed: {}", e);
                false
            }
        }
    }
}
