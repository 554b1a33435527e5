//! Filesystem helpers shared by the engine

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// Delete a transient file, logging anything other than "already gone"
pub(crate) async fn remove_quietly(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => debug!("Removed {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {:?}: {}", path, e),
    }
}
