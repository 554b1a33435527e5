//! Streaming downloads to disk
//!
//! Bodies are streamed chunk by chunk so large artifacts never sit in memory,
//! and progress is reported through the event sink.

use futures_util::StreamExt;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Result, UpdateError};
use crate::events::{EventSink, UpdateEvent};

/// Stream a successful response body into `dest`
///
/// `dest` is truncated first. Returns the number of bytes written.
pub(crate) async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
    name: &str,
    events: &EventSink,
) -> Result<u64> {
    let total = response.content_length();
    events.emit(UpdateEvent::DownloadStarted {
        name: name.to_string(),
        total,
    });

    let mut file = fs::File::create(dest)
        .await
        .map_err(|e| UpdateError::io("creating download file", dest, e))?;

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| UpdateError::network(format!("downloading {}", name), e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| UpdateError::io("writing download file", dest, e))?;
        downloaded += chunk.len() as u64;
        events.emit(UpdateEvent::DownloadProgress { downloaded });
    }

    file.sync_all()
        .await
        .map_err(|e| UpdateError::io("syncing download file", dest, e))?;

    debug!("Downloaded {} ({} bytes) to {:?}", name, downloaded, dest);
    events.emit(UpdateEvent::DownloadFinished {
        name: name.to_string(),
        bytes: downloaded,
    });

    Ok(downloaded)
}

/// Format a byte count for humans
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
