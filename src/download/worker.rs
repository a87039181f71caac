//! Fetches one target and writes it to its destination path.
//!
//! Existence of the destination file is the only dedup check; content is never
//! compared. A file that fails part-way is removed so the next run refetches
//! it instead of skipping a truncated image.

use std::path::Path;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::FetchError;
use super::planner::DownloadTarget;
use super::transport::{BodyStream, Transport};

/// Result of fetching one target.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The destination already existed; nothing was requested.
    Skipped,
    /// The file was downloaded and fully written.
    Written {
        /// Bytes written to disk.
        bytes: u64,
        /// Time from start of the attempt to the flushed file.
        elapsed: Duration,
    },
    /// The target could not be materialized.
    Failed(FetchError),
}

impl FetchOutcome {
    /// Returns true for [`FetchOutcome::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Runs the skip, GET, mkdir, create, stream sequence for one target.
///
/// Never returns early with an error: every exit is a [`FetchOutcome`].
#[instrument(skip(transport, target), fields(emote = %target.emote_name, path = %target.destination.display()))]
pub async fn fetch_target(transport: &dyn Transport, target: &DownloadTarget) -> FetchOutcome {
    let started = Instant::now();

    if tokio::fs::metadata(&target.destination).await.is_ok() {
        debug!("destination exists; skipping");
        return FetchOutcome::Skipped;
    }

    let payload = match transport.get(&target.url).await {
        Ok(payload) => payload,
        Err(e) => return FetchOutcome::Failed(FetchError::network(&target.emote_name, e)),
    };

    if !payload.status.is_success() {
        return FetchOutcome::Failed(FetchError::http_status(
            &target.emote_name,
            payload.status,
        ));
    }

    let dir = target.directory();
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        return FetchOutcome::Failed(FetchError::create_dir(dir, &target.emote_name, e));
    }

    let file = match File::create(&target.destination).await {
        Ok(file) => file,
        Err(e) => return FetchOutcome::Failed(FetchError::create_file(target.file_name(), e)),
    };

    match stream_to_file(file, payload.body).await {
        Ok(bytes) => {
            let elapsed = started.elapsed();
            debug!(bytes, elapsed_ms = elapsed.as_millis(), "emote written");
            FetchOutcome::Written { bytes, elapsed }
        }
        Err(e) => {
            remove_partial(&target.destination).await;
            FetchOutcome::Failed(FetchError::write_file(target.file_name(), e))
        }
    }
}

/// Streams the body into `file`, returning bytes written.
async fn stream_to_file(file: File, mut body: BodyStream) -> std::io::Result<u64> {
    let mut writer = BufWriter::new(file);
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await?;
    Ok(bytes_written)
}

async fn remove_partial(path: &Path) {
    debug!(path = %path.display(), "cleaning up partial file after error");
    let _ = tokio::fs::remove_file(path).await;
}
