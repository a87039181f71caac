//! Concurrent fetch-and-materialize pipeline for emote images.
//!
//! This module turns a catalog selection into files on disk:
//! [`plan`] expands sets × formats × sizes into [`DownloadTarget`]s, the
//! [`DownloadEngine`] fans each pass out under a concurrency limit, and
//! [`ProgressReporter`] carries progress to whatever UI is watching.
//!
//! # Features
//!
//! - Streaming downloads into `<root>/<account>/<set>/<FORMAT><SIZE>/<emote>.<ext>`
//! - Existing files are skipped without a request, so reruns are cheap
//! - Per-target failure isolation with a collected error log
//! - Configurable timeouts (30s connect, 5min total by default)
//! - Cooperative cancellation between dispatches
//!
//! # Example
//!
//! ```no_run
//! use emote_downloader::download::{HttpClient, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let payload = client.get("https://cdn.7tv.app/emote/60ae958e229664e8667aea38/1x.webp").await?;
//! println!("status: {}", payload.status);
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod filename;
mod planner;
mod progress;
mod transport;
mod worker;

pub use client::HttpClient;
pub use constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_OUTPUT_ROOT, MAX_CONCURRENCY, MIN_CONCURRENCY,
    READ_TIMEOUT_SECS,
};
pub use engine::{DownloadEngine, EngineError, PassReport, RunOutcome, default_concurrency};
pub use error::{BoxError, FetchError, TransportError};
pub use planner::{CollectionPlan, DownloadPlan, DownloadTarget, Pass, plan};
pub use progress::{ProgressReporter, ProgressSnapshot};
pub use transport::{BodyStream, Payload, Transport};
pub use worker::{FetchOutcome, fetch_target};
