//! Download engine for concurrent emote downloads.
//!
//! This module provides the `DownloadEngine` which drives a [`DownloadPlan`]
//! pass by pass, fanning each pass out to spawned tasks under a semaphore-based
//! concurrency limit.
//!
//! # Overview
//!
//! Collections run in plan order and, inside a collection, passes run in
//! format-major order. Only the targets of one pass are ever in flight at the
//! same time; the next pass starts after every task of the previous one has
//! been awaited.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use emote_downloader::catalog::ImageFormat;
//! use emote_downloader::download::{DownloadEngine, HttpClient, ProgressReporter, plan};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sets = Vec::new();
//! let plan = plan(Path::new("emotes"), "alice", &sets, &[ImageFormat::Webp], &["4x".parse()?]);
//! let engine = DownloadEngine::new(8, Arc::new(HttpClient::new()?))?;
//! let progress = Arc::new(ProgressReporter::new());
//! let outcome = engine.run(&plan, &progress, &CancellationToken::new()).await;
//! println!("{}", outcome.summary());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::planner::{DownloadPlan, Pass};
use super::progress::ProgressReporter;
use super::transport::Transport;
use super::worker::{FetchOutcome, fetch_target};
use super::FetchError;

/// Error type for download engine construction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },
}

/// One worker per available processing unit, clamped to the valid range.
#[must_use]
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map_or(MIN_CONCURRENCY, std::num::NonZeroUsize::get)
        .clamp(MIN_CONCURRENCY, MAX_CONCURRENCY)
}

/// Counts and failures of one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Targets downloaded and written.
    pub written: usize,
    /// Targets whose destination already existed.
    pub skipped: usize,
    /// Targets that failed.
    pub failed: usize,
    /// Targets never dispatched because the run was cancelled.
    pub not_dispatched: usize,
    /// Failure messages in the order the engine collected them.
    pub errors: Vec<String>,
}

impl PassReport {
    fn tally(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Written { .. } => self.written += 1,
            FetchOutcome::Failed(error) => {
                self.failed += 1;
                self.errors.push(error.to_string());
            }
        }
    }
}

/// Terminal result of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Account the emotes were downloaded from.
    pub account: String,
    /// Files written during the run.
    pub written: usize,
    /// Targets skipped because they already existed.
    pub skipped: usize,
    /// Targets that failed.
    pub failed: usize,
    /// Set if the run was cancelled before every target was dispatched.
    pub cancelled: bool,
    /// Targets never attempted because of cancellation.
    pub not_dispatched: usize,
    /// Every failure message of the run.
    pub errors: Vec<String>,
}

impl RunOutcome {
    fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            ..Self::default()
        }
    }

    fn absorb(&mut self, report: PassReport) {
        self.written += report.written;
        self.skipped += report.skipped;
        self.failed += report.failed;
        self.not_dispatched += report.not_dispatched;
        self.errors.extend(report.errors);
    }

    /// Returns true if any target failed.
    #[must_use]
    pub fn had_failures(&self) -> bool {
        self.failed > 0
    }

    fn progress_line(&self) -> String {
        format!(
            "Successfully downloaded {} emotes from {}.",
            self.written, self.account
        )
    }

    /// Aggregate message shown when the run finishes.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = self.progress_line();
        if self.had_failures() {
            summary.push_str(
                "\n\nSome emotes couldn't be downloaded. Check the error log for details.",
            );
        }
        if self.cancelled {
            summary.push_str(&format!(
                "\n\nDownload cancelled; {} emotes were not attempted.",
                self.not_dispatched
            ));
        }
        summary
    }
}

/// Download engine for concurrent emote downloads.
///
/// # Concurrency Model
///
/// - Each target runs in its own Tokio task
/// - A semaphore permit is acquired before spawning each task
/// - Permits are released when the task completes (RAII)
/// - A failed target never cancels its siblings
///
/// # Cancellation
///
/// The token is checked before every dispatch and while waiting for a permit.
/// Targets already in flight run to completion and are recorded.
pub struct DownloadEngine {
    /// Issues the GET for every target.
    transport: Arc<dyn Transport>,
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured concurrency limit.
    concurrency: usize,
}

impl std::fmt::Debug for DownloadEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEngine")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl DownloadEngine {
    /// Creates a new download engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug", skip(transport))]
    pub fn new(concurrency: usize, transport: Arc<dyn Transport>) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download engine");

        Ok(Self {
            transport,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs every pass of `plan` and marks `progress` finished.
    ///
    /// Per-target failures are recorded, never returned; this only yields
    /// the aggregate outcome.
    #[instrument(skip_all, fields(account = %plan.account, targets = plan.total_targets()))]
    pub async fn run(
        &self,
        plan: &DownloadPlan,
        progress: &Arc<ProgressReporter>,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        progress.reset();
        let mut outcome = RunOutcome::new(&plan.account);

        info!("starting download run");

        for collection in &plan.collections {
            if cancel.is_cancelled() {
                outcome.not_dispatched += collection.passes.iter().map(Pass::len).sum::<usize>();
                continue;
            }

            if let Err(e) = tokio::fs::create_dir_all(&collection.directory).await {
                warn!(
                    set = %collection.name,
                    dir = %collection.directory.display(),
                    error = %e,
                    "failed to create set directory"
                );
                progress.set_header(format!(
                    "Failed to create directory for emote set: {}\n Error: {e}",
                    collection.name
                ));
            }

            for pass in &collection.passes {
                if pass.is_empty() {
                    debug!(set = %collection.name, format = %pass.format, size = %pass.size, "skipping empty pass");
                    continue;
                }
                if cancel.is_cancelled() {
                    outcome.not_dispatched += pass.len();
                    continue;
                }

                let report = self.run_pass(pass, progress, cancel).await;
                outcome.absorb(report);
                progress.set_last_event(outcome.progress_line());
            }
        }

        outcome.cancelled = cancel.is_cancelled() && outcome.not_dispatched > 0;

        info!(
            written = outcome.written,
            skipped = outcome.skipped,
            failed = outcome.failed,
            not_dispatched = outcome.not_dispatched,
            "download run complete"
        );

        progress.mark_finished(outcome.summary());
        outcome
    }

    /// Downloads every target of one pass and waits for all of them.
    ///
    /// An empty pass returns an empty report without touching `progress`.
    #[instrument(skip_all, fields(set = %pass.collection, format = %pass.format, size = %pass.size))]
    pub async fn run_pass(
        &self,
        pass: &Pass,
        progress: &Arc<ProgressReporter>,
        cancel: &CancellationToken,
    ) -> PassReport {
        let mut report = PassReport::default();
        let Some(increment) = pass.increment() else {
            return report;
        };

        progress.begin_pass(pass.header());
        let mut handles = Vec::with_capacity(pass.len());

        for (index, target) in pass.targets.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    report.not_dispatched = pass.len() - index;
                    info!(remaining = report.not_dispatched, "cancelled; not dispatching remaining targets");
                    break;
                }
                permit = Arc::clone(&self.semaphore).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => {
                        report.not_dispatched = pass.len() - index;
                        warn!("semaphore closed unexpectedly");
                        break;
                    }
                },
            };

            let transport = Arc::clone(&self.transport);
            let progress = Arc::clone(progress);
            let target = target.clone();

            handles.push((
                index,
                tokio::spawn(async move {
                    // Permit is dropped when this block exits (RAII)
                    let _permit = permit;
                    let outcome = fetch_target(transport.as_ref(), &target).await;
                    progress.record(&target, &outcome, increment);
                    outcome
                }),
            ));
        }

        debug!(task_count = handles.len(), "waiting for downloads to complete");

        for (index, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    let target = &pass.targets[index];
                    warn!(emote = %target.emote_name, error = %e, "download task panicked");
                    let outcome = FetchOutcome::Failed(FetchError::task_panicked(&target.emote_name));
                    progress.record(target, &outcome, increment);
                    outcome
                }
            };
            if let FetchOutcome::Failed(error) = &outcome {
                debug!(error = %error, "target failed");
            }
            report.tally(&outcome);
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::download::TransportError;
    use crate::download::transport::Payload;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn get(&self, url: &str) -> Result<Payload, TransportError> {
            Err(TransportError::network(url, "unreachable"))
        }
    }

    fn transport() -> Arc<dyn Transport> {
        Arc::new(Unreachable)
    }

    #[test]
    fn test_engine_new_valid_concurrency() {
        let engine = DownloadEngine::new(1, transport()).unwrap();
        assert_eq!(engine.concurrency(), 1);

        let engine = DownloadEngine::new(100, transport()).unwrap();
        assert_eq!(engine.concurrency(), 100);
    }

    #[test]
    fn test_engine_new_invalid_concurrency_zero() {
        let result = DownloadEngine::new(0, transport());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_engine_new_invalid_concurrency_too_high() {
        let result = DownloadEngine::new(101, transport());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_engine_error_display() {
        let msg = EngineError::InvalidConcurrency { value: 0 }.to_string();
        assert_eq!(msg, "invalid concurrency value 0: must be between 1 and 100");
    }

    #[test]
    fn test_default_concurrency_in_range() {
        let value = default_concurrency();
        assert!((MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&value));
    }

    #[test]
    fn test_summary_clean_run() {
        let outcome = RunOutcome {
            written: 3,
            ..RunOutcome::new("alice")
        };
        assert!(!outcome.had_failures());
        assert_eq!(outcome.summary(), "Successfully downloaded 3 emotes from alice.");
    }

    #[test]
    fn test_summary_with_failures_points_to_log() {
        let outcome = RunOutcome {
            written: 2,
            failed: 1,
            errors: vec!["failed to get emote Pog".to_string()],
            ..RunOutcome::new("alice")
        };
        assert!(outcome.had_failures());
        assert_eq!(
            outcome.summary(),
            "Successfully downloaded 2 emotes from alice.\n\nSome emotes couldn't be downloaded. Check the error log for details."
        );
    }

    #[test]
    fn test_summary_mentions_cancellation() {
        let outcome = RunOutcome {
            cancelled: true,
            not_dispatched: 4,
            ..RunOutcome::new("alice")
        };
        assert!(outcome.summary().ends_with("Download cancelled; 4 emotes were not attempted."));
    }

    #[test]
    fn test_pass_report_tally() {
        let mut report = PassReport::default();
        report.tally(&FetchOutcome::Skipped);
        report.tally(&FetchOutcome::Written {
            bytes: 1,
            elapsed: std::time::Duration::ZERO,
        });
        report.tally(&FetchOutcome::Failed(FetchError::task_panicked("Pog")));

        assert_eq!((report.skipped, report.written, report.failed), (1, 1, 1));
        assert_eq!(report.errors, ["download task for emote Pog panicked"]);
    }

    #[tokio::test]
    async fn test_run_empty_plan_finishes() {
        let engine = DownloadEngine::new(2, transport()).unwrap();
        let progress = Arc::new(ProgressReporter::new());
        let plan = DownloadPlan {
            account: "alice".to_string(),
            root: std::path::PathBuf::from("unused"),
            collections: Vec::new(),
        };

        let outcome = engine.run(&plan, &progress, &CancellationToken::new()).await;

        assert_eq!(outcome.written, 0);
        assert!(!outcome.cancelled);
        let snap = progress.snapshot();
        assert!(snap.finished);
        assert_eq!(snap.last_event, "Successfully downloaded 0 emotes from alice.");
    }
}
