//! Shared progress state for a download run.
//!
//! The engine writes through [`ProgressReporter`]; a UI reads
//! [`ProgressSnapshot`]s, either by polling [`ProgressReporter::snapshot`] or
//! by awaiting changes on [`ProgressReporter::subscribe`]. All fields are
//! updated together under the channel's lock, so a reader never sees half of
//! an update.
//!
//! Snapshots carry only the failure count. The full error log lives beside the
//! channel and is read with [`ProgressReporter::errors`], so publishing an
//! event costs the same on the ten-thousandth failure as on the first.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::planner::DownloadTarget;
use super::worker::FetchOutcome;

/// Point-in-time copy of the progress state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSnapshot {
    /// What is being worked on (`Global: GIF 2x (12 emotes)`).
    pub header: String,
    /// Completed fraction of the current pass, in `[0, 1]`.
    pub fraction: f64,
    /// Most recent human-readable event.
    pub last_event: String,
    /// Files written so far in this run.
    pub downloaded: usize,
    /// Failed targets so far in this run.
    pub failed: usize,
    /// Set once the run has produced all of its outcomes.
    pub finished: bool,
}

impl ProgressSnapshot {
    /// Returns true if any target failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.failed > 0
    }
}

/// Progress state held in a `watch` channel, mutated in place.
#[derive(Debug)]
pub struct ProgressReporter {
    changes: watch::Sender<ProgressSnapshot>,
    /// Written only inside `send_modify`, so the log and `failed` change together.
    errors: Mutex<Vec<String>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    /// Creates a reporter with empty state.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = watch::channel(ProgressSnapshot::default());
        Self {
            changes,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Returns a receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.changes.subscribe()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.changes.borrow().clone()
    }

    /// Returns every failure message of this run, in completion order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.lock_errors().clone()
    }

    /// Clears all state for a new run.
    pub fn reset(&self) {
        self.update(|state, errors| {
            *state = ProgressSnapshot::default();
            errors.clear();
        });
    }

    /// Replaces the header text.
    pub fn set_header(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state, _| state.header = text);
    }

    /// Starts a new pass: sets the header and resets the fraction to zero.
    pub fn begin_pass(&self, header: impl Into<String>) {
        let header = header.into();
        self.update(|state, _| {
            state.header = header;
            state.fraction = 0.0;
        });
    }

    /// Advances the pass fraction, saturating at 1.
    ///
    /// Negative or non-finite amounts are ignored so the fraction never decreases.
    pub fn advance(&self, amount: f64) {
        self.update(|state, _| advance_fraction(state, amount));
    }

    /// Replaces the last-event text.
    pub fn set_last_event(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state, _| state.last_event = text);
    }

    /// Appends a message to the error log.
    pub fn append_error(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|state, errors| {
            state.failed += 1;
            errors.push(text);
        });
    }

    /// Marks the run finished and shows `summary` as the last event.
    pub fn mark_finished(&self, summary: impl Into<String>) {
        let summary = summary.into();
        self.update(|state, _| {
            state.last_event = summary;
            state.finished = true;
        });
    }

    /// Applies one target's outcome in a single critical section.
    ///
    /// Skipped and written targets advance the fraction by `increment`;
    /// failed targets only add to the error log.
    pub fn record(&self, target: &DownloadTarget, outcome: &FetchOutcome, increment: f64) {
        self.update(|state, errors| match outcome {
            FetchOutcome::Skipped => {
                advance_fraction(state, increment);
                state.last_event = format!(
                    "{} already exists - skipping",
                    target.destination.display()
                );
            }
            FetchOutcome::Written { elapsed, .. } => {
                advance_fraction(state, increment);
                state.last_event = format!(
                    "Downloaded {} - took {:.2} seconds",
                    target.emote_name,
                    elapsed.as_secs_f64()
                );
                state.downloaded += 1;
            }
            FetchOutcome::Failed(error) => {
                let message = error.to_string();
                state.last_event.clone_from(&message);
                state.failed += 1;
                errors.push(message);
            }
        });
    }

    fn update(&self, mutate: impl FnOnce(&mut ProgressSnapshot, &mut Vec<String>)) {
        self.changes.send_modify(|state| {
            let mut errors = self.lock_errors();
            mutate(state, &mut errors);
        });
    }

    fn lock_errors(&self) -> MutexGuard<'_, Vec<String>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn advance_fraction(state: &mut ProgressSnapshot, amount: f64) {
    if amount.is_finite() && amount > 0.0 {
        state.fraction = (state.fraction + amount).min(1.0);
    }
}
