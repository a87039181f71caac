//! Exit code logic for the downloader process.
//!
//! Single responsibility: map a run outcome to the process exit outcome.

use emote_downloader::RunOutcome;

use crate::ProcessExit;

/// Determines the process exit outcome of a finished run.
pub(crate) fn determine_exit_outcome(outcome: &RunOutcome) -> ProcessExit {
    if outcome.cancelled {
        ProcessExit::Interrupted
    } else if outcome.had_failures() {
        ProcessExit::Partial
    } else {
        ProcessExit::Success
    }
}
