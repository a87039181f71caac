//! Progress UI (bar) for download runs.

use std::sync::Arc;

use emote_downloader::{ProgressReporter, ProgressSnapshot};
use indicatif::{ProgressBar, ProgressStyle};

/// Bar resolution; the per-pass fraction is scaled to this many steps.
const BAR_STEPS: u64 = 1000;

/// Spawns the progress bar when requested.
///
/// The task redraws on every snapshot the reporter publishes and exits once a
/// snapshot with `finished` set arrives. Returns `None` when `draw` is false.
pub(crate) fn spawn_progress_ui(
    draw: bool,
    progress: &Arc<ProgressReporter>,
) -> Option<tokio::task::JoinHandle<()>> {
    if !draw {
        return None;
    }
    let mut changes = progress.subscribe();

    Some(tokio::spawn(async move {
        let bar = ProgressBar::new(BAR_STEPS);
        bar.set_style(
            ProgressStyle::with_template("{prefix}\n{bar:40} {percent:>3}%\n{wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        while changes.changed().await.is_ok() {
            let snapshot = changes.borrow_and_update().clone();
            render(&bar, &snapshot);
            if snapshot.finished {
                break;
            }
        }

        bar.finish_and_clear();
    }))
}

fn render(bar: &ProgressBar, snapshot: &ProgressSnapshot) {
    bar.set_prefix(snapshot.header.clone());
    bar.set_position(bar_position(snapshot.fraction));
    let event = snapshot.last_event.lines().next().unwrap_or_default();
    bar.set_message(event.to_string());
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bar_position(fraction: f64) -> u64 {
    (fraction.clamp(0.0, 1.0) * BAR_STEPS as f64).round() as u64
}
