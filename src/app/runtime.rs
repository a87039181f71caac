use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use emote_downloader::{
    Catalog, CatalogClient, DownloadEngine, HttpClient, ProgressReporter, RunOutcome, plan,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ProcessExit;
use crate::app::{config_manager, exit_handler, progress_manager, terminal};
use crate::cli::Args;
use crate::config;

pub(crate) async fn run_downloader() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = config::load_config(args.config.as_deref())?;
    let resolved = config_manager::resolve_config(&args, &loaded.file_config());

    let default_level =
        config_manager::resolve_default_log_level(args.quiet, args.verbose, resolved.verbosity);
    terminal::init_tracing(default_level, terminal::is_no_color_requested(args.no_color));

    debug!(?args, "CLI arguments parsed");
    debug!(
        path = ?loaded.path,
        loaded = loaded.config.is_some(),
        "config lookup"
    );
    debug!(?resolved, "resolved settings");

    let http = HttpClient::with_timeouts(resolved.connect_timeout_secs, resolved.read_timeout_secs)
        .context("Failed to build HTTP client")?;
    let catalog_client = CatalogClient::new(http.inner().clone(), &resolved.api_base_url)?;

    let profile = catalog_client.fetch_user(&args.user_id).await?;
    info!(
        user = %profile.username,
        sets = profile.emote_set_ids.len(),
        "fetched user profile"
    );
    let catalog = catalog_client.fetch_catalog(&profile).await;

    if args.list_sets {
        print!("{}", format_set_list(&catalog));
        return Ok(ProcessExit::Success);
    }

    let sets = catalog.select(&args.sets)?;
    let plan = plan(
        &resolved.output_dir,
        &catalog.account,
        &sets,
        &resolved.formats,
        &resolved.sizes,
    );
    info!(
        sets = sets.len(),
        targets = plan.total_targets(),
        root = %plan.root.display(),
        "planned download"
    );
    if plan.is_empty() {
        warn!("no emotes match the selected formats and sizes");
    }

    let engine = DownloadEngine::new(resolved.concurrency, Arc::new(http))?;
    let progress = Arc::new(ProgressReporter::new());

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    let draw = terminal::should_draw_progress(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let progress_handle = progress_manager::spawn_progress_ui(draw, &progress);

    let outcome = engine.run(&plan, &progress, &cancel).await;

    if let Some(handle) = progress_handle
        && let Err(error) = handle.await
    {
        debug!(%error, "progress display task ended abnormally");
    }

    println!("{}", outcome.summary());
    if outcome.had_failures() {
        eprint!("{}", format_error_log(&outcome));
    }

    Ok(exit_handler::determine_exit_outcome(&outcome))
}

/// What a Ctrl+C press does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Stop dispatching and let in-flight downloads finish.
    Cancel,
    /// Leave immediately.
    Exit,
}

fn interrupt_action(presses: usize) -> InterruptAction {
    if presses <= 1 {
        InterruptAction::Cancel
    } else {
        InterruptAction::Exit
    }
}

/// Listens for Ctrl+C for the rest of the process.
///
/// The first press cancels `cancel`; the second exits with the interrupted
/// status without waiting for in-flight downloads.
fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut presses = 0usize;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            match interrupt_action(presses) {
                InterruptAction::Cancel => {
                    warn!("interrupted; finishing in-flight downloads, press Ctrl+C again to quit");
                    cancel.cancel();
                }
                InterruptAction::Exit => {
                    warn!("interrupted again; exiting");
                    std::process::exit(i32::from(ProcessExit::Interrupted.code()));
                }
            }
        }
    });
}

/// One `<name> [<n> Emotes]` line per set.
fn format_set_list(catalog: &Catalog) -> String {
    catalog.sets.iter().map(|set| format!("{set}\n")).collect()
}

fn format_error_log(outcome: &RunOutcome) -> String {
    let mut log = format!("\nError log ({} failed):\n", outcome.failed);
    for error in &outcome.errors {
        log.push_str("  ");
        log.push_str(error);
        log.push('\n');
    }
    log
}
