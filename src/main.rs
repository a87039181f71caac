//! CLI entry point for the emote downloader.

use std::process::ExitCode;

mod app;
mod cli;
mod config;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every target was written or already present.
    Success,
    /// Bootstrap failed before any download started.
    Failure,
    /// The run finished but some targets failed.
    Partial,
    /// Ctrl+C stopped the run before every target was dispatched.
    Interrupted,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Partial => 2,
            Self::Interrupted => 130,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let exit = match app::runtime::run_downloader().await {
        Ok(exit) => exit,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ProcessExit::Failure
        }
    };
    ExitCode::from(exit.code())
}
