//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use emote_downloader::{ImageFormat, ImageSize};

/// Bulk-download the emotes of a 7TV account.
///
/// Emotes are written to `<output>/<account>/<set>/<FORMAT><SIZE>/<emote>.<ext>`.
/// Files that already exist are skipped, so an interrupted run can simply be
/// started again.
#[derive(Parser, Debug)]
#[command(name = "emote-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// 7TV user id whose emote sets are downloaded
    #[arg(value_name = "USER_ID")]
    pub user_id: String,

    /// Emote set to download by name (repeatable; default: every set)
    #[arg(short = 's', long = "set", value_name = "NAME")]
    pub sets: Vec<String>,

    /// Image format to download: webp, avif, png or gif (repeatable)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub formats: Vec<ImageFormat>,

    /// Image size to download, e.g. 1x..4x (repeatable)
    #[arg(short = 'z', long = "size", value_name = "SIZE")]
    pub sizes: Vec<ImageSize>,

    /// Directory the account folder is created in [default: emotes]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent downloads (1-100) [default: available CPUs]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// List the user's emote sets and exit
    #[arg(long)]
    pub list_sets: bool,

    /// Base URL of the 7TV REST API
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Read settings from this file instead of the default config path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
