//! Configuration lifecycle: merge CLI flags over file config over built-in defaults.

use std::path::PathBuf;

use emote_downloader::catalog::DEFAULT_API_BASE_URL;
use emote_downloader::download::{CONNECT_TIMEOUT_SECS, DEFAULT_OUTPUT_ROOT, READ_TIMEOUT_SECS};
use emote_downloader::{ImageFormat, ImageSize, default_concurrency};

use crate::cli::Args;
use crate::config::{FileConfig, VerbositySetting};

/// Settings for one run after every source has been applied.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) output_dir: PathBuf,
    pub(crate) concurrency: usize,
    pub(crate) formats: Vec<ImageFormat>,
    pub(crate) sizes: Vec<ImageSize>,
    pub(crate) api_base_url: String,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) read_timeout_secs: u64,
    pub(crate) verbosity: Option<VerbositySetting>,
}

/// CLI flag > config file > built-in default, field by field.
pub(crate) fn resolve_config(args: &Args, file: &FileConfig) -> ResolvedConfig {
    let formats = if args.formats.is_empty() {
        file.formats
            .clone()
            .unwrap_or_else(|| vec![ImageFormat::Webp])
    } else {
        args.formats.clone()
    };
    let sizes = if args.sizes.is_empty() {
        file.sizes
            .clone()
            .unwrap_or_else(|| vec![ImageSize::largest_standard()])
    } else {
        args.sizes.clone()
    };

    ResolvedConfig {
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| file.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT)),
        concurrency: args
            .concurrency
            .or(file.concurrency)
            .map_or_else(default_concurrency, usize::from),
        formats,
        sizes,
        api_base_url: args
            .api_base_url
            .clone()
            .or_else(|| file.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        connect_timeout_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        read_timeout_secs: file.read_timeout_secs.unwrap_or(READ_TIMEOUT_SECS),
        verbosity: file.verbosity,
    }
}

/// Default tracing level when `RUST_LOG` is not set.
///
/// Priority: quiet flag > verbose flag > config verbosity > `warn`.
pub(crate) fn resolve_default_log_level(
    quiet: bool,
    verbose: u8,
    verbosity: Option<VerbositySetting>,
) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => match verbosity {
            Some(VerbositySetting::Quiet) => "error",
            Some(VerbositySetting::Verbose) => "info",
            Some(VerbositySetting::Debug) => "debug",
            Some(VerbositySetting::Default) | None => "warn",
        },
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["emote-downloader", "user"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_resolve_config_defaults_without_file() {
        let resolved = resolve_config(&args(&[]), &FileConfig::default());
        assert_eq!(resolved.output_dir, PathBuf::from("emotes"));
        assert_eq!(resolved.concurrency, default_concurrency());
        assert_eq!(resolved.formats, [ImageFormat::Webp]);
        assert_eq!(resolved.sizes.len(), 1);
        assert_eq!(resolved.sizes[0].as_str(), "4x");
        assert_eq!(resolved.api_base_url, "https://7tv.io/v3/");
        assert_eq!(resolved.connect_timeout_secs, 30);
        assert_eq!(resolved.read_timeout_secs, 300);
    }

    #[test]
    fn test_resolve_config_file_overrides_defaults() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/data")),
            concurrency: Some(7),
            formats: Some(vec![ImageFormat::Gif]),
            api_base_url: Some("http://localhost/v3/".to_string()),
            read_timeout_secs: Some(60),
            ..FileConfig::default()
        };
        let resolved = resolve_config(&args(&[]), &file);
        assert_eq!(resolved.output_dir, PathBuf::from("/data"));
        assert_eq!(resolved.concurrency, 7);
        assert_eq!(resolved.formats, [ImageFormat::Gif]);
        assert_eq!(resolved.api_base_url, "http://localhost/v3/");
        assert_eq!(resolved.read_timeout_secs, 60);
    }

    #[test]
    fn test_resolve_config_cli_overrides_file() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/data")),
            concurrency: Some(7),
            formats: Some(vec![ImageFormat::Gif]),
            ..FileConfig::default()
        };
        let resolved = resolve_config(&args(&["-o", "out", "-c", "2", "-f", "png", "-z", "1x"]), &file);
        assert_eq!(resolved.output_dir, PathBuf::from("out"));
        assert_eq!(resolved.concurrency, 2);
        assert_eq!(resolved.formats, [ImageFormat::Png]);
        assert_eq!(resolved.sizes[0].as_str(), "1x");
    }

    #[test]
    fn test_resolve_default_log_level_priority() {
        assert_eq!(resolve_default_log_level(true, 2, Some(VerbositySetting::Debug)), "error");
        assert_eq!(resolve_default_log_level(false, 1, Some(VerbositySetting::Quiet)), "debug");
        assert_eq!(resolve_default_log_level(false, 3, None), "trace");
        assert_eq!(resolve_default_log_level(false, 0, Some(VerbositySetting::Verbose)), "info");
        assert_eq!(resolve_default_log_level(false, 0, None), "warn");
    }
}
