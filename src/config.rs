//! Optional config file supplying defaults for the CLI flags.
//!
//! The file is a flat list of `key = value` lines. Strings are double-quoted,
//! numbers are bare, and `#` starts a comment outside of quotes.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail, ensure};

use emote_downloader::download::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use emote_downloader::{ImageFormat, ImageSize};

const CONFIG_DIR_NAME: &str = "emote-downloader";
const CONFIG_FILE_NAME: &str = "config.toml";
const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=3600;

/// Defaults read from the config file. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct FileConfig {
    pub output_dir: Option<PathBuf>,
    pub concurrency: Option<u8>,
    pub formats: Option<Vec<ImageFormat>>,
    pub sizes: Option<Vec<ImageSize>>,
    pub api_base_url: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub read_timeout_secs: Option<u64>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Checks ranges the parser cannot express on its own.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency {
            ensure!(
                (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&usize::from(concurrency)),
                "`concurrency` must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}, got {concurrency}"
            );
        }
        ensure!(
            !self.formats.as_ref().is_some_and(Vec::is_empty),
            "`formats` must name at least one format"
        );
        ensure!(
            !self.sizes.as_ref().is_some_and(Vec::is_empty),
            "`sizes` must name at least one size"
        );
        for (field, value) in [
            ("connect_timeout_secs", self.connect_timeout_secs),
            ("read_timeout_secs", self.read_timeout_secs),
        ] {
            if let Some(secs) = value {
                ensure!(
                    TIMEOUT_RANGE_SECS.contains(&secs),
                    "`{field}` must be between {} and {} seconds, got {secs}",
                    TIMEOUT_RANGE_SECS.start(),
                    TIMEOUT_RANGE_SECS.end()
                );
            }
        }
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_dir" => self.output_dir = Some(PathBuf::from(quoted(value)?)),
            "concurrency" => self.concurrency = Some(number(value)?),
            "formats" => self.formats = Some(comma_list(quoted(value)?)?),
            "sizes" => self.sizes = Some(comma_list(quoted(value)?)?),
            "api_base_url" => self.api_base_url = Some(quoted(value)?.to_string()),
            "connect_timeout_secs" => self.connect_timeout_secs = Some(number(value)?),
            "read_timeout_secs" => self.read_timeout_secs = Some(number(value)?),
            "verbosity" => self.verbosity = Some(quoted(value)?.parse()?),
            other => bail!("unknown configuration key '{other}'"),
        }
        Ok(())
    }
}

/// Log verbosity a config file may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl FromStr for VerbositySetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "default" => Self::Default,
            "verbose" => Self::Verbose,
            "quiet" => Self::Quiet,
            "debug" => Self::Debug,
            other => bail!("unknown verbosity '{other}', use default, verbose, quiet or debug"),
        })
    }
}

/// Where the config came from and what it held.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: Option<PathBuf>,
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    #[must_use]
    pub fn file_config(&self) -> FileConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// `$XDG_CONFIG_HOME/emote-downloader/config.toml`, else `$HOME/.config/emote-downloader/config.toml`.
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let config_home = non_empty_env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty_env("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn non_empty_env(name: &str) -> Option<OsString> {
    std::env::var_os(name).filter(|value| !value.is_empty())
}

/// Reads `explicit`, or the default path when it exists.
///
/// A missing explicit file is an error. A missing default file is not.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => resolve_default_config_path().filter(|path| path.exists()),
    };
    let config = path.as_deref().map(read_config_file).transpose()?;
    Ok(LoadedConfig {
        path: path.or_else(resolve_default_config_path),
        config,
    })
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut config = FileConfig::default();
    for (line_no, line) in (1..).zip(raw.lines()) {
        let line = without_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .map(|(key, value)| (key.trim(), value.trim()))
            .ok_or_else(|| anyhow!("line {line_no}: expected `key = value`"))?;
        config
            .apply(key, value)
            .with_context(|| format!("line {line_no}: invalid `{key}`"))?;
    }
    config.validate()?;
    Ok(config)
}

/// Cuts the line at the first `#` that is not inside a quoted string.
fn without_comment(line: &str) -> &str {
    let mut inside_quotes = false;
    let cut = line.char_indices().find_map(|(index, ch)| {
        match ch {
            '"' => inside_quotes = !inside_quotes,
            '#' if !inside_quotes => return Some(index),
            _ => {}
        }
        None
    });
    cut.map_or(line, |index| &line[..index])
}

fn quoted(value: &str) -> Result<&str> {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| anyhow!("expected a double-quoted string, got {value}"))
}

fn number<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    value
        .parse()
        .with_context(|| format!("expected a whole number, got {value}"))
}

/// Blank entries are ignored, so `"2x,4x,"` is two sizes.
fn comma_list<T>(value: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| item.parse::<T>().map_err(anyhow::Error::from))
        .collect()
}
