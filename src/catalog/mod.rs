//! In-memory catalog of emote sets consumed by the download pipeline.
//!
//! The catalog is built once (usually by [`CatalogClient`]) and is read-only
//! afterwards. Every [`Emote`] maps an [`ImageFormat`] and an [`ImageSize`]
//! to at most one source URL.

mod api;
mod error;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub use api::{CatalogClient, DEFAULT_API_BASE_URL, UserProfile};
pub use error::CatalogError;

/// Image encodings offered by the emote CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImageFormat {
    /// `WEBP` (animated or static).
    Webp,
    /// `AVIF` (animated or static).
    Avif,
    /// `PNG` (static only).
    Png,
    /// `GIF` (animated).
    Gif,
}

impl ImageFormat {
    /// Every supported format, in the order they are offered to users.
    pub const ALL: [Self; 4] = [Self::Webp, Self::Avif, Self::Png, Self::Gif];

    /// Upper-case tag used in catalog data and directory names (`GIF`).
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Webp => "WEBP",
            Self::Avif => "AVIF",
            Self::Png => "PNG",
            Self::Gif => "GIF",
        }
    }

    /// Lower-case file extension without the dot (`gif`).
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ImageFormat {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.tag().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CatalogError::unknown_format(trimmed))
    }
}

/// Resolution tier tag such as `1x` or `4x`.
///
/// The CDN also publishes tiers like `1x_static`; any non-empty tag is accepted.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageSize(String);

impl ImageSize {
    /// Tiers every emote is published in.
    pub const STANDARD: [&'static str; 4] = ["1x", "2x", "3x", "4x"];

    /// The largest standard tier, `4x`.
    #[must_use]
    pub fn largest_standard() -> Self {
        Self(Self::STANDARD[3].to_string())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ImageSize {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
            return Err(CatalogError::invalid_size(trimmed));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

/// Source URLs of one emote, keyed by format and then by size.
pub type UrlsByFormat = BTreeMap<ImageFormat, BTreeMap<ImageSize, String>>;

/// A single emote with its published image files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emote {
    /// Opaque emote id.
    pub id: String,
    /// Display name, used as the file stem on disk.
    pub name: String,
    /// Source URL per format and size.
    pub urls: UrlsByFormat,
}

impl Emote {
    /// Creates an emote without any files.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            urls: UrlsByFormat::new(),
        }
    }

    /// Adds (or replaces) the URL for a format and size.
    #[must_use]
    pub fn with_url(mut self, format: ImageFormat, size: ImageSize, url: impl Into<String>) -> Self {
        self.insert_url(format, size, url);
        self
    }

    /// Records the URL for a format and size, replacing an earlier one.
    pub fn insert_url(&mut self, format: ImageFormat, size: ImageSize, url: impl Into<String>) {
        self.urls.entry(format).or_default().insert(size, url.into());
    }

    /// Returns the source URL for a format and size, if published.
    #[must_use]
    pub fn url(&self, format: ImageFormat, size: &ImageSize) -> Option<&str> {
        self.urls.get(&format)?.get(size).map(String::as_str)
    }
}

/// A named, ordered group of emotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmoteSet {
    /// Opaque set id.
    pub id: String,
    /// Display name, used as the set directory on disk.
    pub name: String,
    /// Declared capacity of the set (informational).
    pub capacity: u32,
    /// Emotes in catalog order.
    pub emotes: Vec<Emote>,
}

impl EmoteSet {
    /// Number of emotes that publish a URL for `format` and `size`.
    #[must_use]
    pub fn count_with(&self, format: ImageFormat, size: &ImageSize) -> usize {
        self.emotes
            .iter()
            .filter(|emote| emote.url(format, size).is_some())
            .count()
    }
}

impl fmt::Display for EmoteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} Emotes]", self.name, self.emotes.len())
    }
}

/// All emote sets of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Account display name; the per-account directory on disk.
    pub account: String,
    /// Emote sets in the order the account lists them.
    pub sets: Vec<EmoteSet>,
}

impl Catalog {
    /// Creates a catalog for `account`.
    pub fn new(account: impl Into<String>, sets: Vec<EmoteSet>) -> Self {
        Self {
            account: account.into(),
            sets,
        }
    }

    /// Selects sets by display name, in the requested order.
    ///
    /// An empty request selects every set. Repeated names are selected once.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSet`] if a name matches no set.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<EmoteSet>, CatalogError> {
        if names.is_empty() {
            return Ok(self.sets.clone());
        }

        let mut selected: Vec<EmoteSet> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            let set = self
                .sets
                .iter()
                .find(|set| set.name == name)
                .ok_or_else(|| CatalogError::unknown_set(name))?;
            if !selected.iter().any(|existing| existing.id == set.id) {
                selected.push(set.clone());
            }
        }
        Ok(selected)
    }
}
