//! Expands a selection of sets, formats and sizes into download targets.
//!
//! Output layout: `<root>/<account>/<set>/<FORMAT><SIZE>/<emote>.<ext>`.
//! Runs of the same selection against the same root produce the same paths,
//! which is what lets the worker skip files that already exist.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::filename::{claim_unique_path, sanitize_path_component};
use crate::catalog::{EmoteSet, ImageFormat, ImageSize};

/// One concrete (emote, format, size) download unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    /// Display name of the set the emote belongs to.
    pub collection: String,
    /// Emote id.
    pub emote_id: String,
    /// Emote display name.
    pub emote_name: String,
    /// Image format of this unit.
    pub format: ImageFormat,
    /// Resolution tier of this unit.
    pub size: ImageSize,
    /// Source URL.
    pub url: String,
    /// Where the file is written.
    pub destination: PathBuf,
}

impl DownloadTarget {
    /// Directory the destination file lives in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        self.destination.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name of the destination (`Pog.gif`).
    #[must_use]
    pub fn file_name(&self) -> String {
        self.destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// All targets of one (format, size) combination within a set.
#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    /// Display name of the set.
    pub collection: String,
    /// Format of every target in the pass.
    pub format: ImageFormat,
    /// Size of every target in the pass.
    pub size: ImageSize,
    /// Targets in emote order.
    pub targets: Vec<DownloadTarget>,
}

impl Pass {
    /// Number of targets in the pass.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if no emote publishes this format and size.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Progress credited per completed target, `1 / len`.
    ///
    /// `None` for an empty pass, which the engine skips.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn increment(&self) -> Option<f64> {
        (!self.is_empty()).then(|| 1.0 / self.targets.len() as f64)
    }

    /// Header shown while the pass runs (`Global: GIF 2x (12 emotes)`).
    #[must_use]
    pub fn header(&self) -> String {
        format!(
            "{}: {} {} ({} emotes)",
            self.collection,
            self.format,
            self.size,
            self.targets.len()
        )
    }
}

/// Passes of one set, ordered by format then size.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPlan {
    /// Display name of the set.
    pub name: String,
    /// `<root>/<account>/<set>`, created before any pass runs.
    pub directory: PathBuf,
    /// Passes in format-major order.
    pub passes: Vec<Pass>,
}

/// The ordered work of one download run.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPlan {
    /// Account name used in the output path.
    pub account: String,
    /// Output root.
    pub root: PathBuf,
    /// Sets in selection order.
    pub collections: Vec<CollectionPlan>,
}

impl DownloadPlan {
    /// Every target of the run, in dispatch order.
    pub fn targets(&self) -> impl Iterator<Item = &DownloadTarget> {
        self.collections
            .iter()
            .flat_map(|collection| &collection.passes)
            .flat_map(|pass| &pass.targets)
    }

    /// Total number of targets in the run.
    #[must_use]
    pub fn total_targets(&self) -> usize {
        self.targets().count()
    }

    /// Returns true if the run has nothing to download.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets().next().is_none()
    }

    /// Number of targets per (format, size) across the whole run.
    #[must_use]
    pub fn totals_per_pass(&self) -> BTreeMap<(ImageFormat, ImageSize), usize> {
        let mut totals = BTreeMap::new();
        for target in self.targets() {
            *totals
                .entry((target.format, target.size.clone()))
                .or_insert(0) += 1;
        }
        totals
    }
}

/// Builds the download plan for `sets` × `formats` × `sizes`.
///
/// Repeated formats or sizes are planned once. Emotes that don't publish a
/// given format and size are left out of that pass. If two targets would land
/// on the same path (compared ignoring case), later ones get a `_2`, `_3`, ...
/// suffix.
#[must_use]
pub fn plan(
    root: &Path,
    account: &str,
    sets: &[EmoteSet],
    formats: &[ImageFormat],
    sizes: &[ImageSize],
) -> DownloadPlan {
    let formats = dedup(formats);
    let sizes = dedup(sizes);
    let account_dir = root.join(sanitize_path_component(account));
    let mut claimed: HashSet<String> = HashSet::new();

    let collections = sets
        .iter()
        .map(|set| {
            let directory = account_dir.join(sanitize_path_component(&set.name));
            let mut passes = Vec::with_capacity(formats.len() * sizes.len());

            for &format in &formats {
                for size in &sizes {
                    let pass_dir = directory.join(format!("{}{}", format.tag(), size));
                    let targets = set
                        .emotes
                        .iter()
                        .filter_map(|emote| {
                            let url = emote.url(format, size)?;
                            let stem = sanitize_path_component(&emote.name);
                            let destination =
                                claim_unique_path(&pass_dir, &stem, format.extension(), &mut claimed);
                            if destination.file_stem().is_some_and(|s| s != stem.as_str()) {
                                warn!(
                                    emote = %emote.name,
                                    path = %destination.display(),
                                    "destination already planned for another emote; renamed"
                                );
                            }
                            Some(DownloadTarget {
                                collection: set.name.clone(),
                                emote_id: emote.id.clone(),
                                emote_name: emote.name.clone(),
                                format,
                                size: size.clone(),
                                url: url.to_string(),
                                destination,
                            })
                        })
                        .collect::<Vec<_>>();

                    debug!(
                        set = %set.name,
                        %format,
                        %size,
                        targets = targets.len(),
                        "planned pass"
                    );
                    passes.push(Pass {
                        collection: set.name.clone(),
                        format,
                        size: size.clone(),
                        targets,
                    });
                }
            }

            CollectionPlan {
                name: set.name.clone(),
                directory,
                passes,
            }
        })
        .collect();

    DownloadPlan {
        account: account.to_string(),
        root: root.to_path_buf(),
        collections,
    }
}

fn dedup<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
