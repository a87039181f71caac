//! Filename sanitization and collision-free destination paths.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Sanitizes one path component taken from remote data.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |`) and control characters with `_`. A component made of
/// dots only has its dots replaced too. Anything else is kept verbatim so the
/// on-disk layout of earlier runs still matches.
pub(crate) fn sanitize_path_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}

/// Returns `dir/stem.ext`, or `dir/stem_N.ext` (N from 2) if an earlier target
/// already claimed that path. The chosen path is added to `claimed`.
///
/// Claims compare case-insensitively: `catJAM.gif` and `CATJAM.gif` are the
/// same file on default APFS and NTFS volumes.
pub(crate) fn claim_unique_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    claimed: &mut HashSet<String>,
) -> PathBuf {
    let base = dir.join(format!("{stem}.{extension}"));
    if claimed.insert(claim_key(&base)) {
        return base;
    }

    let mut suffix = 2usize;
    loop {
        let candidate = dir.join(format!("{stem}_{suffix}.{extension}"));
        if claimed.insert(claim_key(&candidate)) {
            return candidate;
        }
        suffix += 1;
    }
}

fn claim_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
