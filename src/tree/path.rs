//! Path resolution and normalization utilities

use crate::error::FingerprintError;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Resolve a caller-supplied root to an absolute path
///
/// Symlinks in the root itself are resolved; a missing target or a broken
/// link yields `InvalidPath`.
pub fn resolve_root(path: &Path) -> Result<PathBuf, FingerprintError> {
    dunce::canonicalize(path).map_err(|_| FingerprintError::InvalidPath(path.to_path_buf()))
}

/// Names of the directories strictly between the root and the entry at `relative`
pub fn ancestor_names(relative: &Path) -> impl Iterator<Item = &OsStr> {
    let mut names: Vec<&OsStr> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();
    names.pop();
    names.into_iter()
}

/// Render a relative path with `/` separators and NFC-normalized names
///
/// Used for manifests so listings compare equal across platforms.
pub fn display_relative(relative: &Path) -> String {
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    joined.nfc().collect()
}
