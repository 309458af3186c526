//! Common-root detection for absolute track paths.

use std::path::{Path, PathBuf};

use crate::error::SyncError;
use crate::scan::to_slash;

/// Split `paths` into their longest common string prefix and the remainders.
///
/// The prefix is computed character by character and is not aware of path
/// segments: `/m/Abba/x` and `/m/Air/y` share `/m/A`. Callers are expected
/// to pass tracks that live under a real common directory, or to use
/// [`strip_root`] with an explicit root.
///
/// A list holding one distinct path strips only its containing directory,
/// so the remainder is the file name rather than an empty string.
pub fn strip_common_prefix(paths: &[String]) -> (String, Vec<String>) {
    let Some(first) = paths.first() else {
        return (String::new(), Vec::new());
    };

    if paths.iter().all(|p| p == first) {
        let split = first.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (dir, name) = first.split_at(split);
        return (dir.to_string(), vec![name.to_string(); paths.len()]);
    }

    let len = paths[1..]
        .iter()
        .fold(first.len(), |len, p| common_prefix_len(&first[..len], p));
    let relative = paths.iter().map(|p| p[len..].to_string()).collect();
    (first[..len].to_string(), relative)
}

/// Byte length of the shared prefix, always on a char boundary of both inputs.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Express every path relative to an explicit `root`, `/`-separated.
///
/// Unlike [`strip_common_prefix`] this compares whole path components.
pub fn strip_root(root: &Path, paths: &[PathBuf]) -> Result<Vec<String>, SyncError> {
    paths
        .iter()
        .map(|path| {
            path.strip_prefix(root)
                .map(to_slash)
                .map_err(|_| SyncError::OutsideRoot {
                    path: path.clone(),
                    root: root.to_path_buf(),
                })
        })
        .collect()
}
