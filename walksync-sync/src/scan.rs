//! Recursive directory listing filtered by extension.

use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{io_err, SyncError};

/// A set of leading-dot extensions such as `.mp3`.
///
/// Matching is case-sensitive and looks at the last extension only, so
/// `song.MP3` does not match `.mp3` and dotfiles like `.hidden` have none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionFilter(BTreeSet<String>);

impl ExtensionFilter {
    /// A filter that lets every file through.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(extensions.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a scan should keep `path`. An empty filter keeps everything.
    pub fn accepts(&self, path: &Path) -> bool {
        self.0.is_empty() || self.contains(path)
    }

    /// Whether the extension of `path` is listed. An empty filter lists nothing.
    pub fn contains(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.0.contains(&ext))
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}

/// List every regular file under `root` accepted by `filter`.
///
/// Paths are relative to `root` and `/`-separated. Symlinks are not followed.
/// Order is unspecified; sort before showing the list to a person.
pub fn scan(root: &Path, filter: &ExtensionFilter) -> Result<Vec<String>, SyncError> {
    let meta = std::fs::metadata(root).map_err(|e| io_err(root, e))?;
    if !meta.is_dir() {
        return Err(io_err(root, io::Error::other("not a directory")));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| walk_err(root, e))?;
        if !entry.file_type().is_file() || !filter.accepts(entry.path()) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(to_slash(relative));
    }

    tracing::debug!("scanned {}: {} file(s)", root.display(), files.len());
    Ok(files)
}

/// Join path components with `/` regardless of platform.
pub(crate) fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn walk_err(root: &Path, err: walkdir::Error) -> SyncError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    match err.into_io_error() {
        Some(source) => io_err(path, source),
        None => io_err(path, io::Error::other("filesystem loop")),
    }
}
