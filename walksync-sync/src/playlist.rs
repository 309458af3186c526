//! Generated `.m3u` playlist files on the device.
//!
//! ## `write_playlist` protocol
//!
//! 1. Render content (already done by caller).
//! 2. Compare with the file on disk → skip if identical.
//! 3. Write to `<path>.walksync.tmp`.
//! 4. Rename to final path (atomic on POSIX).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use walksync_core::types::{PathSeparator, PlaylistName};

use crate::error::{io_err, SyncError};

/// Outcome of an individual playlist write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped: on-disk content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// One line per entry: `prefix + entry`, with `/` swapped for `separator`.
pub fn render_playlist(entries: &[String], prefix: &str, separator: PathSeparator) -> String {
    let sep = separator.as_char();
    let mut out = String::new();
    for entry in entries {
        let line = format!("{prefix}{entry}");
        if sep == '/' {
            out.push_str(&line);
        } else {
            out.push_str(&line.replace('/', &sep.to_string()));
        }
        out.push('\n');
    }
    out
}

/// `<dir>/<name>.m3u`, with `/` in the name replaced by `&`.
pub fn playlist_path(dir: &Path, name: &PlaylistName) -> PathBuf {
    dir.join(format!("{}.m3u", name.0.replace('/', "&")))
}

/// Write `content` to `path` unless it already holds exactly that content.
pub fn write_playlist(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, SyncError> {
    let tmp = PathBuf::from(format!("{}.walksync.tmp", path.display()));
    write_playlist_with_tmp(path, content, dry_run, &tmp)
}

fn write_playlist_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, SyncError> {
    if read_existing(path)?.as_deref() == Some(content) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Unified diff between the playlist on disk and `rendered`.
///
/// Returns `None` when they are identical. A missing file diffs as empty.
pub fn diff_playlist(path: &Path, rendered: &str) -> Result<Option<String>, SyncError> {
    let existing = read_existing(path)?.unwrap_or_default();
    if existing == rendered {
        return Ok(None);
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let unified = TextDiff::from_lines(existing.as_str(), rendered)
        .unified_diff()
        .header(&format!("a/{name}"), &format!("b/{name}"))
        .context_radius(3)
        .to_string();
    Ok(Some(unified))
}

fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn entries(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn renders_prefix_and_backslashes() {
        let content = render_playlist(
            &entries(&["Abba/Gold/01.mp3", "x.mp3"]),
            "MUSIC/",
            PathSeparator::Backslash,
        );
        assert_eq!(content, "MUSIC\\Abba\\Gold\\01.mp3\nMUSIC\\x.mp3\n");
    }

    #[test]
    fn renders_slashes_untouched() {
        let content = render_playlist(&entries(&["a/b.mp3"]), "", PathSeparator::Slash);
        assert_eq!(content, "a/b.mp3\n");
    }

    #[test]
    fn playlist_name_is_a_single_segment() {
        let path = playlist_path(Path::new("/dev"), &PlaylistName::from("Rock/Pop"));
        assert_eq!(path, PathBuf::from("/dev/Rock&Pop.m3u"));
    }

    #[test]
    fn first_write_then_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Running.m3u");

        let first = write_playlist(&path, "a.mp3\n", false).unwrap();
        assert!(matches!(first, WriteResult::Written { .. }));
        let second = write_playlist(&path, "a.mp3\n", false).unwrap();
        assert!(matches!(second, WriteResult::Unchanged { .. }));
        let third = write_playlist(&path, "b.mp3\n", false).unwrap();
        assert!(matches!(third, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "b.mp3\n");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.m3u");
        let result = write_playlist(&path, "a.mp3\n", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.m3u");
        write_playlist(&path, "a.mp3\n", false).unwrap();
        let tmp_path = PathBuf::from(format!("{}.walksync.tmp", path.display()));
        assert!(!tmp_path.exists(), ".walksync.tmp must be cleaned up");
    }

    #[test]
    fn diff_shows_added_and_removed_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Running.m3u");
        fs::write(&path, "a.mp3\nb.mp3\n").unwrap();

        let diff = diff_playlist(&path, "a.mp3\nc.mp3\n").unwrap().expect("diff");
        assert!(diff.contains("--- a/Running.m3u"));
        assert!(diff.contains("+++ b/Running.m3u"));
        assert!(diff.lines().any(|l| l == "-b.mp3"));
        assert!(diff.lines().any(|l| l == "+c.mp3"));

        assert!(diff_playlist(&path, "a.mp3\nb.mp3\n").unwrap().is_none());
    }

    #[test]
    fn missing_file_diffs_as_all_additions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("New.m3u");

        let diff = diff_playlist(&path, "a.mp3\n").unwrap().expect("diff");
        assert!(diff.lines().any(|l| l == "+a.mp3"));
        assert!(!diff.lines().any(|l| l.starts_with('-') && !l.starts_with("---")));
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();
        let path = readonly_dir.join("list.m3u");
        fs::write(&path, "original\n").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("list.m3u.walksync.tmp");
        let result = write_playlist_with_tmp(&path, "new\n", false, &tmp_path);

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        // Root ignores directory permissions, so only check the failure path when it applies.
        if result.is_err() {
            assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");
            assert!(!tmp_path.exists(), ".walksync.tmp should be cleaned up");
        }
    }
}
