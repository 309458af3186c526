//! Shared sync pipeline entrypoints used by the CLI.
//!
//! Each entrypoint takes the [`TrackProvider`] explicitly:
//! provider tracks → relative source list → device scan → reconcile → apply.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use walksync_core::{Config, PlaylistName, Track, TrackProvider};

use crate::error::SyncError;
use crate::executor::{ProgressSink, SyncPlan, SyncSummary};
use crate::normalize::{denormalize, normalize};
use crate::playlist::{playlist_path, render_playlist, write_playlist, WriteResult};
use crate::prefix::{strip_common_prefix, strip_root};
use crate::reconcile::Reconciler;
use crate::scan::{scan, ExtensionFilter};

/// Per-run overrides of configured behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Overrides `Config::remove_unmatched` when set.
    pub remove_unmatched: Option<bool>,
    pub dry_run: bool,
}

/// Library tracks expressed relative to their shared root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    pub root: PathBuf,
    pub relative: Vec<String>,
}

/// A playlist file rendered but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPlaylist {
    pub name: PlaylistName,
    pub path: PathBuf,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Source root
// ---------------------------------------------------------------------------

/// Express `tracks` relative to the configured library root, or to the
/// directory they all share when no root is configured.
pub fn source_set(config: &Config, tracks: &[Track]) -> Result<SourceSet, SyncError> {
    let paths: Vec<PathBuf> = tracks.iter().map(|t| t.path.clone()).collect();
    if let Some(root) = &config.library_root {
        return Ok(SourceSet {
            root: root.clone(),
            relative: strip_root(root, &paths)?,
        });
    }

    let strings: Vec<String> = paths
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    let (prefix, relative) = strip_common_prefix(&strings);
    if prefix.is_empty() || prefix.ends_with('/') {
        return Ok(SourceSet {
            root: PathBuf::from(prefix),
            relative,
        });
    }

    // The shared prefix stops inside a name (`/m/Abba`, `/m/Air` → `/m/A`);
    // fall back to the enclosing directory.
    tracing::warn!("common track prefix '{prefix}' ends mid-name; using its directory");
    let dir = prefix.rfind('/').map(|i| &prefix[..=i]).unwrap_or("");
    Ok(SourceSet {
        root: PathBuf::from(dir),
        relative: strings.iter().map(|s| s[dir.len()..].to_string()).collect(),
    })
}

fn selected_tracks(provider: &dyn TrackProvider, config: &Config) -> Result<Vec<Track>, SyncError> {
    let names: BTreeSet<PlaylistName> = config.playlists.iter().cloned().collect();
    Ok(provider.list_tracks(&names)?)
}

fn reconciler(config: &Config) -> Reconciler {
    Reconciler::with_epsilon(config.mtime_epsilon())
}

fn build_plan(
    config: &Config,
    options: SyncOptions,
    source: &[String],
    source_root: &Path,
    dest_root: &Path,
    extensions: &ExtensionFilter,
) -> Result<SyncPlan, SyncError> {
    let device = scan_device(config, dest_root, extensions)?;
    let reconciliation = reconciler(config).reconcile(source, &device, source_root, dest_root)?;
    Ok(SyncPlan::new(reconciliation, source_root, dest_root)
        .remove_unmatched(options.remove_unmatched.unwrap_or(config.remove_unmatched))
        .protect(ExtensionFilter::new(config.protected_extensions.iter().cloned()))
        .dry_run(options.dry_run))
}

/// List `dest_root` on the device.
///
/// A missing `device_dir` means the device is not mounted and stays an error.
/// A missing subfolder of a mounted device (a lyrics folder not created yet)
/// lists as empty; the executor creates it on first copy.
fn scan_device(
    config: &Config,
    dest_root: &Path,
    extensions: &ExtensionFilter,
) -> Result<Vec<String>, SyncError> {
    match scan(dest_root, extensions) {
        Err(SyncError::NotFound { .. })
            if dest_root != config.device_dir && config.device_dir.is_dir() =>
        {
            tracing::debug!("{} does not exist yet", dest_root.display());
            Ok(Vec::new())
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Music
// ---------------------------------------------------------------------------

/// Reconcile the configured playlists against the device music directory.
pub fn plan_music(
    provider: &dyn TrackProvider,
    config: &Config,
    options: SyncOptions,
) -> Result<SyncPlan, SyncError> {
    let tracks = selected_tracks(provider, config)?;
    let source = source_set(config, &tracks)?;
    build_plan(
        config,
        options,
        &source.relative,
        &source.root,
        &config.device_dir,
        &ExtensionFilter::new(config.music_extensions.iter().cloned()),
    )
}

/// Plan and apply the music sync.
pub fn sync_music(
    provider: &dyn TrackProvider,
    config: &Config,
    options: SyncOptions,
    sink: &mut impl ProgressSink,
) -> Result<SyncSummary, SyncError> {
    plan_music(provider, config, options)?.apply(sink)
}

// ---------------------------------------------------------------------------
// Lyrics
// ---------------------------------------------------------------------------

/// Reconcile lyric files for the configured playlists.
///
/// Returns `None` when the configuration has no `lyrics` section. Tracks
/// without both title and artist, or whose lyric file is absent locally,
/// are left out.
pub fn plan_lyrics(
    provider: &dyn TrackProvider,
    config: &Config,
    options: SyncOptions,
) -> Result<Option<SyncPlan>, SyncError> {
    let (Some(lyrics), Some(device_dir)) = (config.lyrics.as_ref(), config.lyrics_device_dir())
    else {
        return Ok(None);
    };

    let mut seen = HashSet::new();
    let mut source = Vec::new();
    for track in selected_tracks(provider, config)? {
        let Some(name) = track.lyrics_filename() else {
            tracing::debug!("no title/artist for {}", track.path.display());
            continue;
        };
        match find_local_lyrics(&lyrics.source_dir, &name) {
            Some(found) if seen.insert(normalize(&found)) => source.push(found),
            Some(_) => {}
            None => tracing::debug!("no local lyrics: {name}"),
        }
    }

    build_plan(
        config,
        options,
        &source,
        &lyrics.source_dir,
        device_dir,
        &ExtensionFilter::new(lyrics.extensions.iter().cloned()),
    )
    .map(Some)
}

/// Plan and apply the lyric sync. `None` when lyrics are not configured.
pub fn sync_lyrics(
    provider: &dyn TrackProvider,
    config: &Config,
    options: SyncOptions,
    sink: &mut impl ProgressSink,
) -> Result<Option<SyncSummary>, SyncError> {
    match plan_lyrics(provider, config, options)? {
        Some(plan) => plan.apply(sink).map(Some),
        None => Ok(None),
    }
}

/// The spelling of `name` that exists under `dir`, trying it as given,
/// composed, then decomposed.
fn find_local_lyrics(dir: &Path, name: &str) -> Option<String> {
    [name.to_string(), normalize(name), denormalize(name)]
        .into_iter()
        .find(|candidate| dir.join(candidate).is_file())
}

// ---------------------------------------------------------------------------
// Playlists
// ---------------------------------------------------------------------------

/// Render one playlist file per configured playlist.
///
/// Entries are device-relative canonical paths under the same source root
/// the music sync uses. Empty when the configuration has no `playlist` section.
pub fn render_playlists(
    provider: &dyn TrackProvider,
    config: &Config,
) -> Result<Vec<RenderedPlaylist>, SyncError> {
    let Some(style) = config.playlist.as_ref() else {
        return Ok(Vec::new());
    };

    let all = selected_tracks(provider, config)?;
    let source = source_set(config, &all)?;

    let mut rendered = Vec::new();
    for name in &config.playlists {
        // Unknown names were already reported by `selected_tracks`.
        let Some(tracks) = provider.playlist_tracks(name) else {
            continue;
        };
        let paths: Vec<PathBuf> = tracks.into_iter().map(|t| t.path).collect();
        let entries: Vec<String> = strip_root(&source.root, &paths)?
            .iter()
            .map(|p| normalize(p))
            .collect();
        rendered.push(RenderedPlaylist {
            name: name.clone(),
            path: playlist_path(&config.device_dir, name),
            content: render_playlist(&entries, &style.prefix, style.separator),
        });
    }
    Ok(rendered)
}

/// Render and write every playlist file.
pub fn write_playlists(
    provider: &dyn TrackProvider,
    config: &Config,
    options: SyncOptions,
) -> Result<Vec<WriteResult>, SyncError> {
    render_playlists(provider, config)?
        .into_iter()
        .map(|p| write_playlist(&p.path, &p.content, options.dry_run))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use walksync_core::{PlaylistConfig, StaticLibrary};

    fn config_with(library_root: Option<&str>) -> Config {
        Config {
            device_dir: PathBuf::from("/device"),
            playlists: vec![PlaylistName::from("A")],
            library_root: library_root.map(PathBuf::from),
            ..Config::default()
        }
    }

    fn tracks(paths: &[&str]) -> Vec<Track> {
        paths.iter().map(|p| Track::new(*p)).collect()
    }

    #[test]
    fn derived_root_stops_at_directory() {
        let config = config_with(None);
        let set = source_set(&config, &tracks(&["/m/Abba/x.mp3", "/m/Air/y.mp3"])).unwrap();
        assert_eq!(set.root, PathBuf::from("/m/"));
        assert_eq!(set.relative, vec!["Abba/x.mp3", "Air/y.mp3"]);
    }

    #[test]
    fn configured_root_wins() {
        let config = config_with(Some("/m"));
        let set = source_set(&config, &tracks(&["/m/Abba/x.mp3"])).unwrap();
        assert_eq!(set.root, PathBuf::from("/m"));
        assert_eq!(set.relative, vec!["Abba/x.mp3"]);
    }

    #[test]
    fn empty_library_has_empty_root() {
        let set = source_set(&config_with(None), &[]).unwrap();
        assert_eq!(set.root, PathBuf::new());
        assert!(set.relative.is_empty());
    }

    #[test]
    fn playlists_render_relative_to_music_root() {
        let library = StaticLibrary::new()
            .with_playlist("A", tracks(&["/m/Abba/x.mp3", "/m/Air/y.mp3"]))
            .with_playlist("B", tracks(&["/m/Other/z.mp3"]));
        let mut config = config_with(None);
        config.playlist = Some(PlaylistConfig {
            prefix: "MUSIC/".to_string(),
            ..PlaylistConfig::default()
        });

        let rendered = render_playlists(&library, &config).unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].path, PathBuf::from("/device/A.m3u"));
        assert_eq!(rendered[0].content, "MUSIC/Abba/x.mp3\nMUSIC/Air/y.mp3\n");
    }

    #[test]
    fn unknown_playlist_renders_nothing() {
        let library = StaticLibrary::new().with_playlist("A", tracks(&["/m/Abba/x.mp3"]));
        let mut config = config_with(None);
        config.playlists.push(PlaylistName::from("Missing"));
        config.playlist = Some(PlaylistConfig::default());

        let rendered = render_playlists(&library, &config).unwrap();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].name, PlaylistName::from("A"));
    }

    #[test]
    fn lyrics_lookup_accepts_either_normal_form() {
        let dir = tempfile::TempDir::new().unwrap();
        let composed = "Caf\u{E9} - Band.lrcx";
        fs::write(dir.path().join(composed), "[00:00.00]").unwrap();

        let found = find_local_lyrics(dir.path(), "Cafe\u{301} - Band.lrcx");
        assert_eq!(found.as_deref(), Some(composed));
        assert!(find_local_lyrics(dir.path(), "Missing - Band.lrcx").is_none());
    }
}
