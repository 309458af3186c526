//! Source library providers.
//!
//! The sync engine never talks to a media application directly. It asks a
//! [`TrackProvider`] for the tracks of the configured playlists; callers pass
//! the provider in explicitly.
//!
//! [`LibraryManifest`] reads an exported YAML manifest:
//!
//! ```yaml
//! playlists:
//!   - name: Running
//!     tracks:
//!       - path: /Users/me/Music/Artist/Album/01 Song.mp3
//!         title: Song
//!         artist: Artist
//! ```

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{PlaylistName, Track};

/// Provides the tracks of named playlists.
pub trait TrackProvider {
    /// Every playlist the library knows about.
    fn playlist_names(&self) -> Vec<PlaylistName>;

    /// Tracks in `playlist`, or `None` for an unknown name.
    fn playlist_tracks(&self, playlist: &PlaylistName) -> Option<Vec<Track>>;

    /// Tracks of all requested playlists, in library order.
    ///
    /// A track listed by several playlists appears once. Unknown names are
    /// logged and skipped.
    fn list_tracks(&self, names: &BTreeSet<PlaylistName>) -> Result<Vec<Track>, ConfigError> {
        let known: BTreeSet<PlaylistName> = self.playlist_names().into_iter().collect();
        for missing in names.difference(&known) {
            tracing::warn!("playlist '{missing}' not found in library");
        }

        let mut seen = HashSet::new();
        let mut tracks = Vec::new();
        for name in self.playlist_names() {
            if !names.contains(&name) {
                continue;
            }
            for track in self.playlist_tracks(&name).unwrap_or_default() {
                if seen.insert(track.path.clone()) {
                    tracks.push(track);
                }
            }
        }
        Ok(tracks)
    }
}

// ---------------------------------------------------------------------------
// Manifest provider
// ---------------------------------------------------------------------------

/// A playlist entry inside a [`LibraryManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestPlaylist {
    pub name: PlaylistName,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Library exported to a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LibraryManifest {
    #[serde(default)]
    pub playlists: Vec<ManifestPlaylist>,
}

impl LibraryManifest {
    /// Load the manifest at `path`.
    ///
    /// Returns `ConfigError::ConfigNotFound` if absent,
    /// `ConfigError::Parse` if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

impl TrackProvider for LibraryManifest {
    fn playlist_names(&self) -> Vec<PlaylistName> {
        self.playlists.iter().map(|p| p.name.clone()).collect()
    }

    fn playlist_tracks(&self, playlist: &PlaylistName) -> Option<Vec<Track>> {
        self.playlists
            .iter()
            .find(|p| &p.name == playlist)
            .map(|p| p.tracks.clone())
    }
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// A provider built in code; handy for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticLibrary {
    playlists: Vec<(PlaylistName, Vec<Track>)>,
}

impl StaticLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlist(mut self, name: impl Into<PlaylistName>, tracks: Vec<Track>) -> Self {
        self.playlists.push((name.into(), tracks));
        self
    }
}

impl TrackProvider for StaticLibrary {
    fn playlist_names(&self) -> Vec<PlaylistName> {
        self.playlists.iter().map(|(name, _)| name.clone()).collect()
    }

    fn playlist_tracks(&self, playlist: &PlaylistName) -> Option<Vec<Track>> {
        self.playlists
            .iter()
            .find(|(name, _)| name == playlist)
            .map(|(_, tracks)| tracks.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> BTreeSet<PlaylistName> {
        list.iter().map(|n| PlaylistName::from(*n)).collect()
    }

    #[test]
    fn list_tracks_dedups_across_playlists() {
        let shared = Track::new("/music/shared.mp3");
        let library = StaticLibrary::new()
            .with_playlist("A", vec![Track::new("/music/a.mp3"), shared.clone()])
            .with_playlist("B", vec![shared.clone(), Track::new("/music/b.mp3")]);

        let tracks = library.list_tracks(&names(&["A", "B"])).expect("list");
        let paths: Vec<_> = tracks.iter().map(|t| t.path.display().to_string()).collect();
        assert_eq!(paths, vec!["/music/a.mp3", "/music/shared.mp3", "/music/b.mp3"]);
    }

    #[test]
    fn unknown_playlists_are_skipped() {
        let library = StaticLibrary::new().with_playlist("A", vec![Track::new("/music/a.mp3")]);
        let tracks = library.list_tracks(&names(&["A", "Nope"])).expect("list");
        assert_eq!(tracks.len(), 1);
    }

    #[test]
    fn manifest_loads_optional_tags() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("library.yaml");
        std::fs::write(
            &path,
            "playlists:\n  - name: Running\n    tracks:\n      - path: /m/a.mp3\n        title: A\n      - path: /m/b.mp3\n        title: B\n        artist: X\n",
        )
        .expect("write");

        let manifest = LibraryManifest::load_at(&path).expect("load");
        let tracks = manifest.list_tracks(&names(&["Running"])).expect("list");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].artist, None);
        assert_eq!(tracks[1].lyrics_filename().as_deref(), Some("B - X.lrcx"));
    }

    #[test]
    fn manifest_missing_file_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = LibraryManifest::load_at(&dir.path().join("none.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }
}
