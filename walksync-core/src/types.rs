//! Domain types shared by the sync engine and the CLI.
//!
//! Filesystem locations use `PathBuf`; relative paths handed between the
//! scanner and the reconciler are plain `/`-separated strings.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a playlist in the source library.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaylistName(pub String);

impl fmt::Display for PlaylistName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for PlaylistName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PlaylistName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Separator style written into generated playlist files.
///
/// Some players expect DOS-style `\` separators even on FAT-formatted media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PathSeparator {
    #[default]
    #[serde(rename = "/")]
    Slash,
    #[serde(rename = "\\")]
    Backslash,
}

impl PathSeparator {
    pub fn as_char(self) -> char {
        match self {
            PathSeparator::Slash => '/',
            PathSeparator::Backslash => '\\',
        }
    }
}

impl fmt::Display for PathSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One track as reported by the source library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Absolute path to the audio file.
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            title: None,
            artist: None,
        }
    }

    pub fn with_tags(mut self, title: impl Into<String>, artist: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self.artist = Some(artist.into());
        self
    }

    /// Lyric filename for this track: `"<title> - <artist>.lrcx"`.
    ///
    /// `/` inside either field becomes `&` so the name stays one path segment.
    /// Returns `None` unless both fields are present and non-empty.
    pub fn lyrics_filename(&self) -> Option<String> {
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        let artist = self.artist.as_deref().filter(|a| !a.is_empty())?;
        Some(format!(
            "{} - {}.lrcx",
            title.replace('/', "&"),
            artist.replace('/', "&")
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
