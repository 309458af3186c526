//! YAML configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.walksync/
//!   config.yaml      (default location; `--config` overrides)
//! ```
//!
//! # API pattern
//!
//! Every function touching the home directory has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Relative paths inside a config file are resolved against the directory
//! holding that file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{PathSeparator, PlaylistName};

/// Staleness tolerance applied when no value is configured (0.01 s).
pub const DEFAULT_MTIME_EPSILON_MS: u64 = 10;

// ---------------------------------------------------------------------------
// 1. Schema
// ---------------------------------------------------------------------------

/// Root of the walksync configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the library manifest (see [`crate::library::LibraryManifest`]).
    pub library: PathBuf,
    /// Source root shared by every track. Derived from the track list when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_root: Option<PathBuf>,
    pub playlists: Vec<PlaylistName>,
    /// Music directory on the mounted device.
    pub device_dir: PathBuf,
    pub music_extensions: Vec<String>,
    pub remove_unmatched: bool,
    /// Extensions that are never deleted from the device, even when unmatched.
    pub protected_extensions: Vec<String>,
    pub mtime_epsilon_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<LyricsConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<PlaylistConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: PathBuf::from("library.yaml"),
            library_root: None,
            playlists: Vec::new(),
            device_dir: PathBuf::new(),
            music_extensions: vec![".mp3".to_string(), ".m4a".to_string(), ".flac".to_string()],
            remove_unmatched: false,
            protected_extensions: Vec::new(),
            mtime_epsilon_ms: DEFAULT_MTIME_EPSILON_MS,
            lyrics: None,
            playlist: None,
        }
    }
}

/// Lyric file synchronization settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    /// Local directory holding `<title> - <artist>.lrcx` files.
    pub source_dir: PathBuf,
    /// Lyrics directory on the device. Falls back to `device_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_dir: Option<PathBuf>,
    pub extensions: Vec<String>,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            device_dir: None,
            extensions: vec![".lrcx".to_string()],
        }
    }
}

/// Generated playlist file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Prepended to every entry, e.g. `MUSIC/` when playlists live one level up.
    pub prefix: String,
    pub separator: PathSeparator,
}

impl Config {
    /// Tolerance for modification-time comparison.
    pub fn mtime_epsilon(&self) -> Duration {
        Duration::from_millis(self.mtime_epsilon_ms)
    }

    /// Device directory receiving lyric files.
    pub fn lyrics_device_dir(&self) -> Option<&Path> {
        self.lyrics
            .as_ref()
            .map(|l| l.device_dir.as_deref().unwrap_or(&self.device_dir))
    }

    /// Reject values the sync engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                reason: "device_dir must be set".to_string(),
            });
        }
        let mut extensions: Vec<&String> = self
            .music_extensions
            .iter()
            .chain(self.protected_extensions.iter())
            .collect();
        if let Some(lyrics) = &self.lyrics {
            if lyrics.source_dir.as_os_str().is_empty() {
                return Err(ConfigError::Invalid {
                    reason: "lyrics.source_dir must be set when a lyrics section is present"
                        .to_string(),
                });
            }
            extensions.extend(lyrics.extensions.iter());
        }
        if let Some(bad) = extensions.into_iter().find(|e| !is_valid_extension(e)) {
            return Err(ConfigError::Invalid {
                reason: format!("extension '{bad}' must start with '.', e.g. '.mp3'"),
            });
        }
        Ok(())
    }

    fn resolve_relative(&mut self, base: &Path) {
        resolve(&mut self.library, base);
        if let Some(root) = self.library_root.as_mut() {
            resolve(root, base);
        }
        resolve(&mut self.device_dir, base);
        if let Some(lyrics) = self.lyrics.as_mut() {
            resolve(&mut lyrics.source_dir, base);
            if let Some(dir) = lyrics.device_dir.as_mut() {
                resolve(dir, base);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// 2. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.walksync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".walksync").join("config.yaml")
}

/// `config_path_at` convenience wrapper.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_path_at(&home()?))
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load and validate the configuration stored at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let mut config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(base) = path.parent() {
        config.resolve_relative(base);
    }
    config.validate()?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Load `<home>/.walksync/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load_from(&config_path_at(home))
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, ConfigError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem: no EXDEV).
pub fn save_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

fn resolve(path: &mut PathBuf, base: &Path) {
    if !path.as_os_str().is_empty() && path.is_relative() {
        *path = base.join(&*path);
    }
}

fn is_valid_extension(ext: &str) -> bool {
    ext.len() > 1 && ext.starts_with('.') && !ext[1..].contains(['.', '/'])
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
