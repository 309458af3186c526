//! walksync core library: domain types, configuration, library providers.
//!
//! - [`types`]: tracks, playlist names, separator styles
//! - [`config`]: YAML configuration load / save
//! - [`library`]: the [`TrackProvider`] seam and its manifest implementation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod library;
pub mod types;

pub use config::{Config, LyricsConfig, PlaylistConfig};
pub use error::ConfigError;
pub use library::{LibraryManifest, StaticLibrary, TrackProvider};
pub use types::{PathSeparator, PlaylistName, Track};
