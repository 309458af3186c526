//! Error types for walksync-sync.

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

use walksync_core::ConfigError;

/// All errors that can arise from scanning, reconciling, and applying a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A root directory or a file the plan relies on is missing.
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A track lies outside the configured library root.
    #[error("{path} is not under library root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// An error from configuration or library loading.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience constructor for [`SyncError::Io`].
///
/// `ErrorKind::NotFound` becomes [`SyncError::NotFound`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    let path = path.into();
    if source.kind() == ErrorKind::NotFound {
        return SyncError::NotFound { path };
    }
    SyncError::Io { path, source }
}
