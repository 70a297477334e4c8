//! Persistence errors

use std::path::PathBuf;

/// Failure talking to the backing store
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Reading or writing a snapshot file failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Snapshot could not be encoded
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;
