//! Error types for the local store.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during local store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A persisted document could not be parsed.
    #[error("corrupt store file {path}: {source}")]
    Corrupt {
        /// The offending file.
        path: PathBuf,
        /// The underlying parse failure.
        source: serde_json::Error,
    },

    /// A record or queue entry could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(serde_json::Error),

    /// Another process holds the store lock.
    #[error("store directory is locked by another process: {0}")]
    Locked(PathBuf),

    /// The store path exists but is not a directory.
    #[error("store path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_path() {
        let err = StoreError::Locked(PathBuf::from("/tmp/device"));
        assert!(err.to_string().contains("/tmp/device"));
    }
}
