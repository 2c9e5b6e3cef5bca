//! Error types for the sync coordinator.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mutating or synchronizing.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the submission can be retried.
        retryable: bool,
    },

    /// Protocol error (undecodable or mismatched response).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server permanently rejected a mutation.
    #[error("server rejected operation: {0}")]
    Rejected(String),

    /// The mutation is unusable before it reaches the queue
    /// (a record id is required for updates and deletes).
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    /// Local store failure.
    #[error("store error: {0}")]
    Store(#[from] fieldsync_store::StoreError),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,

    /// Not connected.
    #[error("not connected to server")]
    NotConnected,
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if retrying on the next connectivity event can
    /// succeed. Queued operations survive every retryable failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Timeout | SyncError::NotConnected => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection lost").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Timeout.is_retryable());
        assert!(SyncError::NotConnected.is_retryable());
        assert!(!SyncError::Rejected("bad collection".into()).is_retryable());
        assert!(!SyncError::InvalidMutation("missing id".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        assert_eq!(
            SyncError::NotConnected.to_string(),
            "not connected to server"
        );
        assert!(SyncError::Rejected("unknown collection".into())
            .to_string()
            .contains("unknown collection"));
    }
}
