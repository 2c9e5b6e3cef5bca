//! Error types for the merge server.

use crate::authority::AuthorityError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Batch-level errors.
///
/// Per-operation failures never surface here; they are reported as
/// individual [`fieldsync_protocol::SyncOutcome`]s so independent
/// operations in the same batch keep being evaluated.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request itself was unacceptable (oversized batch,
    /// undecodable body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A request or response body could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// An authority failure outside per-operation resolution.
    #[error("authority error: {0}")]
    Authority(#[from] AuthorityError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_request_display() {
        let err = ServerError::InvalidRequest("too many operations".into());
        assert!(err.to_string().contains("too many operations"));
    }
}
