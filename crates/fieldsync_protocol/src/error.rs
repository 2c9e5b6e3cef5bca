//! Error types for protocol validation and codecs.

use thiserror::Error;
use uuid::Uuid;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding, decoding, or validating
/// protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A message body could not be serialized or deserialized.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// An operation failed boundary validation.
    #[error(transparent)]
    Malformed(#[from] MalformedOperation),
}

/// Permanent, non-retryable rejection of a single operation.
///
/// Malformed operations are reported to the caller and dropped; they
/// are never left queued for retry, since resubmitting them cannot
/// change the outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedOperation {
    /// The collection name is not one of the known collections.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// The action name is not create/update/delete.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The causal timestamp could not be parsed.
    #[error("invalid timestamp {text}: {reason}")]
    InvalidTimestamp {
        /// The offending serialized timestamp.
        text: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The payload is missing a usable record id.
    #[error("operation {0} has no record id")]
    MissingRecordId(Uuid),

    /// The operation's organization does not match the record's or
    /// the submitting session's organization.
    #[error("operation {operation_id} crosses organization boundary")]
    OrganizationMismatch {
        /// The rejected operation.
        operation_id: Uuid,
    },
}
