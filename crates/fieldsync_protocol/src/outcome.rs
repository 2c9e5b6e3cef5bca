//! Per-operation merge outcomes.

use crate::record::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why an operation was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RejectReason {
    /// The authoritative record carries an equal or newer timestamp;
    /// the incoming write was discarded wholesale. Expected under
    /// concurrent editing, never surfaced as a user-facing error.
    Conflict,
    /// A persistence-layer failure. The operation stays queued on the
    /// client and is retried on the next connectivity event.
    Error,
    /// The operation failed boundary validation (unknown collection,
    /// missing record id, organization mismatch). Permanent: the
    /// client drops it from the queue and surfaces it to the caller.
    Malformed,
}

/// The result of resolving one operation against the authoritative
/// store.
///
/// Outcomes are idempotent acknowledgements: resubmitting an
/// already-applied operation yields a conflict (its timestamp is no
/// longer newer), and acknowledging the same outcome twice on the
/// client is harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// The operation this outcome answers.
    #[serde(rename = "operationId")]
    pub operation_id: Uuid,
    /// Whether the write was applied to the authoritative store.
    pub applied: bool,
    /// Why it was not applied, when `applied` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    /// The authoritative record after resolution: the stored copy on
    /// an applied create/update, or the winning record on a
    /// conflict. Clients fold its timestamp into their clock and may
    /// use it to refresh a stale optimistic copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Record>,
    /// Human-readable detail for `Error` and `Malformed` outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SyncOutcome {
    /// An applied outcome carrying the stored record.
    #[must_use]
    pub fn applied(operation_id: Uuid, current: Option<Record>) -> Self {
        Self {
            operation_id,
            applied: true,
            reason: None,
            current,
            message: None,
        }
    }

    /// A conflict outcome carrying the winning record.
    #[must_use]
    pub fn conflict(operation_id: Uuid, current: Option<Record>) -> Self {
        Self {
            operation_id,
            applied: false,
            reason: Some(RejectReason::Conflict),
            current,
            message: None,
        }
    }

    /// A retryable per-operation error.
    #[must_use]
    pub fn error(operation_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            operation_id,
            applied: false,
            reason: Some(RejectReason::Error),
            current: None,
            message: Some(message.into()),
        }
    }

    /// A permanent malformed-operation rejection.
    #[must_use]
    pub fn malformed(operation_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            operation_id,
            applied: false,
            reason: Some(RejectReason::Malformed),
            current: None,
            message: Some(message.into()),
        }
    }

    /// Whether the client should keep this operation queued.
    ///
    /// Only retryable errors stay queued; applied, conflicting, and
    /// malformed operations are all retired from the queue.
    #[must_use]
    pub fn retryable(&self) -> bool {
        self.reason == Some(RejectReason::Error)
    }
}
