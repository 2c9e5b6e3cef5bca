//! Pending operations and their untrusted wire form.

use crate::collection::Collection;
use crate::error::MalformedOperation;
use crate::record::Record;
use fieldsync_clock::Hlc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The kind of mutation an operation carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    /// A new record.
    Create,
    /// A whole-record replacement of an existing record.
    Update,
    /// Removal of a record.
    Delete,
}

impl SyncAction {
    /// Returns the wire name of the action.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SyncAction::Create => "create",
            SyncAction::Update => "update",
            SyncAction::Delete => "delete",
        }
    }

    /// Resolves a wire name to an action.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(SyncAction::Create),
            "update" => Some(SyncAction::Update),
            "delete" => Some(SyncAction::Delete),
            _ => None,
        }
    }
}

/// A queued mutation awaiting acknowledgement.
///
/// Created by the sync coordinator at mutation time, immutable once
/// created, and destroyed only after the merge service acknowledges
/// it (successful application or permanent rejection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Operation id, used to correlate outcomes.
    pub id: Uuid,
    /// Causal timestamp stamped at mutation time.
    #[serde(rename = "hlc")]
    pub timestamp: Hlc,
    /// The collection the payload belongs to.
    pub collection: Collection,
    /// The mutation kind.
    pub action: SyncAction,
    /// The full record payload. For deletes only the envelope fields
    /// matter; the record id names what to delete.
    #[serde(rename = "data")]
    pub payload: Record,
}

impl PendingOperation {
    /// Creates a pending operation with a fresh operation id.
    #[must_use]
    pub fn new(timestamp: Hlc, collection: Collection, action: SyncAction, payload: Record) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            collection,
            action,
            payload,
        }
    }

    /// The id of the record this operation targets.
    #[must_use]
    pub fn record_id(&self) -> Uuid {
        self.payload.id
    }
}

/// The untrusted wire form of an operation.
///
/// Collection and action arrive as strings and the timestamp as its
/// serialized form; [`WireOperation::into_pending`] validates all of
/// them at the boundary, turning anything unknown into a permanent
/// [`MalformedOperation`] instead of a retryable failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOperation {
    /// Operation id.
    pub id: Uuid,
    /// Serialized causal timestamp.
    pub hlc: String,
    /// Collection name as sent by the client.
    pub collection: String,
    /// Action name as sent by the client.
    pub action: String,
    /// Record payload.
    pub data: Value,
}

impl WireOperation {
    /// Validates the wire form into a typed pending operation.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedOperation`] for unknown collections or
    /// actions, unparseable timestamps, and payloads without a
    /// record id. These are permanent rejections.
    pub fn into_pending(self) -> Result<PendingOperation, MalformedOperation> {
        let collection = Collection::from_name(&self.collection)
            .ok_or_else(|| MalformedOperation::UnknownCollection(self.collection.clone()))?;
        let action = SyncAction::from_name(&self.action)
            .ok_or_else(|| MalformedOperation::UnknownAction(self.action.clone()))?;
        let timestamp = Hlc::parse(&self.hlc).map_err(|e| MalformedOperation::InvalidTimestamp {
            text: self.hlc.clone(),
            reason: e.to_string(),
        })?;
        let payload: Record = serde_json::from_value(self.data)
            .map_err(|_| MalformedOperation::MissingRecordId(self.id))?;
        if payload.id.is_nil() {
            return Err(MalformedOperation::MissingRecordId(self.id));
        }

        Ok(PendingOperation {
            id: self.id,
            timestamp,
            collection,
            action,
            payload,
        })
    }
}

impl From<PendingOperation> for WireOperation {
    fn from(op: PendingOperation) -> Self {
        Self {
            id: op.id,
            hlc: op.timestamp.to_string(),
            collection: op.collection.name().to_string(),
            action: op.action.name().to_string(),
            data: serde_json::to_value(&op.payload).unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_clock::NodeId;

    fn stamp() -> Hlc {
        Hlc::new(1000, 0, NodeId::new("n").unwrap())
    }

    fn payload() -> Record {
        Record::new(Uuid::new_v4(), Uuid::new_v4()).with_field("status", "open")
    }

    #[test]
    fn wire_roundtrip_through_validation() {
        let op = PendingOperation::new(stamp(), Collection::WorkOrders, SyncAction::Update, payload());
        let wire: WireOperation = op.clone().into();
        let back = wire.into_pending().unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn unknown_collection_is_permanent_rejection() {
        let mut wire: WireOperation =
            PendingOperation::new(stamp(), Collection::Assets, SyncAction::Create, payload()).into();
        wire.collection = "geofences".into();
        assert_eq!(
            wire.into_pending(),
            Err(MalformedOperation::UnknownCollection("geofences".into()))
        );
    }

    #[test]
    fn unknown_action_rejected() {
        let mut wire: WireOperation =
            PendingOperation::new(stamp(), Collection::Assets, SyncAction::Create, payload()).into();
        wire.action = "upsert".into();
        assert!(matches!(
            wire.into_pending(),
            Err(MalformedOperation::UnknownAction(_))
        ));
    }

    #[test]
    fn bad_timestamp_rejected() {
        let mut wire: WireOperation =
            PendingOperation::new(stamp(), Collection::Assets, SyncAction::Create, payload()).into();
        wire.hlc = "not-a-timestamp".into();
        assert!(matches!(
            wire.into_pending(),
            Err(MalformedOperation::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn nil_record_id_rejected() {
        let record = Record::new(Uuid::nil(), Uuid::new_v4());
        let op = PendingOperation::new(stamp(), Collection::Assets, SyncAction::Create, record);
        let op_id = op.id;
        let wire: WireOperation = op.into();
        assert_eq!(
            wire.into_pending(),
            Err(MalformedOperation::MissingRecordId(op_id))
        );
    }

    #[test]
    fn payload_without_id_field_rejected() {
        let wire = WireOperation {
            id: Uuid::new_v4(),
            hlc: stamp().to_string(),
            collection: "assets".into(),
            action: "create".into(),
            data: serde_json::json!({ "name": "no envelope" }),
        };
        assert!(matches!(
            wire.into_pending(),
            Err(MalformedOperation::MissingRecordId(_))
        ));
    }
}
