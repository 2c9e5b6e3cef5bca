//! Record envelopes.

use fieldsync_clock::Hlc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A domain record as it crosses the sync boundary.
///
/// Records are copies, never shared references: the device owns its
/// cached copy, the merge service owns the authoritative one, and
/// consistency comes from timestamp comparison rather than locking.
///
/// The envelope carries the sync-relevant fields; the domain body is
/// an opaque flattened JSON map whose schema belongs to the owning
/// business service, not to the sync engine. Conflict resolution is
/// whole-record: the engine never merges individual fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record id, unique within its collection.
    pub id: Uuid,
    /// Owning organization (tenant boundary).
    #[serde(rename = "organizationId")]
    pub organization_id: Uuid,
    /// Causal timestamp of the most recently accepted write to this
    /// record, anywhere in the system. `None` only for rows seeded
    /// outside the sync path; those always lose to a stamped write.
    #[serde(rename = "hlc", default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<Hlc>,
    /// Opaque domain fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Creates a record envelope with no domain fields.
    #[must_use]
    pub fn new(id: Uuid, organization_id: Uuid) -> Self {
        Self {
            id,
            organization_id,
            last_timestamp: None,
            fields: Map::new(),
        }
    }

    /// Sets a domain field, builder-style.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the causal timestamp, builder-style.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Hlc) -> Self {
        self.last_timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_clock::NodeId;

    #[test]
    fn serde_shape_matches_wire_names() {
        let ts = Hlc::new(0x10, 2, NodeId::new("n").unwrap());
        let record = Record::new(Uuid::nil(), Uuid::nil())
            .with_timestamp(ts)
            .with_field("status", "active");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["organizationId"], json["id"]); // both nil uuids
        assert_eq!(json["hlc"], "000000000010:0002:n");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn missing_hlc_deserializes_as_none() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "organizationId": "550e8400-e29b-41d4-a716-446655440001",
            "name": "Loader 4"
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert!(record.last_timestamp.is_none());
        assert_eq!(record.fields["name"], "Loader 4");
    }

    #[test]
    fn domain_fields_survive_roundtrip() {
        let record = Record::new(Uuid::new_v4(), Uuid::new_v4())
            .with_field("odometer", 120_450)
            .with_field("vin", "1FTFW1E5XKF");
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
