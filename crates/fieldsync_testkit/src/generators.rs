//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random sync data that
//! maintains required invariants.

use fieldsync_clock::{Hlc, NodeId};
use fieldsync_protocol::{Collection, PendingOperation, Record, SyncAction};
use proptest::prelude::*;
use uuid::Uuid;

/// Strategy for generating valid node ids.
pub fn node_id_strategy() -> impl Strategy<Value = NodeId> {
    prop::string::string_regex("[a-z0-9-]{1,36}")
        .expect("valid regex")
        .prop_map(|s| NodeId::new(s).expect("generated node id is valid"))
}

/// Strategy for generating timestamps. Physical values stay within
/// the 48-bit canonical-form range.
pub fn hlc_strategy() -> impl Strategy<Value = Hlc> {
    (0u64..(1 << 48), any::<u16>(), node_id_strategy())
        .prop_map(|(physical, counter, node)| Hlc::new(physical, counter, node))
}

/// Strategy for generating collections.
pub fn collection_strategy() -> impl Strategy<Value = Collection> {
    prop::sample::select(&Collection::ALL[..])
}

/// Strategy for generating sync actions.
pub fn action_strategy() -> impl Strategy<Value = SyncAction> {
    prop_oneof![
        Just(SyncAction::Create),
        Just(SyncAction::Update),
        Just(SyncAction::Delete),
    ]
}

/// Strategy for generating uuids.
pub fn uuid_strategy() -> impl Strategy<Value = Uuid> {
    prop::array::uniform16(any::<u8>()).prop_map(Uuid::from_bytes)
}

/// Strategy for generating records with a few opaque domain fields.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (
        uuid_strategy(),
        uuid_strategy(),
        prop::option::of(hlc_strategy()),
        prop::collection::btree_map(
            prop::string::string_regex("[a-z]{1,10}").expect("valid regex"),
            any::<i64>(),
            0..4,
        ),
    )
        .prop_map(|(id, organization_id, timestamp, fields)| {
            let mut record = Record::new(id, organization_id);
            record.last_timestamp = timestamp;
            for (key, value) in fields {
                record = record.with_field(key, value);
            }
            record
        })
}

/// Strategy for generating pending operations.
pub fn operation_strategy() -> impl Strategy<Value = PendingOperation> {
    (
        hlc_strategy(),
        collection_strategy(),
        action_strategy(),
        record_strategy(),
    )
        .prop_map(|(timestamp, collection, action, payload)| {
            PendingOperation::new(timestamp, collection, action, payload)
        })
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn hlc_roundtrips_through_canonical_form(ts in hlc_strategy()) {
            let parsed: Hlc = ts.to_string().parse().expect("canonical form parses");
            prop_assert_eq!(parsed, ts);
        }

        #[test]
        fn record_roundtrips_through_json(record in record_strategy()) {
            let json = serde_json::to_string(&record).expect("encodes");
            let back: Record = serde_json::from_str(&json).expect("decodes");
            prop_assert_eq!(back, record);
        }

        #[test]
        fn generated_operations_validate_at_the_boundary(op in operation_strategy()) {
            use fieldsync_protocol::WireOperation;
            let wire: WireOperation = op.clone().into();
            if op.record_id().is_nil() {
                prop_assert!(wire.into_pending().is_err());
            } else {
                prop_assert_eq!(wire.into_pending().expect("validates"), op);
            }
        }
    }
}
