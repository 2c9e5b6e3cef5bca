//! Test fixtures and device store helpers.
//!
//! Provides convenience builders for records and operations and a
//! temp-dir device store with automatic cleanup.

use fieldsync_clock::{Hlc, NodeId};
use fieldsync_protocol::{Collection, PendingOperation, Record, SyncAction};
use fieldsync_store::FileStore;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// A deterministic node id for tests.
pub fn test_node(name: &str) -> NodeId {
    NodeId::new(name).expect("valid test node id")
}

/// A timestamp at the given physical millisecond, counter zero.
pub fn stamp_at(physical: u64, node: &str) -> Hlc {
    Hlc::new(physical, 0, test_node(node))
}

/// A work-order record with a status field.
pub fn work_order(organization: Uuid, status: &str) -> Record {
    Record::new(Uuid::new_v4(), organization).with_field("status", status)
}

/// An asset record with a name field.
pub fn asset(organization: Uuid, name: &str) -> Record {
    Record::new(Uuid::new_v4(), organization).with_field("name", name)
}

/// A stamped pending operation over the given record.
pub fn operation_at(
    physical: u64,
    node: &str,
    collection: Collection,
    action: SyncAction,
    payload: Record,
) -> PendingOperation {
    PendingOperation::new(stamp_at(physical, node), collection, action, payload)
}

/// A device store in a temporary directory with automatic cleanup.
pub struct TestStore {
    /// The open store.
    pub store: FileStore,
    /// Keeps the directory alive until the fixture drops.
    _temp_dir: TempDir,
}

impl TestStore {
    /// Opens a fresh device store in a temp directory.
    pub fn open() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let store = FileStore::open(temp_dir.path()).expect("failed to open device store");
        Self {
            store,
            _temp_dir: temp_dir,
        }
    }

    /// The store's directory, for reopen tests.
    pub fn path(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl std::ops::Deref for TestStore {
    type Target = FileStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary device store.
pub fn with_device_store<F, R>(f: F) -> R
where
    F: FnOnce(&FileStore) -> R,
{
    let fixture = TestStore::open();
    f(&fixture.store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_store::LocalStore;

    #[test]
    fn device_store_fixture_works() {
        with_device_store(|store| {
            let org = Uuid::new_v4();
            let record = asset(org, "crane");
            store.put(Collection::Assets, record.clone()).unwrap();
            assert_eq!(
                store.get(Collection::Assets, record.id).unwrap(),
                Some(record)
            );
        });
    }

    #[test]
    fn operation_fixture_is_stamped() {
        let org = Uuid::new_v4();
        let op = operation_at(
            1000,
            "device-a",
            Collection::WorkOrders,
            SyncAction::Create,
            work_order(org, "open"),
        );
        assert_eq!(op.timestamp, stamp_at(1000, "device-a"));
        assert!(!op.record_id().is_nil());
    }
}
