//! In-memory store for tests and ephemeral devices.

use crate::error::StoreResult;
use crate::store::LocalStore;
use fieldsync_protocol::{Collection, PendingOperation, Record};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// An in-memory [`LocalStore`].
///
/// Semantically identical to [`crate::FileStore`] minus persistence.
/// Suitable for unit tests, simulations, and devices that do not
/// need state to survive a restart.
#[derive(Debug)]
pub struct MemoryStore {
    collections: HashMap<Collection, RwLock<BTreeMap<Uuid, Record>>>,
    queue: Mutex<Vec<PendingOperation>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let collections = Collection::ALL
            .iter()
            .map(|c| (*c, RwLock::new(BTreeMap::new())))
            .collect();
        Self {
            collections,
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Number of operations currently queued.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.lock().len()
    }

    fn records(&self, collection: Collection) -> &RwLock<BTreeMap<Uuid, Record>> {
        // The map is keyed by the closed Collection enum and seeded
        // with every variant in `new`.
        &self.collections[&collection]
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore for MemoryStore {
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        Ok(self.records(collection).read().values().cloned().collect())
    }

    fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Record>> {
        Ok(self.records(collection).read().get(&id).cloned())
    }

    fn put(&self, collection: Collection, record: Record) -> StoreResult<()> {
        self.records(collection).write().insert(record.id, record);
        Ok(())
    }

    fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        self.records(collection).write().remove(&id);
        Ok(())
    }

    fn enqueue(&self, operation: PendingOperation) -> StoreResult<()> {
        self.queue.lock().push(operation);
        Ok(())
    }

    fn list_pending(&self) -> StoreResult<Vec<PendingOperation>> {
        Ok(self.queue.lock().clone())
    }

    fn dequeue(&self, operation_id: Uuid) -> StoreResult<()> {
        self.queue.lock().retain(|op| op.id != operation_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_clock::{Hlc, NodeId};
    use fieldsync_protocol::SyncAction;

    fn record() -> Record {
        Record::new(Uuid::new_v4(), Uuid::new_v4()).with_field("name", "Excavator 2")
    }

    fn operation(counter: u16) -> PendingOperation {
        PendingOperation::new(
            Hlc::new(1000, counter, NodeId::new("dev").unwrap()),
            Collection::Assets,
            SyncAction::Update,
            record(),
        )
    }

    #[test]
    fn put_get_delete() {
        let store = MemoryStore::new();
        let rec = record();
        let id = rec.id;

        store.put(Collection::Assets, rec.clone()).unwrap();
        assert_eq!(store.get(Collection::Assets, id).unwrap(), Some(rec));
        assert_eq!(store.get_all(Collection::Assets).unwrap().len(), 1);

        // Other collections are untouched.
        assert!(store.get(Collection::Inventory, id).unwrap().is_none());

        store.delete(Collection::Assets, id).unwrap();
        assert!(store.get(Collection::Assets, id).unwrap().is_none());
    }

    #[test]
    fn put_is_upsert() {
        let store = MemoryStore::new();
        let rec = record();
        let id = rec.id;
        store.put(Collection::Assets, rec.clone()).unwrap();

        let updated = rec.with_field("name", "Excavator 2B");
        store.put(Collection::Assets, updated.clone()).unwrap();

        assert_eq!(store.get(Collection::Assets, id).unwrap(), Some(updated));
        assert_eq!(store.get_all(Collection::Assets).unwrap().len(), 1);
    }

    #[test]
    fn queue_preserves_insertion_order() {
        let store = MemoryStore::new();
        let ops = vec![operation(0), operation(1), operation(2)];
        for op in &ops {
            store.enqueue(op.clone()).unwrap();
        }
        assert_eq!(store.list_pending().unwrap(), ops);
    }

    #[test]
    fn dequeue_is_idempotent() {
        let store = MemoryStore::new();
        let op = operation(0);
        store.enqueue(op.clone()).unwrap();

        store.dequeue(op.id).unwrap();
        store.dequeue(op.id).unwrap(); // duplicate ack, harmless
        assert!(store.list_pending().unwrap().is_empty());
    }
}
