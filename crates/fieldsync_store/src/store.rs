//! The local store contract.

use crate::error::StoreResult;
use fieldsync_protocol::{Collection, PendingOperation, Record};
use uuid::Uuid;

/// Durable on-device storage: per-collection record caches plus the
/// pending-operation queue.
///
/// All operations are local and synchronous; none touch the network.
/// Implementations must serialize concurrent writers against the
/// same collection while allowing distinct collections to proceed
/// concurrently, and a `put` interrupted by process death must leave
/// either the old or the new value, never a torn write.
///
/// The device exclusively owns its store; records held here are
/// cached copies of authoritative state, reconciled by timestamp
/// comparison rather than locking.
pub trait LocalStore: Send + Sync {
    /// Returns every cached record in a collection.
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Record>>;

    /// Returns one cached record by id.
    fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Record>>;

    /// Upserts a record by id.
    fn put(&self, collection: Collection, record: Record) -> StoreResult<()>;

    /// Removes a record by id. Removing an absent record is a no-op.
    fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()>;

    /// Appends an operation to the pending queue.
    fn enqueue(&self, operation: PendingOperation) -> StoreResult<()>;

    /// Returns the pending queue in insertion order.
    fn list_pending(&self) -> StoreResult<Vec<PendingOperation>>;

    /// Retires an acknowledged operation from the queue.
    ///
    /// Dequeuing an id that is no longer present is a no-op, so
    /// duplicate acknowledgements are harmless.
    fn dequeue(&self, operation_id: Uuid) -> StoreResult<()>;
}
