//! File-backed local store.

use crate::error::{StoreError, StoreResult};
use crate::identity::NodeIdentity;
use crate::store::LocalStore;
use fieldsync_clock::NodeId;
use fs2::FileExt;
use fieldsync_protocol::{Collection, PendingOperation, Record};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File names within the store directory.
const LOCK_FILE: &str = "LOCK";
const QUEUE_FILE: &str = "queue.json";
const COLLECTIONS_DIR: &str = "collections";

/// A file-backed [`LocalStore`].
///
/// # Layout
///
/// ```text
/// <store_path>/
/// ├─ LOCK                    # advisory lock, single process
/// ├─ node_id                 # persisted device identity
/// ├─ queue.json              # pending-operation queue, in order
/// └─ collections/
///    ├─ assets.json          # one document per collection
///    ├─ work-orders.json
///    └─ ...
/// ```
///
/// # Durability
///
/// Every mutation rewrites the affected document via a temporary
/// file, `sync_all`, an atomic rename, and a directory fsync. A
/// crash at any point leaves the previous document intact.
///
/// # Thread Safety
///
/// Collections are individually locked, so writers to the same
/// collection are serialized while distinct collections (and the
/// queue) proceed concurrently.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    node_id: NodeId,
    collections: HashMap<Collection, RwLock<BTreeMap<Uuid, Record>>>,
    queue: Mutex<Vec<PendingOperation>>,
    _lock_file: File,
}

impl FileStore {
    /// Opens or creates a store at the given directory.
    ///
    /// Loads all persisted collections and the pending queue into
    /// memory, and mints a node identity on first open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if another process holds the
    /// advisory lock, `StoreError::Corrupt` for unparseable
    /// documents, and I/O errors otherwise.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        if !path.is_dir() {
            return Err(StoreError::NotADirectory(path.to_path_buf()));
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked(path.to_path_buf()));
        }

        fs::create_dir_all(path.join(COLLECTIONS_DIR))?;
        let node_id = NodeIdentity::load_or_create(path)?;

        let mut collections = HashMap::new();
        for collection in Collection::ALL {
            let records = load_document::<Vec<Record>>(&collection_path(path, collection))?
                .unwrap_or_default()
                .into_iter()
                .map(|r| (r.id, r))
                .collect();
            collections.insert(collection, RwLock::new(records));
        }

        let queue =
            load_document::<Vec<PendingOperation>>(&path.join(QUEUE_FILE))?.unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            node_id,
            collections,
            queue: Mutex::new(queue),
            _lock_file: lock_file,
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted device identity.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    fn records(&self, collection: Collection) -> &RwLock<BTreeMap<Uuid, Record>> {
        &self.collections[&collection]
    }

    /// Persists one collection document. Called with the collection
    /// write lock held, which serializes same-collection writers.
    fn persist_collection(
        &self,
        collection: Collection,
        records: &BTreeMap<Uuid, Record>,
    ) -> StoreResult<()> {
        let all: Vec<&Record> = records.values().collect();
        write_document(&collection_path(&self.path, collection), &all)
    }

    /// Persists the queue document. Called with the queue lock held.
    fn persist_queue(&self, queue: &[PendingOperation]) -> StoreResult<()> {
        write_document(&self.path.join(QUEUE_FILE), &queue)
    }
}

impl LocalStore for FileStore {
    fn get_all(&self, collection: Collection) -> StoreResult<Vec<Record>> {
        Ok(self.records(collection).read().values().cloned().collect())
    }

    fn get(&self, collection: Collection, id: Uuid) -> StoreResult<Option<Record>> {
        Ok(self.records(collection).read().get(&id).cloned())
    }

    fn put(&self, collection: Collection, record: Record) -> StoreResult<()> {
        let mut records = self.records(collection).write();
        records.insert(record.id, record);
        self.persist_collection(collection, &records)
    }

    fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        let mut records = self.records(collection).write();
        if records.remove(&id).is_some() {
            self.persist_collection(collection, &records)?;
        }
        Ok(())
    }

    fn enqueue(&self, operation: PendingOperation) -> StoreResult<()> {
        let mut queue = self.queue.lock();
        queue.push(operation);
        self.persist_queue(&queue)
    }

    fn list_pending(&self) -> StoreResult<Vec<PendingOperation>> {
        Ok(self.queue.lock().clone())
    }

    fn dequeue(&self, operation_id: Uuid) -> StoreResult<()> {
        let mut queue = self.queue.lock();
        let before = queue.len();
        queue.retain(|op| op.id != operation_id);
        if queue.len() != before {
            self.persist_queue(&queue)?;
        }
        Ok(())
    }
}

fn collection_path(root: &Path, collection: Collection) -> PathBuf {
    root.join(COLLECTIONS_DIR)
        .join(format!("{}.json", collection.name()))
}

/// Reads and parses a JSON document, `None` if absent or empty.
fn load_document<T: serde::de::DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path)?;
    if data.is_empty() {
        return Ok(None);
    }
    let value = serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(value))
}

/// Writes a JSON document atomically.
///
/// Write-then-rename for crash safety:
/// 1. Write to a temporary file next to the target
/// 2. Sync the temporary file to disk
/// 3. Rename over the target
/// 4. Fsync the directory so the rename itself is durable
fn write_document<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let data = serde_json::to_vec(value).map_err(StoreError::Serialize)?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = File::create(&temp_path)?;
    file.write_all(&data)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    if let Some(parent) = path.parent() {
        // Directory fsync is unsupported on some platforms; the
        // rename is still atomic there.
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
