//! Queue command implementation.

use fieldsync_store::{FileStore, LocalStore};
use serde::Serialize;
use std::path::Path;

/// One pending operation as displayed.
#[derive(Debug, Serialize)]
pub struct QueueEntry {
    /// Position in the queue (enqueue order).
    pub position: usize,
    /// Operation id.
    pub operation_id: String,
    /// Causal timestamp in canonical form.
    pub timestamp: String,
    /// Collection wire name.
    pub collection: &'static str,
    /// Action wire name.
    pub action: &'static str,
    /// Targeted record id.
    pub record_id: String,
}

/// Runs the queue command.
pub fn run(
    path: &Path,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;
    let pending = store.list_pending()?;
    let total = pending.len();

    let entries: Vec<QueueEntry> = pending
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(position, op)| QueueEntry {
            position,
            operation_id: op.id.to_string(),
            timestamp: op.timestamp.to_string(),
            collection: op.collection.name(),
            action: op.action.name(),
            record_id: op.record_id().to_string(),
        })
        .collect();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&entries)?),
        _ => {
            println!("Pending operations: {} (showing {})", total, entries.len());
            for entry in &entries {
                println!(
                    "  [{}] {} {} {} record={} at {}",
                    entry.position,
                    entry.operation_id,
                    entry.action,
                    entry.collection,
                    entry.record_id,
                    entry.timestamp
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_clock::{Hlc, NodeId};
    use fieldsync_protocol::{Collection, PendingOperation, Record, SyncAction};
    use uuid::Uuid;

    #[test]
    fn queue_dump_runs_on_populated_store() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            let org = Uuid::new_v4();
            for n in 0..3 {
                store
                    .enqueue(PendingOperation::new(
                        Hlc::new(1000 + n, 0, NodeId::new("dev").unwrap()),
                        Collection::WorkOrders,
                        SyncAction::Update,
                        Record::new(Uuid::new_v4(), org),
                    ))
                    .unwrap();
            }
        }
        run(dir.path(), Some(2), "text").unwrap();
        run(dir.path(), None, "json").unwrap();
    }
}
