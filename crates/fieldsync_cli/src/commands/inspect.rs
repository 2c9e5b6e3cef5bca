//! Inspect command implementation.

use fieldsync_protocol::Collection;
use fieldsync_store::{FileStore, LocalStore};
use serde::Serialize;
use std::path::Path;

/// Device store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Persisted device identity.
    pub node_id: String,
    /// Cached records across all collections.
    pub record_count: usize,
    /// Operations waiting for acknowledgement.
    pub pending_count: usize,
    /// Per-collection counts (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionStats>>,
}

/// Counts for a single collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    /// Wire name of the collection.
    pub name: &'static str,
    /// Number of cached records.
    pub record_count: usize,
}

/// Runs the inspect command.
pub fn run(
    path: &Path,
    show_collections: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open(path)?;

    let mut record_count = 0;
    let mut collections = Vec::new();
    for collection in Collection::ALL {
        let count = store.get_all(collection)?.len();
        record_count += count;
        collections.push(CollectionStats {
            name: collection.name(),
            record_count: count,
        });
    }

    let result = InspectResult {
        path: path.display().to_string(),
        node_id: store.node_id().to_string(),
        record_count,
        pending_count: store.list_pending()?.len(),
        collections: show_collections.then_some(collections),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("FieldSync Device Store");
    println!("======================");
    println!();
    println!("Path:    {}", result.path);
    println!("Node id: {}", result.node_id);
    println!();
    println!("Records: {}", result.record_count);
    println!("Pending: {}", result.pending_count);

    if let Some(collections) = &result.collections {
        println!();
        println!("Collections:");
        for col in collections {
            println!("  {:<20} {} records", col.name, col.record_count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_protocol::Record;
    use uuid::Uuid;

    #[test]
    fn inspect_counts_records_and_queue() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::open(dir.path()).unwrap();
            let org = Uuid::new_v4();
            store
                .put(Collection::Assets, Record::new(Uuid::new_v4(), org))
                .unwrap();
            store
                .put(Collection::Assets, Record::new(Uuid::new_v4(), org))
                .unwrap();
        }
        run(dir.path(), true, "json").unwrap();
        run(dir.path(), false, "text").unwrap();
    }
}
