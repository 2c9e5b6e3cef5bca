//! Persisted device identity.

use crate::error::StoreResult;
use fieldsync_clock::NodeId;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const NODE_ID_FILE: &str = "node_id";

/// Loads or mints the stable per-device node identity.
///
/// The identity is created once per device installation and reused
/// for every timestamp the device ever produces. It is never
/// regenerated unless the store directory itself is wiped.
pub struct NodeIdentity;

impl NodeIdentity {
    /// Reads the persisted node id, minting and persisting one if
    /// the device has none yet.
    pub fn load_or_create(dir: &Path) -> StoreResult<NodeId> {
        let path = dir.join(NODE_ID_FILE);

        if path.exists() {
            let text = fs::read_to_string(&path)?;
            if let Ok(id) = NodeId::new(text.trim()) {
                return Ok(id);
            }
            // Unreadable identity file: mint a replacement rather
            // than refuse to start. The old identity is gone either
            // way.
        }

        let id = NodeId::mint();
        let temp_path = dir.join(format!("{NODE_ID_FILE}.tmp"));
        let mut file = File::create(&temp_path)?;
        file.write_all(id.as_str().as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &path)?;

        Ok(id)
    }
}
