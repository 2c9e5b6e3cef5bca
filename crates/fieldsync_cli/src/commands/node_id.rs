//! Node-id command implementation.

use fieldsync_store::NodeIdentity;
use std::path::Path;

/// Runs the node-id command. Mints and persists an identity when the
/// directory has none yet.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(path)?;
    let node = NodeIdentity::load_or_create(path)?;
    println!("{node}");
    Ok(())
}
