//! The JSON file behind the CLI's event store.

use std::path::Path;

use anyhow::{Context, Result};
use slot_engine::InMemoryStore;

/// Load the store at `path`. A missing file is an empty store.
pub fn load(path: &Path) -> Result<InMemoryStore> {
    if !path.exists() {
        tracing::debug!("No store at {:?}, starting empty", path);
        return Ok(InMemoryStore::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read store: {}", path.display()))?;
    let store: InMemoryStore = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse store: {}", path.display()))?;
    tracing::debug!("Loaded {} events from {:?}", store.len(), path);
    Ok(store)
}

/// Write the store to `path`, replacing it only once the new content is
/// fully on disk.
pub fn save(path: &Path, store: &InMemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace store: {}", path.display()))?;
    tracing::debug!("Saved {} events to {:?}", store.len(), path);
    Ok(())
}
