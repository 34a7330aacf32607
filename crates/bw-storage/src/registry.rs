//! The `presets.json` registry.
//!
//! Writes are last-writer-wins: a merge reads the current registry, applies
//! updates by id and writes the whole document back.

use bw_models::{fallback_presets, merge_presets, Preset, PRESETS_OBJECT};
use tracing::{info, warn};

use crate::error::StorageResult;
use crate::store::ObjectStore;

/// Read and parse the registry.
pub async fn load_presets(store: &dyn ObjectStore) -> StorageResult<Vec<Preset>> {
    let data = store.read(PRESETS_OBJECT).await?;
    Ok(serde_json::from_slice(&data)?)
}

/// Read the registry, substituting the built-in list if it cannot be read.
pub async fn load_presets_or_fallback(store: &dyn ObjectStore) -> Vec<Preset> {
    match load_presets(store).await {
        Ok(presets) => presets,
        Err(e) => {
            warn!("Failed to read {} (using fallback): {}", PRESETS_OBJECT, e);
            fallback_presets()
        }
    }
}

/// Overwrite the registry with `presets`, pretty-printed.
pub async fn save_presets(store: &dyn ObjectStore, presets: &[Preset]) -> StorageResult<()> {
    let data = serde_json::to_vec_pretty(presets)?;
    store.upload(data, PRESETS_OBJECT, "application/json").await?;
    Ok(())
}

/// Merge `updates` into the stored registry by id and write it back.
///
/// A missing or unparseable registry is treated as empty. Returns the list
/// that was written.
pub async fn update_presets(
    store: &dyn ObjectStore,
    updates: Vec<Preset>,
) -> StorageResult<Vec<Preset>> {
    info!("Updating {}...", PRESETS_OBJECT);

    let existing = match load_presets(store).await {
        Ok(presets) => presets,
        Err(e) => {
            if !e.is_not_found() {
                warn!("Existing {} unreadable, starting empty: {}", PRESETS_OBJECT, e);
            }
            Vec::new()
        }
    };

    let merged = merge_presets(existing, updates);
    save_presets(store, &merged).await?;

    info!(count = merged.len(), "Registry updated successfully");
    Ok(merged)
}
