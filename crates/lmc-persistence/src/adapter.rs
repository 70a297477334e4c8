//! Persistence collaborator trait and store helpers

use crate::error::Result;
use lmc_graph::{CanvasStore, ExportOptions, ImportOptions, ViewSnapshot};
use serde::{Deserialize, Serialize};

/// Prefix put in front of every storage key
pub const DEFAULT_KEY_PREFIX: &str = "lmcanvas:view:";

/// Key-value backend for view snapshots
///
/// Keys are caller-chosen names (one per canvas); implementations add their
/// own prefix. Stored data that no longer decodes loads as `None`.
#[async_trait::async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Load the snapshot saved under `key`
    async fn load(&self, key: &str) -> Result<Option<ViewSnapshot>>;

    /// Save `snapshot` under `key`, replacing any previous one
    async fn save(&self, key: &str, snapshot: &ViewSnapshot) -> Result<()>;

    /// Forget the snapshot under `key`
    async fn clear(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// Settings shared by the bundled adapters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PersistenceConfig {
    /// Prefix for storage keys
    pub key_prefix: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Full storage key for `key`
    #[inline]
    #[must_use]
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }
}

/// Export the store's view and save it under `key`
///
/// # Errors
///
/// Returns the adapter's error if saving fails.
pub async fn save_view(
    adapter: &dyn PersistenceAdapter,
    store: &CanvasStore,
    key: &str,
) -> Result<ViewSnapshot> {
    let snapshot = store.export_view_snapshot(ExportOptions::default());
    adapter.save(key, &snapshot).await?;
    tracing::debug!(key, nodes = snapshot.nodes.len(), "saved view snapshot");
    Ok(snapshot)
}

/// Load the view saved under `key` and apply it to the store
///
/// Returns whether a snapshot was found and applied.
///
/// # Errors
///
/// Returns the adapter's error if loading fails.
pub async fn restore_view(
    adapter: &dyn PersistenceAdapter,
    store: &CanvasStore,
    key: &str,
    options: ImportOptions,
) -> Result<bool> {
    match adapter.load(key).await? {
        Some(snapshot) => {
            store.import_view_snapshot(&snapshot, options);
            tracing::debug!(key, "restored view snapshot");
            Ok(true)
        }
        None => Ok(false),
    }
}
