//! In-memory backend

use crate::adapter::{PersistenceAdapter, PersistenceConfig};
use crate::error::Result;
use dashmap::DashMap;
use lmc_graph::ViewSnapshot;

/// Snapshots kept as raw JSON in a concurrent map
///
/// Storing the encoded form keeps load behavior identical to the durable
/// backends, including discarding entries that fail to decode.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    config: PersistenceConfig,
    entries: DashMap<String, String>,
}

impl MemoryPersistence {
    /// Empty store with the default prefix
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with custom settings
    #[must_use]
    pub fn with_config(config: PersistenceConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    /// Put raw data under `key`, bypassing encoding
    pub fn insert_raw(&self, key: &str, raw: impl Into<String>) {
        self.entries.insert(self.config.storage_key(key), raw.into());
    }

    /// Raw data stored under `key`
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .get(&self.config.storage_key(key))
            .map(|entry| entry.value().clone())
    }

    /// Number of stored snapshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl PersistenceAdapter for MemoryPersistence {
    async fn load(&self, key: &str) -> Result<Option<ViewSnapshot>> {
        Ok(self.raw(key).and_then(|raw| ViewSnapshot::decode(&raw)))
    }

    async fn save(&self, key: &str, snapshot: &ViewSnapshot) -> Result<()> {
        let raw = snapshot.to_json()?;
        self.entries.insert(self.config.storage_key(key), raw);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        self.entries.remove(&self.config.storage_key(key));
        Ok(())
    }
}
