//! File backend: one JSON file per key

use crate::adapter::{PersistenceAdapter, PersistenceConfig};
use crate::error::{PersistenceError, Result};
use lmc_graph::ViewSnapshot;
use std::fmt::Write as _;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Snapshots stored as `<dir>/<escaped key>.json`
///
/// Keys are escaped byte-wise: ASCII letters, digits, `-` and `.` are kept,
/// every other byte (including `_`) becomes `_XX` in upper-case hex. Distinct
/// keys therefore never share a file.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
    config: PersistenceConfig,
}

impl FilePersistence {
    /// Store under `dir` with the default prefix
    ///
    /// The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            config: PersistenceConfig::default(),
        }
    }

    /// With custom settings
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: PersistenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory holding the snapshot files
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name = escape_file_name(&self.config.storage_key(key));
        self.dir.join(format!("{name}.json"))
    }
}

fn escape_file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.') {
            name.push(char::from(byte));
        } else {
            let _ = write!(name, "_{byte:02X}");
        }
    }
    name
}

#[async_trait::async_trait]
impl PersistenceAdapter for FilePersistence {
    async fn load(&self, key: &str) -> Result<Option<ViewSnapshot>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(ViewSnapshot::decode(&raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistenceError::io(path, err)),
        }
    }

    async fn save(&self, key: &str, snapshot: &ViewSnapshot) -> Result<()> {
        let raw = snapshot.to_json()?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?;

        // Write then rename so readers never see a half-written file
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, raw)
            .await
            .map_err(|e| PersistenceError::io(&staging, e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| PersistenceError::io(&path, e))?;

        tracing::debug!(path = %path.display(), "wrote view snapshot");
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PersistenceError::io(path, err)),
        }
    }
}
