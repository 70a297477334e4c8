//! CLI configuration
//!
//! Loaded from an optional TOML file; every section and field may be
//! omitted.
//!
//! ```toml
//! [layout]
//! node_width = 320.0
//!
//! [linear]
//! id_prefix = "turn"
//!
//! [interaction]
//! optimistic = true
//!
//! [persistence]
//! key_prefix = "lmcanvas:view:"
//! dir = "./views"
//! ```

use lmc_graph::{LayoutConfig, LinearGraphOptions};
use lmc_persistence::PersistenceConfig;
use lmc_runner::InteractionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where snapshots live and how keys are formed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Storage key prefix
    pub key_prefix: String,
    /// Snapshot directory
    pub dir: PathBuf,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            key_prefix: PersistenceConfig::default().key_prefix,
            dir: PathBuf::from(".lmcanvas"),
        }
    }
}

impl PersistenceSettings {
    /// Adapter settings
    #[must_use]
    pub fn adapter_config(&self) -> PersistenceConfig {
        PersistenceConfig {
            key_prefix: self.key_prefix.clone(),
        }
    }
}

/// Full CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Store layout
    pub layout: LayoutConfig,
    /// Transcript linearization
    pub linear: LinearGraphOptions,
    /// Demo interaction switches
    pub interaction: InteractionOptions,
    /// Snapshot storage
    pub persistence: PersistenceSettings,
}

/// Configuration loading failure
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl CliConfig {
    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML or field types.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Load `path` if given, defaults otherwise
    ///
    /// # Errors
    ///
    /// See [`CliConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
