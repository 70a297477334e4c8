//! LM Canvas View Persistence
//!
//! Saves and restores [`ViewSnapshot`](lmc_graph::ViewSnapshot)s through a
//! pluggable key-value backend.
//!
//! - [`PersistenceAdapter`]: the backend trait
//! - [`MemoryPersistence`]: process-local, for tests and embedding
//! - [`FilePersistence`]: one JSON file per key
//! - [`save_view`] / [`restore_view`]: move a store's view in and out
//!
//! # Example
//!
//! ```rust
//! use lmc_graph::{CanvasStore, ImportOptions, RootNodeOptions};
//! use lmc_persistence::{restore_view, save_view, MemoryPersistence};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let persistence = MemoryPersistence::new();
//! let store = CanvasStore::new();
//! store.create_root_node(RootNodeOptions::new().with_id("a"));
//!
//! save_view(&persistence, &store, "main").await.unwrap();
//! assert!(restore_view(&persistence, &store, "main", ImportOptions::default()).await.unwrap());
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod error;
pub mod file;
pub mod memory;

// Re-exports
pub use adapter::{
    restore_view, save_view, PersistenceAdapter, PersistenceConfig, DEFAULT_KEY_PREFIX,
};
pub use error::{PersistenceError, Result};
pub use file::FilePersistence;
pub use memory::MemoryPersistence;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
