//! LM Canvas Graph Store
//!
//! In-memory store for a branching conversation graph. Each node holds an
//! ordered message list; edges record where a conversation was forked.
//!
//! # Core Components
//!
//! - [`CanvasStore`]: shared handle owning the graph snapshot
//! - [`NodeChange`] / [`EdgeChange`]: renderer change batches
//! - [`segment_turns`] / [`build_linear_graph`]: bootstrap a graph from a transcript
//! - [`ViewSnapshot`]: persistable layout (positions, camera, focus)
//!
//! # Example
//!
//! ```rust
//! use lmc_graph::{BranchOptions, CanvasStore, RootNodeOptions};
//! use lmc_message::Message;
//!
//! let store = CanvasStore::new();
//! let root = store.create_root_node(
//!     RootNodeOptions::new().with_messages(vec![Message::user("hello")]),
//! );
//! let child = store.branch_node(&root, BranchOptions::new()).unwrap();
//!
//! assert_eq!(store.node_messages(&child).len(), 1);
//! assert_eq!(store.edges().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod changes;
pub mod config;
pub mod linear;
pub mod store;
pub mod types;
pub mod view;

// Re-exports
pub use changes::{apply_edge_changes, apply_node_changes, EdgeChange, NodeChange};
pub use config::LayoutConfig;
pub use linear::{build_linear_graph, segment_turns, LinearGraph, LinearGraphOptions};
pub use store::{BranchOptions, CanvasStore, GraphState, RootNodeOptions};
pub use types::{
    Dimensions, GraphEdge, GraphNode, NodeData, NodeDataPatch, NodeId, NodeStatus, Position,
};
pub use view::{Camera, ExportOptions, ImportOptions, NodeViewState, SnapshotError, ViewSnapshot};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the graph store
    pub use crate::{
        BranchOptions, CanvasStore, GraphEdge, GraphNode, NodeChange, NodeDataPatch, NodeId,
        NodeStatus, Position, RootNodeOptions, ViewSnapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
