//! Core graph types
//!
//! Defines the values held by the graph store:
//! - Node identifiers and positions
//! - Node status and the per-node data block
//! - Graph nodes and the edges linking them

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use chrono::{DateTime, Utc};
use lmc_message::Message;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use uuid::Uuid;

/// Node type tag understood by the renderer
pub const MESSAGE_NODE_TYPE: &str = "message";

/// Edge type tag understood by the renderer
pub const DEFAULT_EDGE_TYPE: &str = "default";

/// Handle on the parent side of an edge
pub const SOURCE_HANDLE_ID: &str = "source";

/// Handle on the child side of an edge
pub const TARGET_HANDLE_ID: &str = "target";

/// Unique node identifier
///
/// Caller-supplied or generated. Generated ids are UUIDv4 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Wrap an existing id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, collision-resistant id
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 2-D canvas position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a position
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Measured size reported by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in canvas units
    pub width: f64,
    /// Height in canvas units
    pub height: f64,
}

/// Interaction status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// A send is in flight
    Loading,
    /// Last send finished
    Completed,
    /// Last send failed
    Error,
}

impl NodeStatus {
    /// Whether the status ends an interaction
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Error)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Loading => "loading",
            NodeStatus::Completed => "completed",
            NodeStatus::Error => "error",
        };
        f.write_str(name)
    }
}

fn default_width() -> f64 {
    DEFAULT_NODE_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_NODE_HEIGHT
}

/// Data block carried by every node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    /// Interaction status
    #[serde(default)]
    pub status: NodeStatus,
    /// Ordered message list
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Nodes this one was branched from
    #[serde(default)]
    pub parent_ids: Vec<NodeId>,
    /// Nodes branched from this one, in creation order
    #[serde(default)]
    pub child_ids: Vec<NodeId>,
    /// Layout width hint
    #[serde(default = "default_width")]
    pub width: f64,
    /// Layout height hint
    #[serde(default = "default_height")]
    pub height: f64,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl NodeData {
    /// Idle data block holding `messages`, created now
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            status: NodeStatus::Idle,
            messages,
            parent_ids: Vec::new(),
            child_ids: Vec::new(),
            width: DEFAULT_NODE_WIDTH,
            height: DEFAULT_NODE_HEIGHT,
            created_at: Utc::now(),
        }
    }

    /// With size hints
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// With parent ids
    #[inline]
    #[must_use]
    pub fn with_parents(mut self, parent_ids: Vec<NodeId>) -> Self {
        self.parent_ids = parent_ids;
        self
    }
}

impl Default for NodeData {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Partial update of a [`NodeData`] block
///
/// Every present field replaces the corresponding field; absent fields are
/// left untouched (shallow merge).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDataPatch {
    /// New status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    /// New message list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// New parent ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_ids: Option<Vec<NodeId>>,
    /// New child ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_ids: Option<Vec<NodeId>>,
    /// New width hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// New height hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// New creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NodeDataPatch {
    /// Patch that only sets the status
    #[inline]
    #[must_use]
    pub fn status(status: NodeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Patch that only replaces the messages
    #[inline]
    #[must_use]
    pub fn messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Some(messages),
            ..Self::default()
        }
    }

    /// With size hints
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Merge into `data`
    pub fn apply_to(self, data: &mut NodeData) {
        if let Some(status) = self.status {
            data.status = status;
        }
        if let Some(messages) = self.messages {
            data.messages = messages;
        }
        if let Some(parent_ids) = self.parent_ids {
            data.parent_ids = parent_ids;
        }
        if let Some(child_ids) = self.child_ids {
            data.child_ids = child_ids;
        }
        if let Some(width) = self.width {
            data.width = width;
        }
        if let Some(height) = self.height {
            data.height = height;
        }
        if let Some(created_at) = self.created_at {
            data.created_at = created_at;
        }
    }
}

/// A conversation node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique, immutable id
    pub id: NodeId,
    /// Renderer node type
    #[serde(rename = "type", default = "message_node_type")]
    pub kind: String,
    /// Canvas position
    pub position: Position,
    /// Conversation data
    pub data: NodeData,
    /// Selected in the renderer
    #[serde(default)]
    pub selected: bool,
    /// Being dragged in the renderer
    #[serde(default)]
    pub dragging: bool,
    /// Being resized in the renderer
    #[serde(default)]
    pub resizing: bool,
    /// Size measured by the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

fn message_node_type() -> String {
    MESSAGE_NODE_TYPE.to_string()
}

impl GraphNode {
    /// Message node at `position` with `data`
    #[must_use]
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self {
            id,
            kind: message_node_type(),
            position,
            data,
            selected: false,
            dragging: false,
            resizing: false,
            dimensions: None,
        }
    }

    /// Messages held by the node
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.data.messages
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> NodeStatus {
        self.data.status
    }
}

/// Directed parent -> child link recording a branch point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// `e-{source}-{target}`
    pub id: String,
    /// Parent node
    pub source: NodeId,
    /// Child node
    pub target: NodeId,
    /// Handle on the parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Handle on the child
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Renderer edge type
    #[serde(rename = "type", default = "default_edge_type")]
    pub kind: String,
    /// Selected in the renderer
    #[serde(default)]
    pub selected: bool,
}

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

impl GraphEdge {
    /// Edge id for a parent/child pair
    #[inline]
    #[must_use]
    pub fn edge_id(source: &str, target: &str) -> String {
        format!("e-{source}-{target}")
    }

    /// Branch edge from `source` to `target` using the fixed handles
    #[must_use]
    pub fn link(source: NodeId, target: NodeId) -> Self {
        Self {
            id: Self::edge_id(&source, &target),
            source,
            target,
            source_handle: Some(SOURCE_HANDLE_ID.to_string()),
            target_handle: Some(TARGET_HANDLE_ID.to_string()),
            kind: default_edge_type(),
            selected: false,
        }
    }
}
