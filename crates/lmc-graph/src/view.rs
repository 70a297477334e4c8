//! View snapshot codec
//!
//! A view snapshot records where nodes sit on the canvas, their size hints,
//! the focused node and the camera. It carries no messages; it is layered on
//! top of a graph that already exists.

use crate::store::{CanvasStore, GraphState};
use crate::types::{NodeId, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Snapshot format version written and accepted
pub const VIEW_SNAPSHOT_VERSION: u32 = 1;

/// Canvas viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Horizontal offset
    pub x: f64,
    /// Vertical offset
    pub y: f64,
    /// Zoom factor
    pub zoom: f64,
}

impl Camera {
    /// Create a camera
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }
}

/// Saved layout of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeViewState {
    /// Node id; the key in [`ViewSnapshot::nodes`] is authoritative
    #[serde(default)]
    pub id: NodeId,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Width hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Height hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Why a raw snapshot was rejected
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Not JSON, or fields of the wrong shape
    #[error("malformed view snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Written by an incompatible version
    #[error("unsupported view snapshot version: {0:?}")]
    UnsupportedVersion(Option<f64>),

    /// `nodes` absent or not an object
    #[error("view snapshot has no node map")]
    MissingNodes,
}

/// Persistable view state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// Format version, always [`VIEW_SNAPSHOT_VERSION`]
    pub version: u32,
    /// When the snapshot was taken; absent or unreadable stamps load as `None`
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<DateTime<Utc>>,
    /// Focused node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_node_id: Option<NodeId>,
    /// Viewport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
    /// Node layouts keyed by id
    pub nodes: BTreeMap<NodeId, NodeViewState>,
}

impl ViewSnapshot {
    /// Parse a raw snapshot, reporting why it was rejected
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the input is not JSON, has a version
    /// other than [`VIEW_SNAPSHOT_VERSION`] or lacks a `nodes` object.
    /// Any numeric spelling of the version (`1`, `1.0`) is accepted.
    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        let mut value: Value = serde_json::from_str(raw)?;

        let version = value.get("version").and_then(Value::as_f64);
        let supported = f64::from(VIEW_SNAPSHOT_VERSION);
        if !version.is_some_and(|v| (v - supported).abs() < f64::EPSILON) {
            return Err(SnapshotError::UnsupportedVersion(version));
        }
        if !value.get("nodes").is_some_and(Value::is_object) {
            return Err(SnapshotError::MissingNodes);
        }

        value["version"] = Value::from(VIEW_SNAPSHOT_VERSION);
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a raw snapshot, discarding anything invalid
    #[must_use]
    pub fn decode(raw: &str) -> Option<Self> {
        match Self::parse(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::debug!(error = %err, "discarding view snapshot");
                None
            }
        }
    }

    /// Serialize to JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Layout saved for `id`
    #[inline]
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeViewState> {
        self.nodes.get(id)
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|at| at.with_timezone(&Utc)))
}

/// Overrides for [`CanvasStore::export_view_snapshot`]
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Record this node as focused instead of the store's
    pub active_node_id: Option<NodeId>,
    /// Record this camera instead of the store's
    pub camera: Option<Camera>,
}

/// Switches for [`CanvasStore::import_view_snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Restore the saved camera
    pub apply_camera: bool,
    /// Restore the saved focused node
    pub apply_active_node: bool,
}

impl ImportOptions {
    /// Layout only, leaving camera and focus alone
    #[must_use]
    pub fn layout_only() -> Self {
        Self {
            apply_camera: false,
            apply_active_node: false,
        }
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            apply_camera: true,
            apply_active_node: true,
        }
    }
}

fn export_from(state: &GraphState, options: ExportOptions) -> ViewSnapshot {
    let nodes = state
        .nodes()
        .map(|node| {
            let view = NodeViewState {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
                width: Some(node.data.width),
                height: Some(node.data.height),
            };
            (node.id.clone(), view)
        })
        .collect();

    ViewSnapshot {
        version: VIEW_SNAPSHOT_VERSION,
        saved_at: Some(Utc::now()),
        active_node_id: options
            .active_node_id
            .or_else(|| state.active_node_id().cloned()),
        camera: options.camera.or_else(|| state.camera()),
        nodes,
    }
}

impl CanvasStore {
    /// Capture the current layout
    #[must_use]
    pub fn export_view_snapshot(&self, options: ExportOptions) -> ViewSnapshot {
        export_from(&self.snapshot(), options)
    }

    /// Restore a saved layout onto existing nodes
    ///
    /// Nodes are matched by their key in the snapshot's node map. Ids
    /// missing from the store are skipped; no node is ever created. When
    /// enabled, camera and focus are replaced outright, so a snapshot
    /// without them clears the store's values.
    pub fn import_view_snapshot(&self, snapshot: &ViewSnapshot, options: ImportOptions) {
        let mut skipped = 0usize;

        self.update(|state| {
            let mut next = state.clone();

            for (id, view) in &snapshot.nodes {
                let Some(existing) = next.nodes_by_id.get_mut(id) else {
                    skipped += 1;
                    continue;
                };
                let node = Arc::make_mut(existing);
                node.position = Position::new(view.x, view.y);
                if let Some(width) = view.width {
                    node.data.width = width;
                }
                if let Some(height) = view.height {
                    node.data.height = height;
                }
            }

            if options.apply_camera {
                next.camera = snapshot.camera;
            }
            if options.apply_active_node {
                next.active_node_id.clone_from(&snapshot.active_node_id);
            }

            Some(next)
        });

        if skipped > 0 {
            tracing::debug!(skipped, "view snapshot referenced unknown nodes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RootNodeOptions;
    use serde_json::json;

    #[test]
    fn decode_rejects_bad_input() {
        assert!(ViewSnapshot::decode("not json").is_none());
        assert!(ViewSnapshot::decode(
            &json!({"version": 2, "savedAt": "2024-01-01T00:00:00Z", "nodes": {}}).to_string()
        )
        .is_none());
        assert!(ViewSnapshot::decode(
            &json!({"version": 1, "savedAt": "2024-01-01T00:00:00Z"}).to_string()
        )
        .is_none());
        assert!(ViewSnapshot::decode(
            &json!({"version": 1, "savedAt": "2024-01-01T00:00:00Z", "nodes": []}).to_string()
        )
        .is_none());
    }

    #[test]
    fn parse_reports_reason() {
        let err = ViewSnapshot::parse(r#"{"version": 3, "nodes": {}}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(Some(v)) if v > 2.0));

        let err = ViewSnapshot::parse(r#"{"version": 1, "nodes": 5}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingNodes));
    }

    #[test]
    fn decode_accepts_minimal_snapshot() {
        let raw = json!({
            "version": 1,
            "savedAt": "2024-01-01T00:00:00Z",
            "nodes": {"a": {"id": "a", "x": 1.0, "y": 2.0}}
        });
        let snapshot = ViewSnapshot::decode(&raw.to_string()).unwrap();
        assert_eq!(snapshot.node("a").map(|n| n.x), Some(1.0));
        assert!(snapshot.camera.is_none());
    }

    #[test]
    fn decode_tolerates_missing_or_odd_timestamp() {
        let bare = ViewSnapshot::decode(r#"{"version": 1, "nodes": {}}"#).unwrap();
        assert!(bare.saved_at.is_none());

        let odd = ViewSnapshot::decode(r#"{"version": 1.0, "savedAt": "yesterday", "nodes": {}}"#)
            .unwrap();
        assert_eq!(odd.version, VIEW_SNAPSHOT_VERSION);
        assert!(odd.saved_at.is_none());

        let stamped = ViewSnapshot::decode(
            r#"{"version": 1, "savedAt": "2024-01-01T00:00:00Z", "nodes": {}}"#,
        )
        .unwrap();
        assert!(stamped.saved_at.is_some());
    }

    #[test]
    fn export_prefers_explicit_options() {
        let store = CanvasStore::new();
        store.create_root_node(RootNodeOptions::new().with_id("a"));
        store.set_active_node_id(Some(NodeId::from("a")));
        store.set_camera(Some(Camera::new(0.0, 0.0, 1.0)));

        let from_state = store.export_view_snapshot(ExportOptions::default());
        assert_eq!(from_state.active_node_id, Some(NodeId::from("a")));

        let overridden = store.export_view_snapshot(ExportOptions {
            active_node_id: Some(NodeId::from("b")),
            camera: Some(Camera::new(5.0, 5.0, 2.0)),
        });
        assert_eq!(overridden.active_node_id, Some(NodeId::from("b")));
        assert_eq!(overridden.camera.map(|c| c.zoom), Some(2.0));
    }

    #[test]
    fn layout_only_import_keeps_view_state() {
        let store = CanvasStore::new();
        store.create_root_node(RootNodeOptions::new().with_id("a"));
        let mut snapshot = store.export_view_snapshot(ExportOptions {
            active_node_id: Some(NodeId::from("a")),
            camera: Some(Camera::new(1.0, 1.0, 3.0)),
        });
        if let Some(view) = snapshot.nodes.get_mut("a") {
            view.x = 99.0;
        }

        store.import_view_snapshot(&snapshot, ImportOptions::layout_only());

        assert_eq!(store.get_node("a").unwrap().position.x, 99.0);
        assert!(store.camera().is_none());
        assert!(store.active_node_id().is_none());
    }
}
