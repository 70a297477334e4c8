//! Structural change batches emitted by the renderer
//!
//! The renderer reports user interaction (drag, resize, select, delete) as
//! batches of changes. Application follows the renderer's own rules:
//! - any `reset` in the batch replaces the collection with the reset items
//! - otherwise `add` items come first, followed by the existing elements
//!   with their changes applied in batch order
//! - `remove` drops the element; removal never cascades to edges or to
//!   parent/child ids

use crate::types::{Dimensions, GraphEdge, GraphNode, NodeId, Position};
use serde::{Deserialize, Serialize};

/// Change to a single node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeChange {
    /// Node moved or drag state changed
    Position {
        /// Target node
        id: NodeId,
        /// New position, if moved
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        /// New drag flag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dragging: Option<bool>,
    },
    /// Node measured or resize state changed
    Dimensions {
        /// Target node
        id: NodeId,
        /// New measured size
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dimensions: Option<Dimensions>,
        /// New resize flag
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resizing: Option<bool>,
    },
    /// Selection toggled
    Select {
        /// Target node
        id: NodeId,
        /// New selection state
        selected: bool,
    },
    /// Node deleted in the renderer
    Remove {
        /// Target node
        id: NodeId,
    },
    /// Node added by the renderer
    Add {
        /// New node
        item: GraphNode,
    },
    /// Replace the whole collection
    Reset {
        /// Node to keep
        item: GraphNode,
    },
}

impl NodeChange {
    /// Move a node
    #[inline]
    #[must_use]
    pub fn moved(id: impl Into<NodeId>, position: Position) -> Self {
        Self::Position {
            id: id.into(),
            position: Some(position),
            dragging: None,
        }
    }

    /// Select or deselect a node
    #[inline]
    #[must_use]
    pub fn select(id: impl Into<NodeId>, selected: bool) -> Self {
        Self::Select {
            id: id.into(),
            selected,
        }
    }

    /// Remove a node
    #[inline]
    #[must_use]
    pub fn remove(id: impl Into<NodeId>) -> Self {
        Self::Remove { id: id.into() }
    }
}

/// Change to a single edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EdgeChange {
    /// Selection toggled
    Select {
        /// Target edge id
        id: String,
        /// New selection state
        selected: bool,
    },
    /// Edge deleted in the renderer
    Remove {
        /// Target edge id
        id: String,
    },
    /// Edge added by the renderer
    Add {
        /// New edge
        item: GraphEdge,
    },
    /// Replace the whole collection
    Reset {
        /// Edge to keep
        item: GraphEdge,
    },
}

/// What happens to an element after a change touched it
enum Outcome {
    Keep,
    Drop,
}

/// Common shape of node and edge changes
trait ElementChange<T> {
    /// Id of the existing element this change targets
    fn target(&self) -> Option<&str>;
    /// Item carried by an `add` change
    fn added(&self) -> Option<&T>;
    /// Item carried by a `reset` change
    fn reset(&self) -> Option<&T>;
    /// Apply to the targeted element
    fn apply(&self, element: &mut T) -> Outcome;
}

trait Identified {
    fn element_id(&self) -> &str;
}

impl Identified for GraphNode {
    fn element_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Identified for GraphEdge {
    fn element_id(&self) -> &str {
        &self.id
    }
}

impl ElementChange<GraphNode> for NodeChange {
    fn target(&self) -> Option<&str> {
        match self {
            NodeChange::Position { id, .. }
            | NodeChange::Dimensions { id, .. }
            | NodeChange::Select { id, .. }
            | NodeChange::Remove { id } => Some(id.as_str()),
            NodeChange::Add { .. } | NodeChange::Reset { .. } => None,
        }
    }

    fn added(&self) -> Option<&GraphNode> {
        match self {
            NodeChange::Add { item } => Some(item),
            _ => None,
        }
    }

    fn reset(&self) -> Option<&GraphNode> {
        match self {
            NodeChange::Reset { item } => Some(item),
            _ => None,
        }
    }

    fn apply(&self, node: &mut GraphNode) -> Outcome {
        match self {
            NodeChange::Position {
                position, dragging, ..
            } => {
                if let Some(position) = position {
                    node.position = *position;
                }
                if let Some(dragging) = dragging {
                    node.dragging = *dragging;
                }
            }
            NodeChange::Dimensions {
                dimensions,
                resizing,
                ..
            } => {
                if let Some(dimensions) = dimensions {
                    node.dimensions = Some(*dimensions);
                }
                if let Some(resizing) = resizing {
                    node.resizing = *resizing;
                }
            }
            NodeChange::Select { selected, .. } => node.selected = *selected,
            NodeChange::Remove { .. } => return Outcome::Drop,
            NodeChange::Add { .. } | NodeChange::Reset { .. } => {}
        }
        Outcome::Keep
    }
}

impl ElementChange<GraphEdge> for EdgeChange {
    fn target(&self) -> Option<&str> {
        match self {
            EdgeChange::Select { id, .. } | EdgeChange::Remove { id } => Some(id.as_str()),
            EdgeChange::Add { .. } | EdgeChange::Reset { .. } => None,
        }
    }

    fn added(&self) -> Option<&GraphEdge> {
        match self {
            EdgeChange::Add { item } => Some(item),
            _ => None,
        }
    }

    fn reset(&self) -> Option<&GraphEdge> {
        match self {
            EdgeChange::Reset { item } => Some(item),
            _ => None,
        }
    }

    fn apply(&self, edge: &mut GraphEdge) -> Outcome {
        match self {
            EdgeChange::Select { selected, .. } => edge.selected = *selected,
            EdgeChange::Remove { .. } => return Outcome::Drop,
            EdgeChange::Add { .. } | EdgeChange::Reset { .. } => {}
        }
        Outcome::Keep
    }
}

fn apply_changes<'a, T, C, I>(changes: &[C], elements: I) -> Vec<T>
where
    T: Identified + Clone + 'a,
    C: ElementChange<T>,
    I: IntoIterator<Item = &'a T>,
{
    if changes.iter().any(|c| c.reset().is_some()) {
        return changes.iter().filter_map(|c| c.reset().cloned()).collect();
    }

    let mut result: Vec<T> = changes.iter().filter_map(|c| c.added().cloned()).collect();

    'elements: for element in elements {
        let mut updated = element.clone();
        for change in changes
            .iter()
            .filter(|c| c.target() == Some(element.element_id()))
        {
            if let Outcome::Drop = change.apply(&mut updated) {
                continue 'elements;
            }
        }
        result.push(updated);
    }

    result
}

/// Apply a node change batch, returning the new node sequence
#[must_use]
pub fn apply_node_changes<'a, I>(changes: &[NodeChange], nodes: I) -> Vec<GraphNode>
where
    I: IntoIterator<Item = &'a GraphNode>,
{
    apply_changes(changes, nodes)
}

/// Apply an edge change batch, returning the new edge sequence
#[must_use]
pub fn apply_edge_changes<'a, I>(changes: &[EdgeChange], edges: I) -> Vec<GraphEdge>
where
    I: IntoIterator<Item = &'a GraphEdge>,
{
    apply_changes(changes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeData;
    use serde_json::json;

    fn node(id: &str) -> GraphNode {
        GraphNode::new(NodeId::from(id), Position::default(), NodeData::default())
    }

    #[test]
    fn position_and_select_apply_in_order() {
        let nodes = vec![node("a"), node("b")];
        let changes = vec![
            NodeChange::moved("a", Position::new(5.0, 6.0)),
            NodeChange::select("a", true),
            NodeChange::Position {
                id: NodeId::from("a"),
                position: None,
                dragging: Some(true),
            },
        ];

        let next = apply_node_changes(&changes, &nodes);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].position, Position::new(5.0, 6.0));
        assert!(next[0].selected);
        assert!(next[0].dragging);
        assert_eq!(next[1], nodes[1]);
    }

    #[test]
    fn added_nodes_come_first_and_removed_are_dropped() {
        let nodes = vec![node("a"), node("b")];
        let changes = vec![
            NodeChange::remove("a"),
            NodeChange::Add { item: node("c") },
        ];

        let ids: Vec<_> = apply_node_changes(&changes, &nodes)
            .into_iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[test]
    fn reset_replaces_everything() {
        let nodes = vec![node("a"), node("b")];
        let changes = vec![
            NodeChange::moved("a", Position::new(1.0, 1.0)),
            NodeChange::Reset { item: node("z") },
        ];

        let next = apply_node_changes(&changes, &nodes);
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id.as_str(), "z");
    }

    #[test]
    fn dimensions_change_records_measured_size() {
        let nodes = vec![node("a")];
        let changes = vec![NodeChange::Dimensions {
            id: NodeId::from("a"),
            dimensions: Some(Dimensions {
                width: 400.0,
                height: 250.0,
            }),
            resizing: Some(true),
        }];

        let next = apply_node_changes(&changes, &nodes);
        assert_eq!(next[0].dimensions.map(|d| d.width), Some(400.0));
        assert!(next[0].resizing);
        // Layout hints belong to the data block and are untouched
        assert_eq!(next[0].data.width, nodes[0].data.width);
    }

    #[test]
    fn edge_changes_select_and_remove() {
        let edges = vec![
            GraphEdge::link(NodeId::from("a"), NodeId::from("b")),
            GraphEdge::link(NodeId::from("a"), NodeId::from("c")),
        ];
        let changes = vec![
            EdgeChange::Select {
                id: "e-a-b".to_string(),
                selected: true,
            },
            EdgeChange::Remove {
                id: "e-a-c".to_string(),
            },
        ];

        let next = apply_edge_changes(&changes, &edges);
        assert_eq!(next.len(), 1);
        assert!(next[0].selected);
    }

    #[test]
    fn changes_parse_from_renderer_json() {
        let changes: Vec<NodeChange> = serde_json::from_value(json!([
            {"type": "position", "id": "a", "position": {"x": 1.0, "y": 2.0}, "dragging": true},
            {"type": "select", "id": "a", "selected": false},
            {"type": "remove", "id": "b"}
        ]))
        .unwrap();
        assert_eq!(changes.len(), 3);
        assert!(matches!(changes[2], NodeChange::Remove { .. }));
    }
}
