//! Canvas graph store
//!
//! Owns the authoritative conversation graph: the id-keyed node map, the
//! edge list and the view state (active node, camera).
//!
//! # Snapshot model
//!
//! The state is an immutable [`GraphState`] behind an `Arc`. Every mutating
//! operation computes the next state from the current one and swaps it in as
//! one indivisible step; readers always observe a complete snapshot. An
//! operation that changes nothing (unknown id, empty change batch) keeps the
//! current `Arc` and does not notify subscribers.
//!
//! # Not-found handling
//!
//! Operations addressing a node that does not exist return `None` and leave
//! the state untouched. This is an expected race in an interactive canvas,
//! not an error.

use crate::changes::{apply_edge_changes, apply_node_changes, EdgeChange, NodeChange};
use crate::config::LayoutConfig;
use crate::types::{GraphEdge, GraphNode, NodeData, NodeDataPatch, NodeId, Position};
use crate::view::Camera;
use indexmap::IndexMap;
use lmc_message::Message;
use std::sync::Arc;
use tokio::sync::watch;

/// One consistent snapshot of the graph
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub(crate) nodes_by_id: IndexMap<NodeId, Arc<GraphNode>>,
    pub(crate) edges: Vec<GraphEdge>,
    pub(crate) active_node_id: Option<NodeId>,
    pub(crate) camera: Option<Camera>,
}

impl GraphState {
    /// Look up a node
    #[inline]
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes_by_id.get(id).map(|node| &**node)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.nodes_by_id.values().map(|node| &**node)
    }

    /// Edge list
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes_by_id.len()
    }

    /// Number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Focused node, if any
    #[inline]
    #[must_use]
    pub fn active_node_id(&self) -> Option<&NodeId> {
        self.active_node_id.as_ref()
    }

    /// Saved camera, if any
    #[inline]
    #[must_use]
    pub fn camera(&self) -> Option<Camera> {
        self.camera
    }

    pub(crate) fn with_nodes<I>(&self, nodes: I) -> Self
    where
        I: IntoIterator<Item = GraphNode>,
    {
        Self {
            nodes_by_id: to_node_map(nodes),
            ..self.clone()
        }
    }

    /// Copy of the state with one node's data rewritten
    pub(crate) fn with_node_data<F>(&self, id: &str, f: F) -> Option<Self>
    where
        F: FnOnce(&mut NodeData),
    {
        let existing = self.nodes_by_id.get(id)?;
        let mut node = GraphNode::clone(existing);
        f(&mut node.data);

        let mut next = self.clone();
        next.nodes_by_id.insert(node.id.clone(), Arc::new(node));
        Some(next)
    }
}

/// Rebuild the id-keyed map; the last node with a given id wins
fn to_node_map<I>(nodes: I) -> IndexMap<NodeId, Arc<GraphNode>>
where
    I: IntoIterator<Item = GraphNode>,
{
    let mut map = IndexMap::new();
    for node in nodes {
        map.insert(node.id.clone(), Arc::new(node));
    }
    map
}

/// Options for [`CanvasStore::create_root_node`]
#[derive(Debug, Clone, Default)]
pub struct RootNodeOptions {
    /// Use this id instead of generating one
    pub id: Option<NodeId>,
    /// Initial position, default (0, 0)
    pub position: Option<Position>,
    /// Initial messages, default empty
    pub messages: Option<Vec<Message>>,
}

impl RootNodeOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// With position
    #[inline]
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// With messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }
}

/// Options for [`CanvasStore::branch_node`]
#[derive(Debug, Clone, Default)]
pub struct BranchOptions {
    /// Seed messages, default a copy of the parent's
    pub messages: Option<Vec<Message>>,
    /// Explicit position, default fanned out below the parent
    pub position: Option<Position>,
}

impl BranchOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With messages
    #[inline]
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// With position
    #[inline]
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug)]
struct StoreInner {
    state: watch::Sender<Arc<GraphState>>,
    layout: LayoutConfig,
}

/// Shared handle to the graph store
///
/// Cloning the handle shares the same store. Every component that needs the
/// graph receives a handle explicitly; there is no ambient instance.
#[derive(Debug, Clone)]
pub struct CanvasStore {
    inner: Arc<StoreInner>,
}

impl CanvasStore {
    /// Empty store with default layout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_layout(LayoutConfig::default())
    }

    /// Empty store with custom layout
    #[must_use]
    pub fn with_layout(layout: LayoutConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(GraphState::default()));
        Self {
            inner: Arc::new(StoreInner { state, layout }),
        }
    }

    /// Store seeded with nodes and edges
    #[must_use]
    pub fn from_graph(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let store = Self::new();
        store.set_nodes(nodes);
        store.set_edges(edges);
        store
    }

    /// Layout used for automatic placement
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &LayoutConfig {
        &self.inner.layout
    }

    /// Current snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<GraphState> {
        Arc::clone(&*self.inner.state.borrow())
    }

    /// Receiver notified of every new snapshot
    ///
    /// No-op operations do not mark the receiver changed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<GraphState>> {
        self.inner.state.subscribe()
    }

    /// Swap in the state produced by `f`; `None` keeps the current state
    ///
    /// Returns whether the state changed. `f` must not call back into the
    /// store.
    pub(crate) fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&GraphState) -> Option<GraphState>,
    {
        self.inner.state.send_if_modified(|current| match f(&**current) {
            Some(next) => {
                *current = Arc::new(next);
                true
            }
            None => false,
        })
    }

    /// Look up a node
    #[must_use]
    pub fn get_node(&self, id: &str) -> Option<Arc<GraphNode>> {
        self.inner.state.borrow().nodes_by_id.get(id).cloned()
    }

    /// Messages of a node, empty if the node is absent
    #[must_use]
    pub fn node_messages(&self, id: &str) -> Vec<Message> {
        self.get_node(id)
            .map(|node| node.data.messages.clone())
            .unwrap_or_default()
    }

    /// Nodes in insertion order
    #[must_use]
    pub fn nodes(&self) -> Vec<GraphNode> {
        self.snapshot().nodes().cloned().collect()
    }

    /// Edge list
    #[must_use]
    pub fn edges(&self) -> Vec<GraphEdge> {
        self.snapshot().edges.clone()
    }

    /// Replace every node; the last node with a given id wins
    pub fn set_nodes(&self, nodes: Vec<GraphNode>) {
        self.update(|state| Some(state.with_nodes(nodes)));
    }

    /// Replace every edge
    pub fn set_edges(&self, edges: Vec<GraphEdge>) {
        self.update(|state| {
            Some(GraphState {
                edges,
                ..state.clone()
            })
        });
    }

    /// Insert or fully replace a node by id
    pub fn upsert_node(&self, node: GraphNode) {
        self.update(|state| {
            let mut next = state.clone();
            next.nodes_by_id.insert(node.id.clone(), Arc::new(node));
            Some(next)
        });
    }

    /// Shallow-merge `patch` into a node's data
    ///
    /// Returns `None` without touching the state if the node is absent.
    pub fn patch_node_data(&self, id: &str, patch: NodeDataPatch) -> Option<()> {
        self.update(|state| state.with_node_data(id, |data| patch.apply_to(data)))
            .then_some(())
    }

    /// Replace a node's message list
    ///
    /// Returns `None` without touching the state if the node is absent.
    pub fn set_node_messages(&self, id: &str, messages: Vec<Message>) -> Option<()> {
        self.update(|state| state.with_node_data(id, |data| data.messages = messages))
            .then_some(())
    }

    /// Edit a node's message list in place
    ///
    /// `f` runs against the current list inside the same atomic step that
    /// publishes the result, so edits from interleaved callers are never
    /// lost. Returns `None` without touching the state if the node is absent.
    pub fn update_node_messages<F>(&self, id: &str, f: F) -> Option<()>
    where
        F: FnOnce(&mut Vec<Message>),
    {
        self.update(|state| state.with_node_data(id, |data| f(&mut data.messages)))
            .then_some(())
    }

    /// Create a parentless node and return its id
    pub fn create_root_node(&self, options: RootNodeOptions) -> NodeId {
        let id = options.id.unwrap_or_else(NodeId::generate);
        let layout = self.layout();
        let data = NodeData::new(options.messages.unwrap_or_default())
            .with_size(layout.node_width, layout.node_height);
        let node = GraphNode::new(id.clone(), options.position.unwrap_or_default(), data);

        tracing::debug!(node_id = %id, "creating root node");
        self.upsert_node(node);
        id
    }

    /// Fork a child from `parent_id` and return the child's id
    ///
    /// The child is linked by one new edge, recorded in the parent's
    /// `child_ids`, and by default placed below the parent, shifted right by
    /// one sibling stride per existing child. Returns `None` without touching
    /// the state if the parent is absent.
    pub fn branch_node(&self, parent_id: &str, options: BranchOptions) -> Option<NodeId> {
        let layout = *self.layout();
        let child_id = NodeId::generate();
        let mut created = None;

        self.update(|state| {
            let parent = state.nodes_by_id.get(parent_id)?;
            let child_index = parent.data.child_ids.len();

            #[allow(clippy::cast_precision_loss)]
            let position = options.position.unwrap_or_else(|| {
                Position::new(
                    parent.position.x + child_index as f64 * layout.sibling_stride(),
                    parent.position.y + parent.data.height + layout.vertical_gap,
                )
            });

            let data = NodeData::new(
                options
                    .messages
                    .unwrap_or_else(|| parent.data.messages.clone()),
            )
            .with_size(layout.node_width, layout.node_height)
            .with_parents(vec![parent.id.clone()]);
            let child = GraphNode::new(child_id.clone(), position, data);

            let mut updated_parent = GraphNode::clone(parent);
            updated_parent.data.child_ids.push(child_id.clone());

            let mut next = state.clone();
            next.edges
                .push(GraphEdge::link(parent.id.clone(), child_id.clone()));
            next.nodes_by_id
                .insert(child_id.clone(), Arc::new(child));
            next.nodes_by_id
                .insert(updated_parent.id.clone(), Arc::new(updated_parent));

            created = Some(child_id.clone());
            Some(next)
        });

        match &created {
            Some(child) => tracing::debug!(parent_id, child_id = %child, "branched node"),
            None => tracing::debug!(parent_id, "branch skipped: parent not found"),
        }
        created
    }

    /// Apply a renderer node change batch
    ///
    /// An empty batch leaves the snapshot untouched.
    pub fn apply_node_changes(&self, changes: &[NodeChange]) {
        if changes.is_empty() {
            return;
        }
        self.update(|state| {
            let next = apply_node_changes(changes, state.nodes());
            Some(state.with_nodes(next))
        });
    }

    /// Apply a renderer edge change batch
    ///
    /// An empty batch leaves the snapshot untouched.
    pub fn apply_edge_changes(&self, changes: &[EdgeChange]) {
        if changes.is_empty() {
            return;
        }
        self.update(|state| {
            Some(GraphState {
                edges: apply_edge_changes(changes, &state.edges),
                ..state.clone()
            })
        });
    }

    /// Focused node
    #[must_use]
    pub fn active_node_id(&self) -> Option<NodeId> {
        self.inner.state.borrow().active_node_id.clone()
    }

    /// Set or clear the focused node
    pub fn set_active_node_id(&self, node_id: Option<NodeId>) {
        self.update(|state| {
            Some(GraphState {
                active_node_id: node_id,
                ..state.clone()
            })
        });
    }

    /// Saved camera
    #[must_use]
    pub fn camera(&self) -> Option<Camera> {
        self.inner.state.borrow().camera
    }

    /// Set or clear the camera
    pub fn set_camera(&self, camera: Option<Camera>) {
        self.update(|state| {
            Some(GraphState {
                camera,
                ..state.clone()
            })
        });
    }
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeStatus;

    #[test]
    fn root_node_defaults() {
        let store = CanvasStore::new();
        let id = store.create_root_node(RootNodeOptions::new());

        let node = store.get_node(&id).unwrap();
        assert_eq!(node.position, Position::default());
        assert_eq!(node.status(), NodeStatus::Idle);
        assert!(node.data.parent_ids.is_empty());
        assert!(node.data.child_ids.is_empty());
        assert!(node.messages().is_empty());
    }

    #[test]
    fn root_node_honours_caller_id() {
        let store = CanvasStore::new();
        let id = store.create_root_node(RootNodeOptions::new().with_id("root"));
        assert_eq!(id.as_str(), "root");
        assert!(store.get_node("root").is_some());
    }

    #[test]
    fn patch_unknown_node_is_a_no_op() {
        let store = CanvasStore::new();
        store.create_root_node(RootNodeOptions::new().with_id("a"));
        let before = store.snapshot();

        assert!(store
            .patch_node_data("missing", NodeDataPatch::status(NodeStatus::Loading))
            .is_none());
        assert!(store.set_node_messages("missing", vec![]).is_none());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn patch_merges_shallowly() {
        let store = CanvasStore::new();
        let id = store.create_root_node(
            RootNodeOptions::new().with_messages(vec![Message::user("hi")]),
        );

        store
            .patch_node_data(&id, NodeDataPatch::status(NodeStatus::Completed))
            .unwrap();

        let node = store.get_node(&id).unwrap();
        assert_eq!(node.status(), NodeStatus::Completed);
        assert_eq!(node.messages().len(), 1);
    }

    #[test]
    fn update_messages_edits_in_place() {
        let store = CanvasStore::new();
        let id = store.create_root_node(
            RootNodeOptions::new().with_messages(vec![Message::user("a")]),
        );

        store
            .update_node_messages(&id, |messages| messages.push(Message::assistant("b")))
            .unwrap();
        assert_eq!(store.node_messages(&id).len(), 2);
        assert!(store.update_node_messages("missing", |m| m.clear()).is_none());
    }

    #[test]
    fn branch_positions_siblings_side_by_side() {
        let store = CanvasStore::new();
        let root = store.create_root_node(
            RootNodeOptions::new().with_position(Position::new(10.0, 20.0)),
        );

        let first = store.branch_node(&root, BranchOptions::new()).unwrap();
        let second = store.branch_node(&root, BranchOptions::new()).unwrap();

        let first = store.get_node(&first).unwrap();
        let second = store.get_node(&second).unwrap();
        assert_eq!(first.position, Position::new(10.0, 20.0 + 200.0 + 140.0));
        assert_eq!(second.position, Position::new(10.0 + 440.0, 360.0));
    }

    #[test]
    fn branch_copies_parent_messages_by_default() {
        let store = CanvasStore::new();
        let root = store.create_root_node(
            RootNodeOptions::new().with_messages(vec![Message::user("q").with_id("m1")]),
        );

        let copied = store.branch_node(&root, BranchOptions::new()).unwrap();
        let seeded = store
            .branch_node(
                &root,
                BranchOptions::new().with_messages(vec![Message::user("other")]),
            )
            .unwrap();

        assert_eq!(store.node_messages(&copied), store.node_messages(&root));
        assert_eq!(store.node_messages(&seeded)[0].content.as_deref(), Some("other"));
    }

    #[test]
    fn branch_honours_explicit_position() {
        let store = CanvasStore::new();
        let root = store.create_root_node(RootNodeOptions::new());
        let child = store
            .branch_node(
                &root,
                BranchOptions::new().with_position(Position::new(-5.0, 7.0)),
            )
            .unwrap();
        assert_eq!(store.get_node(&child).unwrap().position, Position::new(-5.0, 7.0));
    }

    #[test]
    fn set_nodes_last_duplicate_wins() {
        let store = CanvasStore::new();
        let first = GraphNode::new(NodeId::from("a"), Position::new(1.0, 1.0), NodeData::default());
        let other = GraphNode::new(NodeId::from("b"), Position::default(), NodeData::default());
        let second = GraphNode::new(
            NodeId::from("a"),
            Position::new(2.0, 2.0),
            NodeData::default(),
        );

        store.set_nodes(vec![first, other, second]);

        let ids: Vec<_> = store.nodes().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId::from("a"), NodeId::from("b")]);
        assert_eq!(store.get_node("a").unwrap().position, Position::new(2.0, 2.0));
    }

    #[test]
    fn empty_change_batches_keep_snapshot() {
        let store = CanvasStore::new();
        store.create_root_node(RootNodeOptions::new());
        let before = store.snapshot();

        store.apply_node_changes(&[]);
        store.apply_edge_changes(&[]);

        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn removing_a_node_does_not_cascade() {
        let store = CanvasStore::new();
        let root = store.create_root_node(RootNodeOptions::new());
        let child = store.branch_node(&root, BranchOptions::new()).unwrap();

        store.apply_node_changes(&[NodeChange::remove(child.clone())]);

        assert!(store.get_node(&child).is_none());
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.get_node(&root).unwrap().data.child_ids, vec![child]);
    }

    #[test]
    fn view_state_setters() {
        let store = CanvasStore::new();
        store.set_active_node_id(Some(NodeId::from("a")));
        store.set_camera(Some(Camera::new(1.0, 2.0, 1.5)));

        assert_eq!(store.active_node_id(), Some(NodeId::from("a")));
        assert_eq!(store.camera().map(|c| c.zoom), Some(1.5));

        store.set_camera(None);
        assert!(store.camera().is_none());
    }
}
