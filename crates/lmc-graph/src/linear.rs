//! Turn segmentation and linear graph construction
//!
//! Bootstraps a graph from a flat transcript: the transcript is cut into
//! turns (each ending at an assistant reply) and every turn becomes one node
//! in a vertical chain.

use crate::config::{DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, VERTICAL_GAP};
use crate::types::{GraphEdge, GraphNode, NodeData, NodeId, Position};
use lmc_message::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default prefix for generated node ids
pub const LINEAR_ID_PREFIX: &str = "linear-node";

/// Split a transcript into turns
///
/// A turn closes after every assistant message and after the last message.
/// Turns are disjoint and cover the input in order. An empty transcript
/// yields one empty turn.
#[must_use]
pub fn segment_turns(messages: &[Message]) -> Vec<Vec<Message>> {
    if messages.is_empty() {
        return vec![Vec::new()];
    }

    let mut turns = Vec::new();
    let mut buffer = Vec::new();
    let last = messages.len() - 1;

    for (index, message) in messages.iter().enumerate() {
        buffer.push(message.clone());
        if message.role == MessageRole::Assistant || index == last {
            turns.push(std::mem::take(&mut buffer));
        }
    }

    turns
}

/// Placement and naming for [`build_linear_graph`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LinearGraphOptions {
    /// Prefix for node ids
    pub id_prefix: String,
    /// Position of the first node
    pub start: Position,
    /// Vertical space between consecutive nodes
    pub vertical_gap: f64,
    /// Width given to every node
    pub node_width: f64,
    /// Height given to every node
    pub node_height: f64,
}

impl LinearGraphOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With id prefix
    #[inline]
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// With start position
    #[inline]
    #[must_use]
    pub fn with_start(mut self, start: Position) -> Self {
        self.start = start;
        self
    }

    /// With vertical gap
    #[inline]
    #[must_use]
    pub fn with_vertical_gap(mut self, gap: f64) -> Self {
        self.vertical_gap = gap;
        self
    }

    /// With node size
    #[inline]
    #[must_use]
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    fn row_stride(&self) -> f64 {
        self.node_height + self.vertical_gap
    }
}

impl Default for LinearGraphOptions {
    fn default() -> Self {
        Self {
            id_prefix: LINEAR_ID_PREFIX.to_string(),
            start: Position::default(),
            vertical_gap: VERTICAL_GAP,
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
        }
    }
}

/// Chain of nodes built from a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearGraph {
    /// One node per turn, top to bottom
    pub nodes: Vec<GraphNode>,
    /// Links between consecutive nodes
    pub edges: Vec<GraphEdge>,
    /// First node
    pub root_node_id: NodeId,
    /// Last node
    pub last_node_id: NodeId,
}

/// Hands out ids, suffixing repeats with `-1`, `-2`, ...
#[derive(Default)]
struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, base: String) -> NodeId {
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.used.contains(&candidate) {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        NodeId::new(candidate)
    }
}

/// Build a vertical chain with one node per turn
#[must_use]
pub fn build_linear_graph(messages: &[Message], options: &LinearGraphOptions) -> LinearGraph {
    let turns = segment_turns(messages);
    let mut ids = IdAllocator::default();
    let mut nodes: Vec<GraphNode> = Vec::with_capacity(turns.len());
    let mut edges = Vec::with_capacity(turns.len().saturating_sub(1));

    for (index, turn) in turns.into_iter().enumerate() {
        let seed = match turn.last().and_then(Message::id) {
            Some(message_id) => format!("{}-{message_id}", options.id_prefix),
            None => format!("{}-{index}", options.id_prefix),
        };
        let id = ids.allocate(seed);

        #[allow(clippy::cast_precision_loss)]
        let position = Position::new(
            options.start.x,
            options.start.y + index as f64 * options.row_stride(),
        );
        let mut data = NodeData::new(turn).with_size(options.node_width, options.node_height);

        if let Some(previous) = nodes.last_mut() {
            previous.data.child_ids = vec![id.clone()];
            data.parent_ids = vec![previous.id.clone()];
            edges.push(GraphEdge::link(previous.id.clone(), id.clone()));
        }

        nodes.push(GraphNode::new(id, position, data));
    }

    // segment_turns never returns an empty list
    let root_node_id = nodes.first().map(|n| n.id.clone()).unwrap_or_default();
    let last_node_id = nodes.last().map(|n| n.id.clone()).unwrap_or_default();

    tracing::debug!(
        nodes = nodes.len(),
        root = %root_node_id,
        last = %last_node_id,
        "built linear graph"
    );

    LinearGraph {
        nodes,
        edges,
        root_node_id,
        last_node_id,
    }
}
