//! Layout configuration
//!
//! Default geometry used when the store places nodes itself (root creation,
//! branching, linear graph construction).

use serde::{Deserialize, Serialize};

/// Default node width hint
pub const DEFAULT_NODE_WIDTH: f64 = 360.0;

/// Default node height hint
pub const DEFAULT_NODE_HEIGHT: f64 = 200.0;

/// Gap between a parent's bottom edge and its children
pub const VERTICAL_GAP: f64 = 140.0;

/// Gap between sibling branches
pub const HORIZONTAL_GAP: f64 = 80.0;

/// Geometry for automatic node placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LayoutConfig {
    /// Width given to new nodes
    pub node_width: f64,
    /// Height given to new nodes
    pub node_height: f64,
    /// Horizontal spacing between siblings
    pub horizontal_gap: f64,
    /// Vertical spacing below a parent
    pub vertical_gap: f64,
}

impl LayoutConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With node size
    #[inline]
    #[must_use]
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    /// With gaps
    #[inline]
    #[must_use]
    pub fn with_gaps(mut self, horizontal: f64, vertical: f64) -> Self {
        self.horizontal_gap = horizontal;
        self.vertical_gap = vertical;
        self
    }

    /// Horizontal distance between consecutive siblings
    #[inline]
    #[must_use]
    pub fn sibling_stride(&self) -> f64 {
        self.node_width + self.horizontal_gap
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            horizontal_gap: HORIZONTAL_GAP,
            vertical_gap: VERTICAL_GAP,
        }
    }
}
