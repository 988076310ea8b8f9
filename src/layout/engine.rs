//! Box placement for generation trees.
//!
//! Turns a [`TreeNode`] into absolutely positioned person boxes and the
//! connectors between them. Placement is a single top-down, depth-first pass
//! starting at the origin:
//!
//! 1. The node's box goes at `(x, y)`; a spouse sits to its right, separated
//!    by `spouse_gap`, joined by a marriage connector.
//! 2. Children are centered under the node one `vertical_spacing` lower,
//!    `horizontal_spacing` apart. Each child subtree is placed completely
//!    before its next sibling.
//! 3. Parents are centered above the node with the same formula.
//!
//! Connectors refer to boxes by their index in [`TreeLayout::nodes`] and carry
//! the anchor points the renderer draws between.

use serde::{Deserialize, Serialize};

use super::builder::TreeNode;
use crate::family::Person;

/// Configuration for box placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Width of every person box.
    pub node_width: f32,
    /// Height of every person box.
    pub node_height: f32,
    /// Distance between the x-coordinates of neighbouring siblings.
    pub horizontal_spacing: f32,
    /// Distance between the y-coordinates of adjacent generations.
    pub vertical_spacing: f32,
    /// Gap between a person's box and their spouse's box.
    pub spouse_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 140.0,
            node_height: 60.0,
            horizontal_spacing: 180.0,
            vertical_spacing: 100.0,
            spouse_gap: 20.0,
        }
    }
}

/// A positioned person box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    #[serde(flatten)]
    pub person: Person,
    pub generation: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Fill color derived from gender.
    pub color: &'static str,
    /// Lifespan caption, e.g. `1920 - 1995`.
    pub label: String,
}

impl LayoutNode {
    #[inline]
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// Kind of connector between two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionKind {
    Marriage,
    ParentChild,
}

/// Line endpoints in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// A connector between two boxes of the same layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Connection {
    pub kind: ConnectionKind,
    /// Index into [`TreeLayout::nodes`]: the left partner, or the parent.
    pub from: usize,
    /// Index into [`TreeLayout::nodes`]: the right partner, or the child.
    pub to: usize,
    pub segment: Segment,
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Boxes in placement order.
    pub nodes: Vec<LayoutNode>,
    pub connections: Vec<Connection>,
}

impl TreeLayout {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of connectors of the given kind.
    pub fn count(&self, kind: ConnectionKind) -> usize {
        self.connections.iter().filter(|c| c.kind == kind).count()
    }

    /// Both endpoints of a connector.
    pub fn endpoints(&self, connection: &Connection) -> (&LayoutNode, &LayoutNode) {
        (&self.nodes[connection.from], &self.nodes[connection.to])
    }

    fn push_node(&mut self, node: &TreeNode, x: f32, y: f32, config: &LayoutConfig) -> usize {
        self.nodes.push(LayoutNode {
            person: node.person.clone(),
            generation: node.generation,
            x,
            y,
            width: config.node_width,
            height: config.node_height,
            color: node.person.gender.color(),
            label: node.person.lifespan_label(),
        });
        self.nodes.len() - 1
    }

    fn connect(&mut self, kind: ConnectionKind, from: usize, to: usize) {
        let (a, b) = (&self.nodes[from], &self.nodes[to]);
        let segment = match kind {
            // Right-center of the left box to left-center of the right box
            ConnectionKind::Marriage => Segment {
                x1: a.x + a.width,
                y1: a.center_y(),
                x2: b.x,
                y2: b.center_y(),
            },
            // Bottom-center of the upper box to top-center of the lower box
            ConnectionKind::ParentChild => Segment {
                x1: a.center_x(),
                y1: a.y + a.height,
                x2: b.center_x(),
                y2: b.y,
            },
        };
        self.connections.push(Connection {
            kind,
            from,
            to,
            segment,
        });
    }
}

/// The box placement engine.
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Create a new layout engine with the given configuration.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Create a layout engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place every node of `root`'s tree.
    pub fn layout(&self, root: &TreeNode) -> TreeLayout {
        let mut layout = TreeLayout::default();
        self.place(root, 0.0, 0.0, &mut layout);

        tracing::debug!(
            nodes = layout.nodes.len(),
            connections = layout.connections.len(),
            "tree layout computed"
        );
        layout
    }

    /// Like [`layout`](Self::layout), but an absent tree gives an empty layout.
    pub fn layout_optional(&self, root: Option<&TreeNode>) -> TreeLayout {
        root.map(|tree| self.layout(tree)).unwrap_or_default()
    }

    /// Start x of `count` boxes centered on `x`.
    #[inline]
    fn row_start(&self, x: f32, count: usize) -> f32 {
        x - (count.saturating_sub(1) as f32 * self.config.horizontal_spacing) / 2.0
    }

    /// Place `node` at `(x, y)` and recurse. Returns the node's box index.
    fn place(&self, node: &TreeNode, x: f32, y: f32, out: &mut TreeLayout) -> usize {
        let config = &self.config;
        let index = out.push_node(node, x, y, config);

        if let Some(spouse) = &node.spouse {
            let spouse_x = x + config.node_width + config.spouse_gap;
            let spouse_index = out.push_node(spouse, spouse_x, y, config);
            out.connect(ConnectionKind::Marriage, index, spouse_index);
        }

        let start = self.row_start(x, node.children.len());
        for (i, child) in node.children.iter().enumerate() {
            let child_x = start + i as f32 * config.horizontal_spacing;
            let child_index = self.place(child, child_x, y + config.vertical_spacing, out);
            out.connect(ConnectionKind::ParentChild, index, child_index);
        }

        let start = self.row_start(x, node.parents.len());
        for (i, parent) in node.parents.iter().enumerate() {
            let parent_x = start + i as f32 * config.horizontal_spacing;
            let parent_index = self.place(parent, parent_x, y - config.vertical_spacing, out);
            out.connect(ConnectionKind::ParentChild, parent_index, index);
        }

        index
    }
}
