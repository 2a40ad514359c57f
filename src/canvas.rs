//! Node collection and selection state for the canvas panel

use std::collections::HashSet;

use rand::Rng;

/// Side length of a node marker, in canvas units
pub const MARKER_WIDTH: f32 = 72.0;

/// Gap kept between randomly placed markers and the panel edges
pub const PLACEMENT_PADDING: f32 = 20.0;

/// Prompt fragments offered in the idea grid, five rows of five
pub const IDEA_FRAGMENTS: [&str; 25] = [
    "TASK",
    "TECH CONTEXT",
    "OUTPUT FORMAT",
    "ROLE",
    "CONSTRAINTS",
    "Write code for [functionality]",
    "Use [programming language]",
    "Provide [code snippet type]",
    "Act as [role/expertise]",
    "Follow [coding standards]",
    "Debug [specific issue]",
    "Work in [tech stack]",
    "Show step-by-step log",
    "Handle as [role/expertise]",
    "Avoid [restricted libraries]",
    "Optimize [algorithm/function]",
    "Implement in [language/assembly]",
    "Add annotated explanations",
    "Focus as [role/expertise]",
    "Explain steps and trade-offs",
    "Refactor [project/component]",
    "Use [framework/library]",
    "Make structure modular",
    "Act as [role/expertise]",
    "Ensure maintainability",
];

/// Panel-local coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Label assigned to a node by the classification backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unique,
    Irrelevant,
}

impl Classification {
    /// Backend verdicts use `1` for a distinct idea, anything else for a repeat
    pub fn from_verdict(m: i64) -> Self {
        if m == 1 {
            Classification::Unique
        } else {
            Classification::Irrelevant
        }
    }
}

/// A draggable marker holding one chat turn or idea fragment
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub content: String,
    pub position: Position,
    /// 1-based position in the imported chat, absent for grid additions
    pub order: Option<u32>,
    pub classification: Option<Classification>,
}

impl Node {
    pub fn new(id: String, content: String, position: Position, order: Option<u32>) -> Self {
        Self {
            id,
            content,
            position,
            order,
            classification: None,
        }
    }
}

/// Random top-left for a new marker inside a panel of the given size
pub fn random_position<R: Rng>(rng: &mut R, panel_width: f32, panel_height: f32) -> Position {
    Position::new(
        random_axis(rng, panel_width),
        random_axis(rng, panel_height),
    )
}

fn random_axis<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    let span = extent - MARKER_WIDTH - PLACEMENT_PADDING * 2.0;
    if span > 0.0 {
        PLACEMENT_PADDING + rng.gen_range(0.0..span)
    } else {
        PLACEMENT_PADDING
    }
}

fn new_node_id() -> String {
    format!("node-{}", uuid::Uuid::new_v4())
}

/// Nodes plus the current selection.
///
/// The selection only ever holds ids that exist in `nodes`.
#[derive(Debug, Default)]
pub struct Canvas {
    nodes: Vec<Node>,
    selected: HashSet<String>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn selection(&self) -> &HashSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Replace all nodes with an imported batch, numbered from 1
    pub fn import_batch<R: Rng>(
        &mut self,
        contents: Vec<String>,
        panel_width: f32,
        panel_height: f32,
        rng: &mut R,
    ) {
        self.nodes = contents
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                Node::new(
                    new_node_id(),
                    content,
                    random_position(rng, panel_width, panel_height),
                    Some(index as u32 + 1),
                )
            })
            .collect();
        self.selected.clear();
        log::info!("Imported {} nodes", self.nodes.len());
    }

    /// Append a single unnumbered node
    pub fn add_node<R: Rng>(
        &mut self,
        content: impl Into<String>,
        panel_width: f32,
        panel_height: f32,
        rng: &mut R,
    ) -> &Node {
        let node = Node::new(
            new_node_id(),
            content.into(),
            random_position(rng, panel_width, panel_height),
            None,
        );
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Drop every node and the selection with it
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.selected.clear();
    }

    /// Replace the selection, keeping only ids that exist
    pub fn set_selection(&mut self, ids: HashSet<String>) {
        self.selected = ids
            .into_iter()
            .filter(|id| self.nodes.iter().any(|n| &n.id == id))
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Called when a node drag starts: an unselected node becomes the only selection
    pub fn begin_node_drag(&mut self, id: &str) {
        if !self.selected.contains(id) && self.nodes.iter().any(|n| n.id == id) {
            self.selected.clear();
            self.selected.insert(id.to_string());
        }
    }

    /// Move the dragged node, or the whole selection if it is part of it
    pub fn drag_by(&mut self, id: &str, dx: f32, dy: f32) {
        if self.selected.contains(id) {
            for node in self.nodes.iter_mut().filter(|n| self.selected.contains(&n.id)) {
                node.position = node.position.offset(dx, dy);
            }
        } else if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.position = node.position.offset(dx, dy);
        }
    }

    /// Contents of the selected nodes, in collection order
    pub fn selected_contents(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| self.selected.contains(&n.id))
            .map(|n| n.content.clone())
            .collect()
    }
}
