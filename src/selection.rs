//! Rubber-band selection geometry
//!
//! Everything here works in panel-local coordinates: the pointer position
//! minus the canvas panel origin.

use std::collections::HashSet;

use crate::canvas::{Node, Position, MARKER_WIDTH};

/// Axis-aligned rectangle with non-negative width and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SelectionRect {
    /// Build the rectangle spanned by two corners, in any drag direction
    pub fn from_corners(start: Position, current: Position) -> Self {
        Self {
            x: start.x.min(current.x),
            y: start.y.min(current.y),
            width: (current.x - start.x).abs(),
            height: (current.y - start.y).abs(),
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// A click without movement produces an empty rectangle
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Open-interval overlap with a node's marker box. Shared edges do not count.
    pub fn intersects_node(&self, position: Position) -> bool {
        let node_left = position.x;
        let node_right = position.x + MARKER_WIDTH;
        let node_top = position.y;
        let node_bottom = position.y + MARKER_WIDTH;

        node_left < self.right()
            && node_right > self.left()
            && node_top < self.bottom()
            && node_bottom > self.top()
    }
}

/// What sits under the pointer when a press begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// Empty canvas area
    Canvas,
    /// A node marker (starts a node drag instead)
    Marker,
    /// Canvas title and action buttons
    Header,
    /// Instruction strip at the bottom of the canvas
    Instructions,
}

impl PressTarget {
    /// Only presses on empty canvas may start a rubber band
    pub fn starts_rubber_band(self) -> bool {
        matches!(self, PressTarget::Canvas)
    }
}

/// An in-progress rubber-band gesture.
///
/// Created on press and consumed by [`RubberBand::finish`]; there is no way
/// to keep tracking the pointer after release.
#[derive(Debug, Clone, PartialEq)]
pub struct RubberBand {
    start: Position,
    rect: SelectionRect,
}

impl RubberBand {
    /// Start a gesture, or `None` when the press landed on something that
    /// handles its own pointer input.
    pub fn begin(target: PressTarget, start: Position) -> Option<Self> {
        if !target.starts_rubber_band() {
            return None;
        }
        Some(Self {
            start,
            rect: SelectionRect::from_corners(start, start),
        })
    }

    /// Track the pointer; positions outside the panel are fine
    pub fn update(&mut self, current: Position) {
        self.rect = SelectionRect::from_corners(self.start, current);
    }

    pub fn rect(&self) -> SelectionRect {
        self.rect
    }

    /// Release the gesture and compute the replacement selection
    pub fn finish(self, nodes: &[Node]) -> HashSet<String> {
        select_in_rect(&self.rect, nodes)
    }
}

/// Ids of every node whose marker overlaps `rect`; empty for a zero-size rect
pub fn select_in_rect(rect: &SelectionRect, nodes: &[Node]) -> HashSet<String> {
    if rect.is_empty() {
        return HashSet::new();
    }

    nodes
        .iter()
        .filter(|node| rect.intersects_node(node.position))
        .map(|node| node.id.clone())
        .collect()
}
