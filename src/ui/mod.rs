//! Rendering surface abstraction and the board's interactive core.
//!
//! Everything here talks to the page through [`Surface`], so the drag engine
//! runs the same against the browser DOM and against [`MemorySurface`].

use crate::error::Result;
use std::fmt;

pub mod controller;
pub mod drag;
pub mod memory_surface;
pub mod renderer;

pub use controller::{Board, ColumnController};
pub use drag::{DragController, DragOutcome, DragSession, DragState};
pub use memory_surface::{MemorySurface, NodeId, NodeKind};
pub use renderer::CardRenderer;

/// Viewport coordinates of the pointer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }
}

/// What a pointer press landed on, resolved from the innermost hit node
#[derive(Debug, Clone, PartialEq)]
pub enum PressTarget<N> {
    /// The delete affordance of the given card
    DeleteAffordance(N),
    /// The add-card input or its buttons
    ComposerControl,
    /// Anywhere else on a card
    Card(N),
    Other,
}

/// Pointer and page events the drag engine reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent<N> {
    Down { target: N, point: Point },
    Move { point: Point },
    Up { point: Point },
    /// The pointer left the window entirely
    LeaveWindow,
    VisibilityChange { hidden: bool },
}

/// DOM-like environment the board renders into.
///
/// Card nodes are direct children of their column node. A column may end
/// with an add-card affordance, which must stay last.
pub trait Surface {
    type Node: Clone + PartialEq + fmt::Debug;

    /// Creates a detached card node: text first, delete affordance second
    fn create_card(&mut self, text: &str) -> Result<Self::Node>;

    /// Creates a detached empty slot of the given height
    fn create_placeholder(&mut self, height: f64) -> Result<Self::Node>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

    /// True while the node is part of the document
    fn is_attached(&self, node: &Self::Node) -> bool;

    /// Moves `node` under `parent`, before `reference` or at the end when `None`
    fn insert_before(&mut self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>);

    fn remove(&mut self, node: &Self::Node);

    /// The trailing add-card affordance of a column, if it has one
    fn add_affordance(&self, column: &Self::Node) -> Option<Self::Node>;

    /// Card nodes of a column in document order
    fn card_nodes(&self, column: &Self::Node) -> Vec<Self::Node>;

    fn bounding_box(&self, node: &Self::Node) -> Rect;

    /// Hit-test: the column under the given point
    fn column_at(&self, point: Point) -> Option<Self::Node>;

    /// Resolves a pressed node to the control it belongs to
    fn classify_press(&self, target: &Self::Node) -> PressTarget<Self::Node>;

    /// Takes a card out of normal flow so it follows the pointer
    fn lift(&mut self, card: &Self::Node, rect: Rect);

    /// Positions a lifted card's top-left corner
    fn move_lifted(&mut self, card: &Self::Node, top_left: Point);

    /// Clears every inline state applied by `lift`
    fn settle(&mut self, card: &Self::Node);

    /// Removes placeholders left in the document; returns how many
    fn remove_orphan_placeholders(&mut self) -> usize;

    /// Shows the add-card input in a column
    fn open_composer(&mut self, column: &Self::Node);

    /// Hides the add-card input and restores the add affordance
    fn close_composer(&mut self, column: &Self::Node);
}
