//! In-memory document with a fixed geometric layout.
//!
//! Columns sit side by side; their children stack vertically from the top
//! of the column. Lifted cards float at the position they were moved to and
//! are invisible to hit-testing.

use crate::{
    domain::ColumnKey,
    error::Result,
    ui::{Point, PressTarget, Rect, Surface},
};

pub const COLUMN_WIDTH: f64 = 200.0;
pub const COLUMN_GAP: f64 = 20.0;
pub const COLUMN_HEIGHT: f64 = 800.0;
pub const CARD_HEIGHT: f64 = 40.0;
pub const ADD_AFFORDANCE_HEIGHT: f64 = 30.0;
pub const COMPOSER_HEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Column(ColumnKey),
    Card,
    Text(String),
    DeleteAffordance,
    Placeholder { height: f64 },
    AddAffordance { enabled: bool },
    Composer,
}

#[derive(Debug, Clone, Copy)]
struct Lifted {
    top_left: Point,
    width: f64,
    height: f64,
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    lifted: Option<Lifted>,
}

#[derive(Debug)]
pub struct MemorySurface {
    nodes: Vec<NodeData>,
    grabbing: bool,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                lifted: None,
            }],
            grabbing: false,
        }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
            lifted: None,
        });
        id
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
        self.node_mut(id).parent = None;
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Adds a column ending in an add-card affordance
    pub fn add_column(&mut self, key: ColumnKey) -> NodeId {
        let column = self.add_bare_column(key);
        let affordance = self.alloc(NodeKind::AddAffordance { enabled: true });
        self.append_child(column, affordance);
        column
    }

    /// Adds a column without an add-card affordance
    pub fn add_bare_column(&mut self, key: ColumnKey) -> NodeId {
        let column = self.alloc(NodeKind::Column(key));
        self.append_child(Self::ROOT, column);
        column
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).children.clone()
    }

    /// Text content of a card node
    pub fn text_of(&self, card: NodeId) -> Option<&str> {
        self.node(card)
            .children
            .first()
            .and_then(|child| match &self.node(*child).kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
    }

    /// Texts of a column's cards in document order
    pub fn card_texts(&self, column: NodeId) -> Vec<String> {
        self.card_nodes(&column)
            .into_iter()
            .filter_map(|card| self.text_of(card).map(str::to_string))
            .collect()
    }

    pub fn delete_affordance_of(&self, card: NodeId) -> Option<NodeId> {
        self.node(card)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == NodeKind::DeleteAffordance)
    }

    pub fn composer_of(&self, column: NodeId) -> Option<NodeId> {
        self.node(column)
            .children
            .iter()
            .copied()
            .find(|child| self.node(*child).kind == NodeKind::Composer)
    }

    pub fn placeholders(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .filter(|id| matches!(self.node(*id).kind, NodeKind::Placeholder { .. }))
            .filter(|id| self.is_attached(id))
            .collect()
    }

    pub fn is_lifted(&self, id: NodeId) -> bool {
        self.node(id).lifted.is_some()
    }

    /// True while the document shows the grabbing cursor
    pub fn is_grabbing(&self) -> bool {
        self.grabbing
    }

    /// Center of a node's bounding box, handy for aiming pointer events
    pub fn center_of(&self, id: NodeId) -> Point {
        let rect = self.bounding_box(&id);
        Point::new(rect.left + rect.width / 2.0, rect.mid_y())
    }

    fn own_height(&self, id: NodeId) -> f64 {
        match &self.node(id).kind {
            NodeKind::Card => CARD_HEIGHT,
            NodeKind::Placeholder { height } => *height,
            NodeKind::AddAffordance { .. } => ADD_AFFORDANCE_HEIGHT,
            NodeKind::Composer => COMPOSER_HEIGHT,
            NodeKind::Column(_) => COLUMN_HEIGHT,
            _ => 0.0,
        }
    }

    fn column_rect(&self, column: NodeId) -> Rect {
        let index = self
            .node(Self::ROOT)
            .children
            .iter()
            .filter(|child| matches!(self.node(**child).kind, NodeKind::Column(_)))
            .position(|child| *child == column)
            .unwrap_or(0);
        Rect::new(
            index as f64 * (COLUMN_WIDTH + COLUMN_GAP),
            0.0,
            COLUMN_WIDTH,
            COLUMN_HEIGHT,
        )
    }
}

impl Surface for MemorySurface {
    type Node = NodeId;

    fn create_card(&mut self, text: &str) -> Result<NodeId> {
        let card = self.alloc(NodeKind::Card);
        let text = self.alloc(NodeKind::Text(text.to_string()));
        let delete = self.alloc(NodeKind::DeleteAffordance);
        self.append_child(card, text);
        self.append_child(card, delete);
        Ok(card)
    }

    fn create_placeholder(&mut self, height: f64) -> Result<NodeId> {
        Ok(self.alloc(NodeKind::Placeholder { height }))
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node).parent
    }

    fn next_sibling(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.node(*node).parent?;
        let siblings = &self.node(parent).children;
        let index = siblings.iter().position(|child| child == node)?;
        siblings.get(index + 1).copied()
    }

    fn is_attached(&self, node: &NodeId) -> bool {
        let mut current = *node;
        loop {
            if current == Self::ROOT {
                return true;
            }
            match self.node(current).parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn insert_before(&mut self, parent: &NodeId, node: &NodeId, reference: Option<&NodeId>) {
        self.detach(*node);
        let children = &self.node(*parent).children;
        let index = reference
            .and_then(|reference| children.iter().position(|child| child == reference))
            .unwrap_or(children.len());
        self.node_mut(*parent).children.insert(index, *node);
        self.node_mut(*node).parent = Some(*parent);
    }

    fn remove(&mut self, node: &NodeId) {
        self.detach(*node);
    }

    fn add_affordance(&self, column: &NodeId) -> Option<NodeId> {
        self.node(*column)
            .children
            .iter()
            .copied()
            .find(|child| matches!(self.node(*child).kind, NodeKind::AddAffordance { .. }))
    }

    fn card_nodes(&self, column: &NodeId) -> Vec<NodeId> {
        self.node(*column)
            .children
            .iter()
            .copied()
            .filter(|child| self.node(*child).kind == NodeKind::Card)
            .collect()
    }

    fn bounding_box(&self, node: &NodeId) -> Rect {
        let data = self.node(*node);
        if let Some(lifted) = data.lifted {
            return Rect::new(lifted.top_left.x, lifted.top_left.y, lifted.width, lifted.height);
        }
        let parent = match data.parent {
            Some(parent) => parent,
            None => return Rect::default(),
        };
        match &self.node(parent).kind {
            NodeKind::Root => {
                if matches!(data.kind, NodeKind::Column(_)) {
                    self.column_rect(*node)
                } else {
                    Rect::default()
                }
            }
            NodeKind::Column(_) => {
                let column = self.column_rect(parent);
                let top: f64 = self
                    .node(parent)
                    .children
                    .iter()
                    .take_while(|child| *child != node)
                    .map(|child| self.own_height(*child))
                    .sum();
                Rect::new(column.left, column.top + top, column.width, self.own_height(*node))
            }
            // Text and delete affordance share their card's box
            _ => self.bounding_box(&parent),
        }
    }

    fn column_at(&self, point: Point) -> Option<NodeId> {
        self.node(Self::ROOT)
            .children
            .iter()
            .copied()
            .filter(|child| matches!(self.node(*child).kind, NodeKind::Column(_)))
            .find(|column| self.column_rect(*column).contains(point))
    }

    fn classify_press(&self, target: &NodeId) -> PressTarget<NodeId> {
        let mut current = Some(*target);
        let mut delete_pressed = false;
        while let Some(id) = current {
            match self.node(id).kind {
                NodeKind::DeleteAffordance => delete_pressed = true,
                NodeKind::Composer => return PressTarget::ComposerControl,
                NodeKind::Card if delete_pressed => return PressTarget::DeleteAffordance(id),
                NodeKind::Card => return PressTarget::Card(id),
                _ => {}
            }
            current = self.node(id).parent;
        }
        PressTarget::Other
    }

    fn lift(&mut self, card: &NodeId, rect: Rect) {
        self.append_child(Self::ROOT, *card);
        self.node_mut(*card).lifted = Some(Lifted {
            top_left: Point::new(rect.left, rect.top),
            width: rect.width,
            height: rect.height,
        });
        self.grabbing = true;
    }

    fn move_lifted(&mut self, card: &NodeId, top_left: Point) {
        if let Some(lifted) = self.node_mut(*card).lifted.as_mut() {
            lifted.top_left = top_left;
        }
    }

    fn settle(&mut self, card: &NodeId) {
        self.node_mut(*card).lifted = None;
        self.grabbing = false;
    }

    fn remove_orphan_placeholders(&mut self) -> usize {
        let orphans = self.placeholders();
        for placeholder in &orphans {
            self.detach(*placeholder);
        }
        orphans.len()
    }

    fn open_composer(&mut self, column: &NodeId) {
        if self.composer_of(*column).is_some() {
            return;
        }
        let composer = self.alloc(NodeKind::Composer);
        let affordance = self.add_affordance(column);
        self.insert_before(column, &composer, affordance.as_ref());
        if let Some(affordance) = affordance {
            self.node_mut(affordance).kind = NodeKind::AddAffordance { enabled: false };
        }
    }

    fn close_composer(&mut self, column: &NodeId) {
        if let Some(composer) = self.composer_of(*column) {
            self.detach(composer);
        }
        if let Some(affordance) = self.add_affordance(column) {
            self.node_mut(affordance).kind = NodeKind::AddAffordance { enabled: true };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_laid_out_side_by_side() {
        let mut surface = MemorySurface::new();
        let todo = surface.add_column(ColumnKey::Todo);
        let done = surface.add_column(ColumnKey::Done);

        assert_eq!(surface.bounding_box(&todo).left, 0.0);
        assert_eq!(surface.bounding_box(&done).left, COLUMN_WIDTH + COLUMN_GAP);
        assert_eq!(surface.column_at(Point::new(10.0, 10.0)), Some(todo));
        assert_eq!(surface.column_at(Point::new(230.0, 10.0)), Some(done));
        // Gap between columns and beyond the bottom edge
        assert_eq!(surface.column_at(Point::new(210.0, 10.0)), None);
        assert_eq!(surface.column_at(Point::new(10.0, COLUMN_HEIGHT + 1.0)), None);
    }

    #[test]
    fn test_children_stack_vertically() {
        let mut surface = MemorySurface::new();
        let column = surface.add_column(ColumnKey::Todo);
        let affordance = surface.add_affordance(&column).unwrap();
        let a = surface.create_card("A").unwrap();
        let b = surface.create_card("B").unwrap();
        surface.insert_before(&column, &a, Some(&affordance));
        surface.insert_before(&column, &b, Some(&affordance));

        assert_eq!(surface.bounding_box(&a), Rect::new(0.0, 0.0, COLUMN_WIDTH, CARD_HEIGHT));
        assert_eq!(surface.bounding_box(&b).top, CARD_HEIGHT);
        assert_eq!(surface.bounding_box(&affordance).top, 2.0 * CARD_HEIGHT);
        assert_eq!(surface.next_sibling(&b), Some(affordance));
        assert_eq!(surface.card_texts(column), vec!["A", "B"]);
    }

    #[test]
    fn test_classify_press() {
        let mut surface = MemorySurface::new();
        let column = surface.add_column(ColumnKey::Todo);
        let card = surface.create_card("A").unwrap();
        surface.insert_before(&column, &card, None);
        let delete = surface.delete_affordance_of(card).unwrap();
        let text = surface.children(card)[0];

        assert_eq!(surface.classify_press(&card), PressTarget::Card(card));
        assert_eq!(surface.classify_press(&text), PressTarget::Card(card));
        assert_eq!(
            surface.classify_press(&delete),
            PressTarget::DeleteAffordance(card)
        );
        assert_eq!(surface.classify_press(&column), PressTarget::Other);

        surface.open_composer(&column);
        let composer = surface.composer_of(column).unwrap();
        assert_eq!(surface.classify_press(&composer), PressTarget::ComposerControl);
    }

    #[test]
    fn test_lifted_card_leaves_column_and_floats() {
        let mut surface = MemorySurface::new();
        let column = surface.add_bare_column(ColumnKey::Todo);
        let card = surface.create_card("A").unwrap();
        surface.insert_before(&column, &card, None);

        let rect = surface.bounding_box(&card);
        surface.lift(&card, rect);
        assert!(surface.card_nodes(&column).is_empty());
        assert!(surface.is_attached(&card));
        assert!(surface.is_grabbing());

        surface.move_lifted(&card, Point::new(300.0, 120.0));
        assert_eq!(surface.bounding_box(&card).top, 120.0);

        surface.insert_before(&column, &card, None);
        surface.settle(&card);
        assert!(!surface.is_lifted(card));
        assert!(!surface.is_grabbing());
        assert_eq!(surface.bounding_box(&card).top, 0.0);
    }

    #[test]
    fn test_composer_sits_before_affordance() {
        let mut surface = MemorySurface::new();
        let column = surface.add_column(ColumnKey::Todo);

        surface.open_composer(&column);
        surface.open_composer(&column);
        let children = surface.children(column);
        assert_eq!(children.len(), 2);
        assert_eq!(surface.kind(children[0]), &NodeKind::Composer);
        assert_eq!(
            surface.kind(children[1]),
            &NodeKind::AddAffordance { enabled: false }
        );

        surface.close_composer(&column);
        assert!(surface.composer_of(column).is_none());
        assert_eq!(
            surface.kind(surface.children(column)[0]),
            &NodeKind::AddAffordance { enabled: true }
        );
    }

    #[test]
    fn test_remove_orphan_placeholders() {
        let mut surface = MemorySurface::new();
        let column = surface.add_column(ColumnKey::Todo);
        let placeholder = surface.create_placeholder(40.0).unwrap();
        surface.insert_before(&column, &placeholder, None);

        assert_eq!(surface.remove_orphan_placeholders(), 1);
        assert!(!surface.is_attached(&placeholder));
        assert_eq!(surface.remove_orphan_placeholders(), 0);
    }
}
