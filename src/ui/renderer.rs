use crate::{
    domain::{Card, CardId},
    error::Result,
    ui::Surface,
};

/// Turns cards into surface nodes and remembers which node is which card.
///
/// The identity table is board-wide: a node keeps its card when it is
/// dragged into another column.
pub struct CardRenderer<S: Surface> {
    rendered: Vec<(S::Node, Card)>,
}

impl<S: Surface> Default for CardRenderer<S> {
    fn default() -> Self {
        Self {
            rendered: Vec::new(),
        }
    }
}

impl<S: Surface> CardRenderer<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node for `card` and records its identity
    pub fn render_card(&mut self, surface: &mut S, card: &Card) -> Result<S::Node> {
        let node = surface.create_card(&card.text)?;
        self.rendered.push((node.clone(), card.clone()));
        Ok(node)
    }

    /// Inserts before the column's add affordance, or at the end without one
    pub fn insert_card(&self, surface: &mut S, node: &S::Node, column: &S::Node) {
        let affordance = surface.add_affordance(column);
        surface.insert_before(column, node, affordance.as_ref());
    }

    /// Card nodes of a column in current document order
    pub fn list_cards(&self, surface: &S, column: &S::Node) -> Vec<S::Node> {
        surface.card_nodes(column)
    }

    /// Cards of a column in on-screen order. Unknown nodes are skipped.
    pub fn snapshot(&self, surface: &S, column: &S::Node) -> Vec<Card> {
        self.list_cards(surface, column)
            .iter()
            .filter_map(|node| self.card_for(node).cloned())
            .collect()
    }

    pub fn card_for(&self, node: &S::Node) -> Option<&Card> {
        self.rendered
            .iter()
            .find(|(rendered, _)| rendered == node)
            .map(|(_, card)| card)
    }

    pub fn node_for(&self, id: &CardId) -> Option<&S::Node> {
        self.rendered
            .iter()
            .find(|(_, card)| &card.id == id)
            .map(|(node, _)| node)
    }

    /// Drops the identity of a removed node
    pub fn forget(&mut self, node: &S::Node) -> Option<Card> {
        let index = self.rendered.iter().position(|(rendered, _)| rendered == node)?;
        Some(self.rendered.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnKey;
    use crate::ui::{MemorySurface, NodeKind};
    use std::str::FromStr;

    fn card(id: &str, text: &str) -> Card {
        Card::new(CardId::from_str(id).unwrap(), text)
    }

    #[test]
    fn test_render_card_structure() {
        let mut surface = MemorySurface::new();
        let mut renderer = CardRenderer::new();

        let node = renderer.render_card(&mut surface, &card("a", "Alpha")).unwrap();
        let children = surface.children(node);
        assert_eq!(children.len(), 2);
        assert_eq!(surface.kind(children[0]), &NodeKind::Text("Alpha".to_string()));
        assert_eq!(surface.kind(children[1]), &NodeKind::DeleteAffordance);
        assert_eq!(renderer.card_for(&node), Some(&card("a", "Alpha")));
    }

    #[test]
    fn test_insert_keeps_add_affordance_last() {
        let mut surface = MemorySurface::new();
        let column = surface.add_column(ColumnKey::Todo);
        let mut renderer = CardRenderer::new();

        for (id, text) in [("a", "Alpha"), ("b", "Beta")] {
            let node = renderer.render_card(&mut surface, &card(id, text)).unwrap();
            renderer.insert_card(&mut surface, &node, &column);
        }

        let children = surface.children(column);
        assert_eq!(children.len(), 3);
        assert_eq!(surface.kind(children[2]), &NodeKind::AddAffordance { enabled: true });
        assert_eq!(
            renderer.snapshot(&surface, &column),
            vec![card("a", "Alpha"), card("b", "Beta")]
        );
    }

    #[test]
    fn test_insert_appends_without_affordance() {
        let mut surface = MemorySurface::new();
        let column = surface.add_bare_column(ColumnKey::Done);
        let mut renderer = CardRenderer::new();

        let node = renderer.render_card(&mut surface, &card("a", "Alpha")).unwrap();
        renderer.insert_card(&mut surface, &node, &column);
        assert_eq!(renderer.list_cards(&surface, &column), vec![node]);
    }

    #[test]
    fn test_identity_lookup_and_forget() {
        let mut surface = MemorySurface::new();
        let mut renderer = CardRenderer::new();
        let a = renderer.render_card(&mut surface, &card("a", "Alpha")).unwrap();
        let b = renderer.render_card(&mut surface, &card("b", "Beta")).unwrap();

        assert_eq!(renderer.node_for(&CardId::from_str("b").unwrap()), Some(&b));
        assert_eq!(renderer.forget(&a), Some(card("a", "Alpha")));
        assert!(renderer.card_for(&a).is_none());
        assert_eq!(renderer.len(), 1);
    }
}
