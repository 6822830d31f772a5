//! Board registry and per-column glue.
//!
//! The [`Board`] owns the surface, the card store, the board-wide identity
//! table and the single drag session. Each mounted column gets a
//! [`ColumnController`] that tracks its node and composer state.

use crate::{
    clock::Clock,
    domain::{BoardConfig, Card, CardId, ColumnKey},
    error::{Result, SwimlaneError},
    storage::{CardStore, KeyValueStore, Timer},
    ui::{
        drag::{DragController, DragOutcome},
        renderer::CardRenderer,
        PointerEvent, PressTarget, Surface,
    },
};
use std::rc::Rc;
use tracing::{debug, warn};

/// One column's node and add-card composer state
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnController<N> {
    pub key: ColumnKey,
    pub node: N,
    pub composer_open: bool,
}

impl<N> ColumnController<N> {
    pub fn new(key: ColumnKey, node: N) -> Self {
        Self {
            key,
            node,
            composer_open: false,
        }
    }
}

pub struct Board<S: Surface> {
    config: BoardConfig,
    surface: S,
    store: CardStore,
    renderer: CardRenderer<S>,
    drag: DragController<S>,
    columns: Vec<ColumnController<S::Node>>,
}

impl<S: Surface> Board<S> {
    pub fn new(
        config: BoardConfig,
        surface: S,
        kv: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        timer: Rc<dyn Timer>,
    ) -> Result<Self> {
        config.validate()?;
        let store = CardStore::new(&config, kv, clock, timer);
        let drag = DragController::new(config.placeholder_min_height);
        Ok(Self {
            config,
            surface,
            store,
            renderer: CardRenderer::new(),
            drag,
            columns: Vec::new(),
        })
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &CardStore {
        &self.store
    }

    pub fn renderer(&self) -> &CardRenderer<S> {
        &self.renderer
    }

    pub fn drag(&self) -> &DragController<S> {
        &self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn columns(&self) -> &[ColumnController<S::Node>] {
        &self.columns
    }

    /// Takes control of a column node: renders its stored cards in order,
    /// then arms expiry for its record. Returns the number of cards restored.
    pub fn mount_column(&mut self, key: ColumnKey, node: S::Node) -> Result<usize> {
        if self.columns.iter().any(|column| column.key == key) {
            return Err(SwimlaneError::ConfigError(format!(
                "column `{}` is already mounted",
                key
            )));
        }

        let cards = self.store.read(key);
        for card in &cards {
            let card_node = self.renderer.render_card(&mut self.surface, card)?;
            self.renderer.insert_card(&mut self.surface, &card_node, &node);
        }
        self.store.arm_expiry(key);
        self.columns.push(ColumnController::new(key, node));

        debug!(column = %key, restored = cards.len(), "column mounted");
        Ok(cards.len())
    }

    fn controller(&self, key: ColumnKey) -> Result<&ColumnController<S::Node>> {
        self.columns
            .iter()
            .find(|column| column.key == key)
            .ok_or(SwimlaneError::ColumnNotMounted(key))
    }

    fn controller_mut(&mut self, key: ColumnKey) -> Result<&mut ColumnController<S::Node>> {
        self.columns
            .iter_mut()
            .find(|column| column.key == key)
            .ok_or(SwimlaneError::ColumnNotMounted(key))
    }

    pub fn column_node(&self, key: ColumnKey) -> Option<&S::Node> {
        self.controller(key).ok().map(|column| &column.node)
    }

    /// Column key of a mounted column node
    pub fn column_of(&self, node: &S::Node) -> Option<ColumnKey> {
        self.columns
            .iter()
            .find(|column| &column.node == node)
            .map(|column| column.key)
    }

    /// Column currently holding a card node
    pub fn column_of_card(&self, card: &S::Node) -> Option<ColumnKey> {
        let parent = self.surface.parent(card)?;
        self.column_of(&parent)
    }

    pub fn card_node(&self, id: &CardId) -> Option<&S::Node> {
        self.renderer.node_for(id)
    }

    /// Cards of a column in rendered order
    pub fn column_cards(&self, key: ColumnKey) -> Vec<Card> {
        match self.column_node(key) {
            Some(node) => self.renderer.snapshot(&self.surface, node),
            None => Vec::new(),
        }
    }

    /// Cards of a column as currently stored
    pub fn stored_cards(&self, key: ColumnKey) -> Vec<Card> {
        self.store.read(key)
    }

    /// Creates a card from input text and appends it to a column.
    ///
    /// Blank text is ignored and yields `Ok(None)`.
    pub fn add_card(&mut self, key: ColumnKey, text: &str) -> Result<Option<CardId>> {
        let column = self.controller(key)?.node.clone();
        let card = match Card::from_input(text) {
            Some(card) => card,
            None => return Ok(None),
        };

        let node = self.renderer.render_card(&mut self.surface, &card)?;
        self.renderer.insert_card(&mut self.surface, &node, &column);
        if let Err(err) = self.store.append(key, &card) {
            warn!(column = %key, error = %err, "failed to persist new card");
        }

        debug!(column = %key, card = %card.id, "card added");
        Ok(Some(card.id))
    }

    /// Removes a card node and drops it from its column's stored list
    pub fn delete_card(&mut self, card_node: &S::Node) -> Option<CardId> {
        let id = self.renderer.card_for(card_node)?.id.clone();
        let column = self.column_of_card(card_node);

        self.surface.remove(card_node);
        self.renderer.forget(card_node);

        match column {
            Some(key) => {
                if let Err(err) = self.store.remove(key, &id) {
                    warn!(column = %key, card = %id, error = %err, "failed to persist card removal");
                }
                debug!(column = %key, card = %id, "card deleted");
            }
            None => warn!(card = %id, "deleted card was not in a mounted column"),
        }
        Some(id)
    }

    /// Deletes a card by identifier
    pub fn delete_card_by_id(&mut self, id: &CardId) -> Option<CardId> {
        let node = self.renderer.node_for(id)?.clone();
        self.delete_card(&node)
    }

    /// Writes a column's rendered order to storage
    pub fn persist_order(&self, column: &S::Node) -> Result<()> {
        let key = match self.column_of(column) {
            Some(key) => key,
            None => return Ok(()),
        };
        let cards = self.renderer.snapshot(&self.surface, column);
        self.store.write(key, &cards)
    }

    /// Feeds a pointer or visibility event to the drag engine and persists
    /// whatever the resulting transition touched.
    pub fn handle_pointer(&mut self, event: PointerEvent<S::Node>) -> DragOutcome<S::Node> {
        if let PointerEvent::Down { target, .. } = &event {
            // Only cards inside mounted columns can be grabbed
            let grabbable = match self.surface.classify_press(target) {
                PressTarget::Card(card) => self.column_of_card(&card).is_some(),
                _ => false,
            };
            if !grabbable {
                return DragOutcome::Ignored;
            }
        }

        let outcome = self.drag.handle(&mut self.surface, event);
        match &outcome {
            DragOutcome::Committed { source, target, .. } => {
                if let Err(err) = self.persist_move(source, target) {
                    warn!(error = %err, "failed to persist drop; storage may lag the board");
                }
            }
            DragOutcome::Cancelled { origin, .. } => {
                if let Err(err) = self.persist_order(origin) {
                    warn!(error = %err, "failed to persist column after cancelled drag");
                }
            }
            _ => {}
        }
        outcome
    }

    /// Source first, then target when different. Not atomic.
    fn persist_move(&self, source: &S::Node, target: &S::Node) -> Result<()> {
        self.persist_order(source)?;
        if target != source {
            self.persist_order(target)?;
        }
        Ok(())
    }

    /// Cancels any active drag; a no-op apart from sweeping stray placeholders
    /// when nothing is being dragged.
    pub fn cancel_drag(&mut self) -> DragOutcome<S::Node> {
        self.handle_pointer(PointerEvent::LeaveWindow)
    }

    /// Shows the add-card input in a column. Reopening only refocuses it.
    pub fn open_composer(&mut self, key: ColumnKey) -> Result<()> {
        let column = self.controller(key)?.node.clone();
        self.surface.open_composer(&column);
        self.controller_mut(key)?.composer_open = true;
        Ok(())
    }

    /// Submits composer text. Blank text keeps the composer open.
    pub fn submit_composer(&mut self, key: ColumnKey, text: &str) -> Result<Option<CardId>> {
        let added = self.add_card(key, text)?;
        if added.is_some() {
            self.close_composer(key)?;
        }
        Ok(added)
    }

    pub fn close_composer(&mut self, key: ColumnKey) -> Result<()> {
        let column = self.controller(key)?.node.clone();
        self.surface.close_composer(&column);
        self.controller_mut(key)?.composer_open = false;
        Ok(())
    }
}
