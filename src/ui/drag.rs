//! Pointer-driven card dragging.
//!
//! `Idle -> Dragging -> (commit | cancel) -> Idle`. Commit and cancel finish
//! within the event that triggers them and are reported as a
//! [`DragOutcome`]; the caller persists the affected columns.

use crate::ui::{Point, PointerEvent, PressTarget, Surface};
use std::mem;
use tracing::{debug, warn};

/// State of one in-progress drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession<N> {
    pub card: N,
    pub placeholder: N,
    /// Pointer position relative to the card's top-left corner at pickup
    pub offset: Point,
    /// Last column seen under the pointer
    pub target_column: N,
    pub origin_column: N,
    /// Node that followed the card before pickup, `None` if it was last
    pub origin_next: Option<N>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragState<N> {
    Idle,
    Dragging(DragSession<N>),
}

impl<N> Default for DragState<N> {
    fn default() -> Self {
        Self::Idle
    }
}

/// What an event did to the drag
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome<N> {
    /// Nothing happened
    Ignored,
    /// A card was picked up; transient listeners should be attached
    Started { card: N, column: N },
    Moved,
    /// The card was dropped; `source` and `target` need their order persisted
    Committed { card: N, source: N, target: N },
    /// The card went back to where it came from; only `origin` needs persisting
    Cancelled { card: N, origin: N },
}

impl<N> DragOutcome<N> {
    /// True when the drag ended and transient listeners should be detached
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed { .. } | Self::Cancelled { .. })
    }
}

/// Owns the single drag session of a board
pub struct DragController<S: Surface> {
    state: DragState<S::Node>,
    placeholder_min_height: f64,
}

impl<S: Surface> DragController<S> {
    pub fn new(placeholder_min_height: f64) -> Self {
        Self {
            state: DragState::Idle,
            placeholder_min_height,
        }
    }

    pub fn state(&self) -> &DragState<S::Node> {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession<S::Node>> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Applies one event to the state machine
    pub fn handle(&mut self, surface: &mut S, event: PointerEvent<S::Node>) -> DragOutcome<S::Node> {
        match event {
            PointerEvent::Down { target, point } => self.press(surface, &target, point),
            PointerEvent::Move { point } => self.pointer_move(surface, point),
            PointerEvent::Up { .. } => self.release(surface),
            PointerEvent::LeaveWindow => self.cancel(surface),
            PointerEvent::VisibilityChange { hidden: true } => self.cancel(surface),
            PointerEvent::VisibilityChange { hidden: false } => DragOutcome::Ignored,
        }
    }

    /// Picks up the card under a press, unless the press hit a control
    pub fn press(&mut self, surface: &mut S, target: &S::Node, point: Point) -> DragOutcome<S::Node> {
        if self.is_dragging() {
            return DragOutcome::Ignored;
        }
        // Delete and composer controls are resolved before the card itself
        let card = match surface.classify_press(target) {
            PressTarget::Card(card) => card,
            PressTarget::DeleteAffordance(_) | PressTarget::ComposerControl | PressTarget::Other => {
                return DragOutcome::Ignored
            }
        };
        let origin_column = match surface.parent(&card) {
            Some(column) => column,
            None => return DragOutcome::Ignored,
        };

        let rect = surface.bounding_box(&card);
        let offset = Point::new(point.x - rect.left, point.y - rect.top);
        let origin_next = surface.next_sibling(&card);

        let placeholder = match surface.create_placeholder(rect.height.max(self.placeholder_min_height)) {
            Ok(placeholder) => placeholder,
            Err(err) => {
                warn!(error = %err, "could not create placeholder; drag not started");
                return DragOutcome::Ignored;
            }
        };
        surface.insert_before(&origin_column, &placeholder, origin_next.as_ref());
        surface.lift(&card, rect);

        debug!(card = ?card, column = ?origin_column, "drag started");
        self.state = DragState::Dragging(DragSession {
            card: card.clone(),
            placeholder,
            offset,
            target_column: origin_column.clone(),
            origin_column: origin_column.clone(),
            origin_next,
        });

        // Position under the pointer right away so the card does not jump
        self.pointer_move(surface, point);
        DragOutcome::Started {
            card,
            column: origin_column,
        }
    }

    /// Follows the pointer and moves the placeholder to the live insertion point
    pub fn pointer_move(&mut self, surface: &mut S, point: Point) -> DragOutcome<S::Node> {
        let session = match &mut self.state {
            DragState::Dragging(session) => session,
            DragState::Idle => return DragOutcome::Ignored,
        };

        surface.move_lifted(
            &session.card,
            Point::new(point.x - session.offset.x, point.y - session.offset.y),
        );

        // Off-column moves keep the last known target
        let column = match surface.column_at(point) {
            Some(column) => column,
            None => return DragOutcome::Moved,
        };
        session.target_column = column.clone();

        let next = surface
            .card_nodes(&column)
            .into_iter()
            .find(|card| point.y < surface.bounding_box(card).mid_y());
        let reference = next.or_else(|| surface.add_affordance(&column));
        surface.insert_before(&column, &session.placeholder, reference.as_ref());

        DragOutcome::Moved
    }

    /// Drops the card at the placeholder
    pub fn release(&mut self, surface: &mut S) -> DragOutcome<S::Node> {
        let session = match mem::take(&mut self.state) {
            DragState::Dragging(session) => session,
            DragState::Idle => return DragOutcome::Ignored,
        };

        let landed = match surface.parent(&session.placeholder) {
            Some(column) if surface.is_attached(&session.placeholder) => {
                surface.insert_before(&column, &session.card, Some(&session.placeholder));
                surface.remove(&session.placeholder);
                column
            }
            _ => {
                surface.remove(&session.placeholder);
                let affordance = surface.add_affordance(&session.target_column);
                surface.insert_before(&session.target_column, &session.card, affordance.as_ref());
                session.target_column.clone()
            }
        };
        surface.settle(&session.card);

        debug!(card = ?session.card, source = ?session.origin_column, target = ?landed, "drag committed");
        DragOutcome::Committed {
            card: session.card,
            source: session.origin_column,
            target: landed,
        }
    }

    /// Puts the card back where it was picked up.
    ///
    /// Without an active drag this only sweeps stray placeholders.
    pub fn cancel(&mut self, surface: &mut S) -> DragOutcome<S::Node> {
        let session = match mem::take(&mut self.state) {
            DragState::Dragging(session) => session,
            DragState::Idle => {
                let swept = surface.remove_orphan_placeholders();
                if swept > 0 {
                    debug!(swept, "removed stray placeholders");
                }
                return DragOutcome::Ignored;
            }
        };

        let origin = &session.origin_column;
        let in_origin = |node: &S::Node, surface: &S| {
            surface.is_attached(node) && surface.parent(node).as_ref() == Some(origin)
        };
        // The pre-drag neighbour wins over the placeholder, which may have wandered
        let reference = match &session.origin_next {
            Some(next) if in_origin(next, &*surface) => Some(next.clone()),
            Some(_) if in_origin(&session.placeholder, &*surface) => {
                Some(session.placeholder.clone())
            }
            Some(_) => surface.add_affordance(origin),
            None => None,
        };
        surface.insert_before(origin, &session.card, reference.as_ref());
        surface.remove(&session.placeholder);
        surface.settle(&session.card);

        debug!(card = ?session.card, column = ?session.origin_column, "drag cancelled");
        DragOutcome::Cancelled {
            card: session.card,
            origin: session.origin_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ColumnKey;
    use crate::ui::memory_surface::{NodeId, CARD_HEIGHT, COLUMN_GAP, COLUMN_WIDTH};
    use crate::ui::MemorySurface;

    struct Fixture {
        surface: MemorySurface,
        drag: DragController<MemorySurface>,
        todo: NodeId,
        done: NodeId,
        cards: Vec<NodeId>,
    }

    /// `todo` holds cards A, B, C; `done` is empty
    fn fixture() -> Fixture {
        let mut surface = MemorySurface::new();
        let todo = surface.add_column(ColumnKey::Todo);
        let done = surface.add_column(ColumnKey::Done);
        let affordance = surface.add_affordance(&todo).unwrap();
        let cards = ["A", "B", "C"]
            .iter()
            .map(|text| {
                let card = surface.create_card(text).unwrap();
                surface.insert_before(&todo, &card, Some(&affordance));
                card
            })
            .collect();
        Fixture {
            surface,
            drag: DragController::new(0.0),
            todo,
            done,
            cards,
        }
    }

    fn done_x() -> f64 {
        COLUMN_WIDTH + COLUMN_GAP + 10.0
    }

    #[test]
    fn test_press_lifts_card_and_leaves_placeholder() {
        let mut f = fixture();
        let b = f.cards[1];
        let outcome = f.drag.press(&mut f.surface, &b, Point::new(15.0, 55.0));
        assert_eq!(outcome, DragOutcome::Started { card: b, column: f.todo });

        let session = f.drag.session().unwrap().clone();
        assert_eq!(session.offset, Point::new(15.0, 15.0));
        assert_eq!(session.origin_next, Some(f.cards[2]));
        assert!(f.surface.is_lifted(b));
        assert_eq!(f.surface.card_texts(f.todo), vec!["A", "C"]);

        // Placeholder keeps B's slot and height
        assert_eq!(f.surface.children(f.todo)[1], session.placeholder);
        assert_eq!(f.surface.bounding_box(&session.placeholder).height, CARD_HEIGHT);
        assert_eq!(f.surface.bounding_box(&b).top, 40.0);
    }

    #[test]
    fn test_press_on_delete_affordance_is_ignored() {
        let mut f = fixture();
        let delete = f.surface.delete_affordance_of(f.cards[0]).unwrap();
        let outcome = f.drag.press(&mut f.surface, &delete, Point::new(5.0, 5.0));
        assert_eq!(outcome, DragOutcome::Ignored);
        assert!(!f.drag.is_dragging());
        assert!(f.surface.placeholders().is_empty());
    }

    #[test]
    fn test_press_on_column_background_is_ignored() {
        let mut f = fixture();
        let todo = f.todo;
        let outcome = f.drag.press(&mut f.surface, &todo, Point::new(5.0, 500.0));
        assert_eq!(outcome, DragOutcome::Ignored);
    }

    #[test]
    fn test_move_uses_midpoint_rule() {
        let mut f = fixture();
        let c = f.cards[2];
        f.drag.press(&mut f.surface, &c, Point::new(10.0, 100.0));
        let placeholder = f.drag.session().unwrap().placeholder;

        // Above B's midpoint (60): placeholder goes before B
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 50.0));
        let children = f.surface.children(f.todo);
        assert_eq!(children[..3], [f.cards[0], placeholder, f.cards[1]]);

        // Above A's midpoint: goes first
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 5.0));
        assert_eq!(f.surface.children(f.todo)[0], placeholder);

        // Below every card: before the add affordance
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 700.0));
        let children = f.surface.children(f.todo);
        assert_eq!(children[2], placeholder);
        assert_eq!(children.len(), 4);
    }

    #[test]
    fn test_move_tracks_pointer_offset() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(30.0, 10.0));
        f.drag.pointer_move(&mut f.surface, Point::new(330.0, 410.0));
        let rect = f.surface.bounding_box(&a);
        assert_eq!((rect.left, rect.top), (300.0, 400.0));
    }

    #[test]
    fn test_move_without_column_keeps_target() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        f.drag.pointer_move(&mut f.surface, Point::new(done_x(), 10.0));
        assert_eq!(f.drag.session().unwrap().target_column, f.done);

        // Into the gap between columns, then far below the board
        assert_eq!(
            f.drag.pointer_move(&mut f.surface, Point::new(210.0, 10.0)),
            DragOutcome::Moved
        );
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 5_000.0));
        assert!(f.drag.is_dragging());
        assert_eq!(f.drag.session().unwrap().target_column, f.done);

        let outcome = f.drag.release(&mut f.surface);
        assert_eq!(
            outcome,
            DragOutcome::Committed { card: a, source: f.todo, target: f.done }
        );
        assert_eq!(f.surface.card_texts(f.done), vec!["A"]);
    }

    #[test]
    fn test_release_in_place_commits() {
        let mut f = fixture();
        let b = f.cards[1];
        f.drag.press(&mut f.surface, &b, Point::new(10.0, 60.0));
        let outcome = f.drag.release(&mut f.surface);

        assert_eq!(
            outcome,
            DragOutcome::Committed { card: b, source: f.todo, target: f.todo }
        );
        assert!(outcome.is_terminal());
        assert_eq!(f.surface.card_texts(f.todo), vec!["A", "B", "C"]);
        assert!(f.surface.placeholders().is_empty());
        assert!(!f.surface.is_lifted(b));
        assert!(!f.surface.is_grabbing());
        assert!(!f.drag.is_dragging());
    }

    #[test]
    fn test_release_across_columns() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        f.drag.pointer_move(&mut f.surface, Point::new(done_x(), 300.0));
        f.drag.release(&mut f.surface);

        assert_eq!(f.surface.card_texts(f.todo), vec!["B", "C"]);
        assert_eq!(f.surface.card_texts(f.done), vec!["A"]);
        // Add affordance stays last
        let children = f.surface.children(f.done);
        assert_eq!(children.last(), f.surface.add_affordance(&f.done).as_ref());
    }

    #[test]
    fn test_release_without_placeholder_appends_to_target() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        f.drag.pointer_move(&mut f.surface, Point::new(done_x(), 10.0));
        let placeholder = f.drag.session().unwrap().placeholder;
        f.surface.remove(&placeholder);

        let outcome = f.drag.release(&mut f.surface);
        assert_eq!(
            outcome,
            DragOutcome::Committed { card: a, source: f.todo, target: f.done }
        );
        assert_eq!(f.surface.children(f.done)[0], a);
        assert_eq!(f.surface.card_texts(f.done), vec!["A"]);
    }

    #[test]
    fn test_cancel_restores_original_position() {
        let mut f = fixture();
        let c = f.cards[2];
        f.drag.press(&mut f.surface, &c, Point::new(10.0, 100.0));
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 5.0));
        f.drag.pointer_move(&mut f.surface, Point::new(done_x(), 5.0));

        let outcome = f.drag.handle(&mut f.surface, PointerEvent::LeaveWindow);
        assert_eq!(outcome, DragOutcome::Cancelled { card: c, origin: f.todo });
        assert_eq!(f.surface.card_texts(f.todo), vec!["A", "B", "C"]);
        assert!(f.surface.card_texts(f.done).is_empty());
        assert!(f.surface.placeholders().is_empty());
        assert!(!f.surface.is_lifted(c));
    }

    #[test]
    fn test_cancel_after_reorder_within_origin_restores_slot() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        f.drag.pointer_move(&mut f.surface, Point::new(10.0, 700.0));

        f.drag.handle(&mut f.surface, PointerEvent::VisibilityChange { hidden: true });
        assert_eq!(f.surface.card_texts(f.todo), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_visible_again_does_not_cancel() {
        let mut f = fixture();
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        let outcome = f
            .drag
            .handle(&mut f.surface, PointerEvent::VisibilityChange { hidden: false });
        assert_eq!(outcome, DragOutcome::Ignored);
        assert!(f.drag.is_dragging());
    }

    #[test]
    fn test_cancel_when_idle_sweeps_placeholders() {
        let mut f = fixture();
        let stray = f.surface.create_placeholder(40.0).unwrap();
        let todo = f.todo;
        f.surface.insert_before(&todo, &stray, None);

        assert_eq!(f.drag.cancel(&mut f.surface), DragOutcome::Ignored);
        assert!(f.surface.placeholders().is_empty());
        assert_eq!(f.drag.cancel(&mut f.surface), DragOutcome::Ignored);
        assert_eq!(f.surface.card_texts(f.todo), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_events_while_idle_are_ignored() {
        let mut f = fixture();
        assert_eq!(
            f.drag.handle(&mut f.surface, PointerEvent::Move { point: Point::new(1.0, 1.0) }),
            DragOutcome::Ignored
        );
        assert_eq!(
            f.drag.handle(&mut f.surface, PointerEvent::Up { point: Point::new(1.0, 1.0) }),
            DragOutcome::Ignored
        );
    }

    #[test]
    fn test_second_press_during_drag_is_ignored() {
        let mut f = fixture();
        let (a, b) = (f.cards[0], f.cards[1]);
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        assert_eq!(
            f.drag.press(&mut f.surface, &b, Point::new(10.0, 50.0)),
            DragOutcome::Ignored
        );
        assert_eq!(f.drag.session().unwrap().card, a);
    }

    #[test]
    fn test_placeholder_min_height() {
        let mut f = fixture();
        f.drag = DragController::new(64.0);
        let a = f.cards[0];
        f.drag.press(&mut f.surface, &a, Point::new(10.0, 10.0));
        let placeholder = f.drag.session().unwrap().placeholder;
        assert_eq!(f.surface.bounding_box(&placeholder).height, 64.0);
    }
}
