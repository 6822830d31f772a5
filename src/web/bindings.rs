//! JavaScript entry point.
//!
//! Column listeners live as long as the [`WebBoard`]. Document and window
//! listeners exist only while a drag is in progress.

use crate::{
    clock::{Clock, SystemClock},
    domain::{BoardConfig, ColumnKey},
    error::SwimlaneError,
    storage::{KeyValueStore, Timer},
    ui::{Board, DragOutcome, Point, PointerEvent, PressTarget},
    web::{DomClasses, DomSurface, LocalStorage, WindowTimer},
};
use serde::Deserialize;
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    str::FromStr,
};
use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Element, Event, EventTarget, MouseEvent};

/// Board settings plus the class names of the host page
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WebConfig {
    #[serde(flatten)]
    board: BoardConfig,
    classes: DomClasses,
}

fn to_js(err: SwimlaneError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A DOM event listener removed when dropped
struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn attach(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }

    fn detach(&self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.detach();
    }
}

struct Shared {
    board: RefCell<Board<DomSurface>>,
    column_listeners: RefCell<Vec<EventListener>>,
    drag_listeners: RefCell<Vec<EventListener>>,
    // Detached drag listeners are kept until the next drag ends, since the
    // one that ended the drag is still running
    retired: RefCell<Vec<EventListener>>,
}

fn handler(shared: &Rc<Shared>, f: impl Fn(&Rc<Shared>, Event) + 'static) -> impl FnMut(Event) + 'static {
    let weak: Weak<Shared> = Rc::downgrade(shared);
    move |event| {
        if let Some(shared) = weak.upgrade() {
            f(&shared, event);
        }
    }
}

fn pointer_of(event: &Event) -> Option<Point> {
    event
        .dyn_ref::<MouseEvent>()
        .map(|mouse| Point::new(mouse.client_x() as f64, mouse.client_y() as f64))
}

fn target_element(event: &Event) -> Option<Element> {
    event.target().and_then(|target| target.dyn_into::<Element>().ok())
}

impl Shared {
    fn dispatch(&self, event: PointerEvent<Element>) -> DragOutcome<Element> {
        let outcome = match self.board.try_borrow_mut() {
            Ok(mut board) => board.handle_pointer(event),
            Err(_) => {
                warn!("board is busy; pointer event dropped");
                return DragOutcome::Ignored;
            }
        };
        if outcome.is_terminal() {
            self.detach_drag_listeners();
        }
        outcome
    }

    fn on_mouse_down(shared: &Rc<Shared>, event: Event) {
        let primary = event
            .dyn_ref::<MouseEvent>()
            .map(|mouse| mouse.button() == 0)
            .unwrap_or(false);
        if !primary {
            return;
        }
        let (target, point) = match (target_element(&event), pointer_of(&event)) {
            (Some(target), Some(point)) => (target, point),
            _ => return,
        };

        if let DragOutcome::Started { .. } = shared.dispatch(PointerEvent::Down { target, point }) {
            event.prevent_default();
            if let Err(err) = Shared::attach_drag_listeners(shared) {
                warn!(error = ?err, "could not track the drag; cancelling it");
                shared.detach_drag_listeners();
                shared.dispatch(PointerEvent::LeaveWindow);
            }
        }
    }

    fn attach_drag_listeners(shared: &Rc<Shared>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = shared.board.borrow().surface().document().clone();
        let root = document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?;

        let mut listeners = Vec::with_capacity(4);
        listeners.push(EventListener::attach(
            &document,
            "mousemove",
            handler(shared, |shared, event| {
                if let Some(point) = pointer_of(&event) {
                    shared.dispatch(PointerEvent::Move { point });
                }
            }),
        )?);
        listeners.push(EventListener::attach(
            &window,
            "mouseup",
            handler(shared, |shared, event| {
                if let Some(point) = pointer_of(&event) {
                    shared.dispatch(PointerEvent::Up { point });
                }
            }),
        )?);
        listeners.push(EventListener::attach(
            &root,
            "mouseleave",
            handler(shared, |shared, _| {
                shared.dispatch(PointerEvent::LeaveWindow);
            }),
        )?);
        let visibility_document = document.clone();
        listeners.push(EventListener::attach(
            &document,
            "visibilitychange",
            handler(shared, move |shared, _| {
                shared.dispatch(PointerEvent::VisibilityChange {
                    hidden: visibility_document.hidden(),
                });
            }),
        )?);

        *shared.drag_listeners.borrow_mut() = listeners;
        Ok(())
    }

    fn detach_drag_listeners(&self) {
        let listeners = std::mem::take(&mut *self.drag_listeners.borrow_mut());
        for listener in &listeners {
            listener.detach();
        }
        *self.retired.borrow_mut() = listeners;
    }

    fn on_click(&self, key: ColumnKey, event: Event) {
        let target = match target_element(&event) {
            Some(target) => target,
            None => return,
        };
        let mut board = match self.board.try_borrow_mut() {
            Ok(board) => board,
            Err(_) => return,
        };

        let classes = board.surface().classes().clone();
        let in_composer = board.surface().closest(&target, &classes.input_container).is_some();
        if in_composer {
            let result = if board.surface().closest(&target, &classes.add_button).is_some() {
                let text = board
                    .column_node(key)
                    .and_then(|column| board.surface().composer_text(column))
                    .unwrap_or_default();
                board.submit_composer(key, &text).map(|_| ())
            } else if board.surface().closest(&target, &classes.delete).is_some() {
                board.close_composer(key)
            } else {
                Ok(())
            };
            if let Err(err) = result {
                warn!(column = %key, error = %err, "add-card input action failed");
            }
            return;
        }

        if let PressTarget::DeleteAffordance(card) = board.surface().classify_press(&target) {
            event.stop_propagation();
            board.delete_card(&card);
            return;
        }

        if board.surface().closest(&target, &classes.add_link).is_some() {
            event.prevent_default();
            if let Err(err) = board.open_composer(key) {
                warn!(column = %key, error = %err, "failed to open add-card input");
            }
        }
    }
}

/// A board bound to the current document, persisted in `localStorage`
#[wasm_bindgen]
pub struct WebBoard {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WebBoard {
    /// Creates a board from an optional JSON config, e.g.
    /// `{"ttl_ms": 60000, "classes": {"card": "ticket"}}`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebBoard, JsValue> {
        let config: WebConfig = match config_json.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|err| to_js(err.into()))?,
            None => WebConfig::default(),
        };

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;

        let kv: Rc<dyn KeyValueStore> = Rc::new(LocalStorage::from_window().map_err(to_js)?);
        let clock: Rc<dyn Clock> = Rc::new(SystemClock);
        let timer: Rc<dyn Timer> = Rc::new(WindowTimer::new(window));
        let surface = DomSurface::new(document, config.classes);
        let board = Board::new(config.board, surface, kv, clock, timer).map_err(to_js)?;

        Ok(Self {
            shared: Rc::new(Shared {
                board: RefCell::new(board),
                column_listeners: RefCell::new(Vec::new()),
                drag_listeners: RefCell::new(Vec::new()),
                retired: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Mounts a column element. Its key comes from its class list and
    /// defaults to `todo`. Returns the number of cards restored.
    pub fn attach(&self, column: Element) -> Result<usize, JsValue> {
        let key = ColumnKey::from_classes(column.class_name().split_whitespace());
        let restored = self
            .shared
            .board
            .borrow_mut()
            .mount_column(key, column.clone())
            .map_err(to_js)?;

        let mousedown = EventListener::attach(&column, "mousedown", handler(&self.shared, Shared::on_mouse_down))?;
        let click = EventListener::attach(
            &column,
            "click",
            handler(&self.shared, move |shared, event| shared.on_click(key, event)),
        )?;
        self.shared
            .column_listeners
            .borrow_mut()
            .extend([mousedown, click]);

        debug!(column = %key, restored, "column attached");
        Ok(restored)
    }

    /// Mounts every element carrying the configured column class
    #[wasm_bindgen(js_name = attachAll)]
    pub fn attach_all(&self) -> Result<usize, JsValue> {
        let (document, selector) = {
            let board = self.shared.board.borrow();
            let surface = board.surface();
            (
                surface.document().clone(),
                DomClasses::selector(&surface.classes().column),
            )
        };
        let columns = document.query_selector_all(&selector)?;
        let mut restored = 0;
        for index in 0..columns.length() {
            if let Some(column) = columns.item(index).and_then(|node| node.dyn_into::<Element>().ok()) {
                restored += self.attach(column)?;
            }
        }
        Ok(restored)
    }

    /// Aborts an in-progress drag, restoring the card to its origin
    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&self) {
        self.shared.dispatch(PointerEvent::LeaveWindow);
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.shared.board.borrow().is_dragging()
    }

    /// Cards of a column in on-screen order, as a JSON array
    #[wasm_bindgen(js_name = cardsJson)]
    pub fn cards_json(&self, column: &str) -> Result<String, JsValue> {
        let key = ColumnKey::from_str(column).map_err(to_js)?;
        let cards = self.shared.board.borrow().column_cards(key);
        serde_json::to_string(&cards).map_err(|err| to_js(err.into()))
    }

    #[wasm_bindgen(js_name = addCard)]
    pub fn add_card(&self, column: &str, text: &str) -> Result<Option<String>, JsValue> {
        let key = ColumnKey::from_str(column).map_err(to_js)?;
        let id = self
            .shared
            .board
            .borrow_mut()
            .add_card(key, text)
            .map_err(to_js)?;
        Ok(id.map(|id| id.to_string()))
    }
}
