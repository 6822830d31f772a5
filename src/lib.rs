//! # Swimlane
//!
//! A three-column card board (`todo` / `inprogress` / `done`) with
//! drag-and-drop reordering and TTL-cached local persistence.
//!
//! The interactive core is written against two seams: [`ui::Surface`], a
//! DOM-like rendering environment, and [`storage::KeyValueStore`], a
//! string key/value store. The `web` feature binds both to the browser;
//! [`ui::MemorySurface`] and [`storage::MemoryStore`] run the same board
//! headlessly.

pub mod clock;
pub mod domain;
pub mod error;
pub mod storage;
pub mod ui;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "web")]
pub mod web;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{BoardConfig, Card, CardId, ColumnKey};
pub use error::{Result, SwimlaneError};
pub use storage::{CardStore, ExpiryScheduler, KeyValueStore, MemoryStore, Timer};
pub use ui::{Board, DragOutcome, MemorySurface, Point, PointerEvent, Rect, Surface};
