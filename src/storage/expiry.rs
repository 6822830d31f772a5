//! Deferred invalidation of expired column records.
//!
//! Timers are never cancelled. Every fire re-reads the record and deletes it
//! only if it is still expired at that moment, so a timer armed before a
//! later write simply does nothing. A timer that fires before the expiry it
//! was armed for (hosts clamp long delays) arms a fresh check.

use crate::{
    clock::{Clock, ManualClock},
    storage::{record::ColumnRecord, KeyValueStore},
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// One-shot deferred task execution
pub trait Timer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);
}

/// Result of arming the expiry check for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    /// Nothing stored under the key
    NoRecord,
    /// Stored record carries no expiry, or could not be decoded
    NonExpiring,
    /// Record had already expired and was deleted
    Expired,
    /// A check was scheduled after the remaining lifetime
    Scheduled(Duration),
}

/// Arms one-shot expiry checks for stored records
#[derive(Clone)]
pub struct ExpiryScheduler {
    kv: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    timer: Rc<dyn Timer>,
}

impl ExpiryScheduler {
    pub fn new(kv: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>, timer: Rc<dyn Timer>) -> Self {
        Self { kv, clock, timer }
    }

    /// Schedules invalidation of the record under `key` for when it expires
    pub fn arm(&self, key: &str) -> ArmOutcome {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ArmOutcome::NoRecord,
            Err(err) => {
                warn!(key, error = %err, "could not read record to arm expiry");
                return ArmOutcome::NoRecord;
            }
        };
        let expires_at = match ColumnRecord::decode(&raw) {
            Ok(ColumnRecord {
                expires_at: Some(at),
                ..
            }) => at,
            _ => return ArmOutcome::NonExpiring,
        };

        let delay_ms = expires_at.saturating_sub(self.clock.now_ms());
        if delay_ms <= 0 {
            if let Err(err) = self.kv.remove(key) {
                warn!(key, error = %err, "failed to delete expired record");
            }
            debug!(key, "record already expired; deleted");
            return ArmOutcome::Expired;
        }

        let delay = Duration::from_millis(delay_ms as u64);
        let scheduler = self.clone();
        let key = key.to_string();
        debug!(key = %key, delay_ms, "expiry check scheduled");
        self.timer.schedule(
            delay,
            Box::new(move || scheduler.on_fire(&key, expires_at)),
        );
        ArmOutcome::Scheduled(delay)
    }

    fn on_fire(&self, key: &str, armed_for: i64) {
        if expire_if_stale(self.kv.as_ref(), self.clock.as_ref(), key) {
            return;
        }
        // A rewritten record has a new expiry and its own timer
        let unchanged = self
            .kv
            .get(key)
            .ok()
            .flatten()
            .and_then(|raw| ColumnRecord::decode(&raw).ok())
            .map_or(false, |record| record.expires_at == Some(armed_for));
        if unchanged {
            debug!(key, "expiry check fired early; re-arming");
            self.arm(key);
        }
    }
}

/// Deletes the record under `key` if it is expired right now.
///
/// Returns true when a record was deleted.
pub fn expire_if_stale(kv: &dyn KeyValueStore, clock: &dyn Clock, key: &str) -> bool {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        _ => return false,
    };
    let expired = ColumnRecord::decode(&raw)
        .map(|record| record.is_expired(clock.now_ms()))
        .unwrap_or(false);
    if !expired {
        return false;
    }
    match kv.remove(key) {
        Ok(()) => {
            debug!(key, "expired record deleted");
            true
        }
        Err(err) => {
            warn!(key, error = %err, "failed to delete expired record");
            false
        }
    }
}

struct PendingTask {
    due_ms: i64,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Timer driven by a [`ManualClock`]; tasks run only from [`ManualTimer::run_due`]
pub struct ManualTimer {
    clock: Rc<ManualClock>,
    queue: RefCell<Vec<PendingTask>>,
    next_seq: Cell<u64>,
}

impl ManualTimer {
    pub fn new(clock: Rc<ManualClock>) -> Self {
        Self {
            clock,
            queue: RefCell::new(Vec::new()),
            next_seq: Cell::new(0),
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Runs every task whose deadline has passed, earliest first.
    ///
    /// Returns the number of tasks run.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now_ms();
        let mut due: Vec<PendingTask> = {
            let mut queue = self.queue.borrow_mut();
            let (due, waiting): (Vec<_>, Vec<_>) =
                queue.drain(..).partition(|pending| pending.due_ms <= now);
            *queue = waiting;
            due
        };
        due.sort_by_key(|pending| (pending.due_ms, pending.seq));

        let count = due.len();
        for pending in due {
            (pending.task)();
        }
        count
    }

    /// Advances the clock and runs whatever became due
    pub fn advance(&self, by: Duration) -> usize {
        self.clock.advance(by);
        self.run_due()
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.queue.borrow_mut().push(PendingTask {
            due_ms: self
                .clock
                .now_ms()
                .saturating_add(i64::try_from(delay.as_millis()).unwrap_or(i64::MAX)),
            seq,
            task,
        });
    }
}

/// Timer backed by the tokio runtime.
///
/// Tasks queue on the timer's own `LocalSet`, so scheduling works from any
/// context. They run only while the host drives [`TokioTimer::run_until`].
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct TokioTimer {
    tasks: tokio::task::LocalSet,
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drives `future` to completion, running due tasks alongside it
    pub async fn run_until<F: std::future::Future>(&self, future: F) -> F::Output {
        self.tasks.run_until(future).await
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        self.tasks.spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
