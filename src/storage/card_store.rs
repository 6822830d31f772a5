use crate::{
    clock::Clock,
    domain::{BoardConfig, Card, CardId, ColumnKey},
    error::Result,
    storage::{
        expiry::{ArmOutcome, ExpiryScheduler, Timer},
        record::ColumnRecord,
        KeyValueStore,
    },
};
use std::rc::Rc;
use tracing::{debug, warn};

/// Typed access to the persisted card list of each column.
///
/// Every write refreshes the record's expiry to now + TTL and re-arms the
/// expiry check. Columns are written independently; moving a card between
/// columns takes two writes and is not atomic.
pub struct CardStore {
    kv: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    scheduler: ExpiryScheduler,
    ttl_ms: i64,
    key_prefix: String,
}

impl CardStore {
    pub fn new(
        config: &BoardConfig,
        kv: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        let scheduler = ExpiryScheduler::new(Rc::clone(&kv), Rc::clone(&clock), timer);
        Self {
            kv,
            clock,
            scheduler,
            ttl_ms: i64::try_from(config.ttl_ms).unwrap_or(i64::MAX),
            key_prefix: config.key_prefix.clone(),
        }
    }

    pub fn key(&self, column: ColumnKey) -> String {
        column.storage_key(&self.key_prefix)
    }

    /// Reads the stored record for a column without applying expiry
    pub fn record(&self, column: ColumnKey) -> Option<ColumnRecord> {
        let raw = self.kv.get(&self.key(column)).ok().flatten()?;
        ColumnRecord::decode(&raw).ok()
    }

    /// Returns the column's cards in stored order.
    ///
    /// Never fails: absent, undecodable, or expired records read as empty.
    /// Expired records are deleted on the way out.
    pub fn read(&self, column: ColumnKey) -> Vec<Card> {
        let key = self.key(column);
        let raw = match self.kv.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(key = %key, error = %err, "storage read failed; treating column as empty");
                return Vec::new();
            }
        };

        let record = match ColumnRecord::decode(&raw) {
            Ok(record) => record,
            Err(err) => {
                debug!(key = %key, error = %err, "undecodable record; treating column as empty");
                return Vec::new();
            }
        };

        if record.is_expired(self.clock.now_ms()) {
            debug!(key = %key, "record expired on read; deleting");
            if let Err(err) = self.kv.remove(&key) {
                warn!(key = %key, error = %err, "failed to delete expired record");
            }
            return Vec::new();
        }

        record.cards
    }

    /// Replaces the column's cards and refreshes the expiry
    pub fn write(&self, column: ColumnKey, cards: &[Card]) -> Result<()> {
        let key = self.key(column);
        let expires_at = self.clock.now_ms().saturating_add(self.ttl_ms);
        let payload = ColumnRecord::encode(cards, expires_at)?;
        self.kv.set(&key, &payload)?;
        debug!(key = %key, count = cards.len(), expires_at, "column written");
        self.arm_expiry(column);
        Ok(())
    }

    /// Appends a card to the stored list
    pub fn append(&self, column: ColumnKey, card: &Card) -> Result<()> {
        let mut cards = self.read(column);
        cards.push(card.clone());
        self.write(column, &cards)
    }

    /// Drops the card with `id` from the stored list
    pub fn remove(&self, column: ColumnKey, id: &CardId) -> Result<()> {
        let cards: Vec<Card> = self
            .read(column)
            .into_iter()
            .filter(|card| &card.id != id)
            .collect();
        self.write(column, &cards)
    }

    pub fn arm_expiry(&self, column: ColumnKey) -> ArmOutcome {
        self.scheduler.arm(&self.key(column))
    }
}
