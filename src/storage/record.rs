//! On-disk shape of a column record.
//!
//! Current form: `{"data": [{"id": .., "text": ..}, ..], "expiresAt": <epoch ms>}`.
//! A bare array of cards is still accepted and never expires until rewritten.

use crate::{domain::Card, error::Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Decoded column record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    pub cards: Vec<Card>,
    /// `None` for records that never expire (legacy bare arrays, or an
    /// envelope without a numeric `expiresAt`)
    pub expires_at: Option<i64>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    data: &'a [Card],
    #[serde(rename = "expiresAt")]
    expires_at: i64,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Value,
    #[serde(rename = "expiresAt", default)]
    expires_at: Value,
}

impl ColumnRecord {
    /// Returns true once `now_ms` has reached the expiry timestamp
    pub fn is_expired(&self, now_ms: i64) -> bool {
        matches!(self.expires_at, Some(at) if now_ms >= at)
    }

    /// Decodes either record form
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if value.is_array() {
            let cards: Vec<Card> = serde_json::from_value(value)?;
            return Ok(Self {
                cards,
                expires_at: None,
            });
        }

        let envelope: RawEnvelope = serde_json::from_value(value)?;
        let cards = if envelope.data.is_array() {
            serde_json::from_value(envelope.data)?
        } else {
            Vec::new()
        };
        let expires_at = envelope
            .expires_at
            .as_f64()
            .filter(|at| at.is_finite())
            .map(|at| at as i64);

        Ok(Self { cards, expires_at })
    }

    /// Encodes cards in the current envelope form
    pub fn encode(cards: &[Card], expires_at: i64) -> Result<String> {
        Ok(serde_json::to_string(&EnvelopeRef {
            data: cards,
            expires_at,
        })?)
    }
}
