use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Opaque unique identifier of a card
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Generates a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardId {
    type Err = crate::error::SwimlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Stored ids are opaque; only the empty string is unusable as identity
        if s.is_empty() {
            return Err(crate::error::SwimlaneError::InvalidCardId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A card on the board. Both fields are fixed once the card exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub text: String,
}

impl Card {
    pub fn new(id: CardId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Builds a new card from raw composer input.
    ///
    /// The text is trimmed; blank input yields `None` so no card is created.
    pub fn from_input(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self::new(CardId::generate(), text))
    }
}
