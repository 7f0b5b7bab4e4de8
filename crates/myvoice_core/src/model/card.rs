//! Card and deck domain model.
//!
//! # Responsibility
//! - Define the speakable card record and the ordered deck container.
//! - Provide the built-in default deck used on first run and on reset.
//!
//! # Invariants
//! - `id` is unique within a deck (enforced by the deck store, not here).
//! - `label` is non-empty after trimming.
//! - `icon_name` and `color` are opaque tokens and are never validated.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Caller-supplied card identity.
///
/// Kept as a type alias so persisted ids written by older builds (plain
/// timestamps, short words) stay valid.
pub type CardId = String;

/// One speakable unit on the board.
///
/// Serialized with `iconName` to keep the persisted slot layout stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    /// Text shown on the card and handed to speech.
    pub label: String,
    /// Icon name resolved by the presentation layer.
    pub icon_name: String,
    /// Opaque style token.
    pub color: String,
}

/// Validation errors for card records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    EmptyId,
    EmptyLabel { id: CardId },
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "card id cannot be empty"),
            Self::EmptyLabel { id } => write!(f, "card `{id}` has an empty label"),
        }
    }
}

impl Error for CardValidationError {}

impl Card {
    /// Creates a card with a freshly generated id.
    pub fn new(
        label: impl Into<String>,
        icon_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), label, icon_name, color)
    }

    /// Creates a card with a caller-provided id.
    ///
    /// Used for the built-in deck and for callers that own id generation.
    pub fn with_id(
        id: impl Into<CardId>,
        label: impl Into<String>,
        icon_name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon_name: icon_name.into(),
            color: color.into(),
        }
    }

    /// Checks record-level invariants.
    ///
    /// Deck-level uniqueness is checked by the deck store.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        if self.id.trim().is_empty() {
            return Err(CardValidationError::EmptyId);
        }
        if self.label.trim().is_empty() {
            return Err(CardValidationError::EmptyLabel {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Ordered collection of cards.
///
/// Persisted as a bare JSON array of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the built-in starter deck.
    pub fn defaults() -> Self {
        DEFAULT_CARDS
            .iter()
            .map(|(id, label, icon, color)| Card::with_id(*id, *label, *icon, *color))
            .collect()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Returns the index of the first card with `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.cards.iter().map(|card| card.id.as_str()).collect()
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

impl From<Vec<Card>> for Deck {
    fn from(cards: Vec<Card>) -> Self {
        Self { cards }
    }
}

impl FromIterator<Card> for Deck {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        Self {
            cards: iter.into_iter().collect(),
        }
    }
}

const DEFAULT_CARDS: &[(&str, &str, &str, &str)] = &[
    (
        "water",
        "Water",
        "GlassWater",
        "bg-blue-100 text-blue-800 border-blue-200",
    ),
    (
        "food",
        "Hungry",
        "Utensils",
        "bg-orange-100 text-orange-800 border-orange-200",
    ),
    (
        "rest",
        "Tired",
        "Moon",
        "bg-purple-100 text-purple-800 border-purple-200",
    ),
    (
        "help",
        "Help",
        "ShieldAlert",
        "bg-red-100 text-red-800 border-red-200",
    ),
    (
        "yes",
        "Yes",
        "ThumbsUp",
        "bg-emerald-100 text-emerald-800 border-emerald-200",
    ),
    (
        "no",
        "No",
        "ThumbsDown",
        "bg-rose-100 text-rose-800 border-rose-200",
    ),
];

#[cfg(test)]
mod tests {
    use super::{Card, CardValidationError, Deck};

    #[test]
    fn defaults_keep_builtin_order() {
        let deck = Deck::defaults();
        assert_eq!(deck.ids(), vec!["water", "food", "rest", "help", "yes", "no"]);
        assert!(deck.cards().iter().all(|card| card.validate().is_ok()));
    }

    #[test]
    fn validate_rejects_blank_label() {
        let card = Card::with_id("x", "   ", "Smile", "bg-slate-100");
        assert_eq!(
            card.validate(),
            Err(CardValidationError::EmptyLabel { id: "x".to_string() })
        );
    }

    #[test]
    fn new_generates_distinct_ids() {
        let a = Card::new("Hi", "Smile", "");
        let b = Card::new("Hi", "Smile", "");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serializes_icon_name_in_camel_case() {
        let card = Card::with_id("water", "Water", "GlassWater", "blue");
        let json = serde_json::to_string(&card).expect("card should serialize");
        assert_eq!(
            json,
            r#"{"id":"water","label":"Water","iconName":"GlassWater","color":"blue"}"#
        );

        let deck_json = serde_json::to_string(&Deck::from(vec![card])).expect("deck");
        assert!(deck_json.starts_with('['));
    }
}
