//! Card deck store.
//!
//! # Responsibility
//! - Own the ordered deck for the whole process.
//! - Apply add/remove/reorder/reset as pure transitions of the prior deck.
//! - Persist every accepted command to the deck slot as an explicit side
//!   effect of `dispatch`.
//!
//! # Invariants
//! - The store is hydrated from its slot before any caller can observe it.
//! - Card ids are unique within the deck; `add` rejects duplicates.
//! - Unknown ids in remove/reorder are no-ops, not errors.
//! - Slot write failures are logged and never surfaced.

use crate::config::{CoreConfig, FirstRunPolicy};
use crate::model::card::{Card, CardId, CardValidationError, Deck};
use crate::repo::slot_repo::SlotStore;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One mutation request against the deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckCommand {
    Add(Card),
    Remove(CardId),
    Reorder { active_id: CardId, over_id: CardId },
    Reset,
}

impl DeckCommand {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Reorder { .. } => "reorder",
            Self::Reset => "reset",
        }
    }
}

/// Rejected deck command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckCommandError {
    InvalidCard(CardValidationError),
    DuplicateId(CardId),
}

impl Display for DeckCommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCard(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "card id already in deck: {id}"),
        }
    }
}

impl Error for DeckCommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCard(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<CardValidationError> for DeckCommandError {
    fn from(value: CardValidationError) -> Self {
        Self::InvalidCard(value)
    }
}

/// End of a drag gesture from the reorder source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active_id: CardId,
    /// Card under the pointer when released; `None` when dropped outside.
    pub over_id: Option<CardId>,
}

impl DragEnd {
    /// Maps the gesture to a reorder command.
    ///
    /// Returns `None` when dropped outside the deck or onto itself.
    pub fn to_command(&self) -> Option<DeckCommand> {
        let over_id = self.over_id.as_ref()?;
        if *over_id == self.active_id {
            return None;
        }
        Some(DeckCommand::Reorder {
            active_id: self.active_id.clone(),
            over_id: over_id.clone(),
        })
    }
}

/// Where the hydrated deck came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationSource {
    /// The slot held a readable deck.
    Persisted,
    /// The slot was never written; the first-run policy applied.
    FirstRun,
    /// The slot was unreadable; the first-run policy applied.
    Recovered,
}

/// Computes the deck produced by `command` without touching storage.
pub fn apply_command(deck: &Deck, command: &DeckCommand) -> Result<Deck, DeckCommandError> {
    match command {
        DeckCommand::Add(card) => appended(deck, card),
        DeckCommand::Remove(id) => Ok(removed(deck, id)),
        DeckCommand::Reorder { active_id, over_id } => Ok(reordered(deck, active_id, over_id)),
        DeckCommand::Reset => Ok(Deck::defaults()),
    }
}

fn appended(deck: &Deck, card: &Card) -> Result<Deck, DeckCommandError> {
    card.validate()?;
    if deck.contains(&card.id) {
        return Err(DeckCommandError::DuplicateId(card.id.clone()));
    }
    Ok(deck.cards().iter().chain([card]).cloned().collect())
}

fn removed(deck: &Deck, id: &str) -> Deck {
    let Some(index) = deck.position(id) else {
        return deck.clone();
    };
    let mut cards = deck.cards().to_vec();
    cards.remove(index);
    cards.into()
}

// Single-slot move: the active card lands at the index `over_id` held
// before the move, shifting everything in between by one.
fn reordered(deck: &Deck, active_id: &str, over_id: &str) -> Deck {
    if active_id == over_id {
        return deck.clone();
    }
    let (Some(from), Some(to)) = (deck.position(active_id), deck.position(over_id)) else {
        return deck.clone();
    };
    let mut cards = deck.cards().to_vec();
    let moved = cards.remove(from);
    cards.insert(to, moved);
    cards.into()
}

/// Process-wide owner of the deck.
pub struct CardDeckStore<S: SlotStore> {
    slots: S,
    slot_key: String,
    deck: Deck,
    hydration: HydrationSource,
}

impl<S: SlotStore> CardDeckStore<S> {
    /// Hydrates using storage key and first-run policy from `config`.
    pub fn from_config(slots: S, config: &CoreConfig) -> Self {
        Self::hydrate(slots, config.storage.deck_slot_key.clone(), config.deck.first_run)
    }

    /// Reads the deck slot once and builds the store.
    ///
    /// A missing or unreadable slot falls back to `policy`; the fallback
    /// deck is written back so the slot is readable on the next start.
    pub fn hydrate(slots: S, slot_key: impl Into<String>, policy: FirstRunPolicy) -> Self {
        let slot_key = slot_key.into();
        let loaded = match slots.read_slot(&slot_key) {
            Ok(Some(payload)) => match serde_json::from_str::<Deck>(&payload) {
                Ok(deck) => Ok(deck),
                Err(err) => {
                    warn!(
                        "event=deck_hydrate module=deck status=error error_code=deck_decode_failed error={err}"
                    );
                    Err(HydrationSource::Recovered)
                }
            },
            Ok(None) => Err(HydrationSource::FirstRun),
            Err(err) => {
                warn!(
                    "event=deck_hydrate module=deck status=error error_code=deck_read_failed error={err}"
                );
                Err(HydrationSource::Recovered)
            }
        };

        let mut store = Self {
            slots,
            slot_key,
            deck: Deck::new(),
            hydration: HydrationSource::Persisted,
        };

        match loaded {
            Ok(deck) => store.deck = deck,
            Err(source) => {
                store.hydration = source;
                store.deck = match policy {
                    FirstRunPolicy::Defaults => Deck::defaults(),
                    FirstRunPolicy::Empty => Deck::new(),
                };
                store.persist();
            }
        }

        info!(
            "event=deck_hydrate module=deck status=ok source={:?} len={}",
            store.hydration,
            store.deck.len()
        );
        store
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn cards(&self) -> &[Card] {
        self.deck.cards()
    }

    pub fn hydration_source(&self) -> HydrationSource {
        self.hydration
    }

    pub fn slot_key(&self) -> &str {
        &self.slot_key
    }

    /// Applies one command and persists the resulting deck.
    ///
    /// Rejected commands leave both the deck and the slot untouched.
    pub fn dispatch(&mut self, command: DeckCommand) -> Result<&Deck, DeckCommandError> {
        let next = apply_command(&self.deck, &command).map_err(|err| {
            debug!(
                "event=deck_mutation module=deck status=rejected command={} error={err}",
                command.name()
            );
            err
        })?;
        Ok(self.commit(command.name(), next))
    }

    /// Appends `card` to the end of the deck.
    pub fn add(&mut self, card: Card) -> Result<&Deck, DeckCommandError> {
        self.dispatch(DeckCommand::Add(card))
    }

    /// Removes the card with `id`; unknown ids leave the deck unchanged.
    pub fn remove(&mut self, id: &str) -> &Deck {
        self.dispatch_infallible(DeckCommand::Remove(id.to_string()))
    }

    /// Moves `active_id` into the slot held by `over_id`.
    pub fn reorder(&mut self, active_id: &str, over_id: &str) -> &Deck {
        self.dispatch_infallible(DeckCommand::Reorder {
            active_id: active_id.to_string(),
            over_id: over_id.to_string(),
        })
    }

    /// Replaces the deck with the built-in defaults.
    pub fn reset(&mut self) -> &Deck {
        self.dispatch_infallible(DeckCommand::Reset)
    }

    /// Handles a drag-end event; ignored when it carries no usable target.
    pub fn apply_drag_end(&mut self, event: &DragEnd) -> &Deck {
        match event.to_command() {
            Some(command) => self.dispatch_infallible(command),
            None => &self.deck,
        }
    }

    // Only `Add` can be rejected; the other commands always commit.
    fn dispatch_infallible(&mut self, command: DeckCommand) -> &Deck {
        let _ = self.dispatch(command);
        &self.deck
    }

    fn commit(&mut self, command: &'static str, next: Deck) -> &Deck {
        self.deck = next;
        debug!(
            "event=deck_mutation module=deck status=ok command={command} len={}",
            self.deck.len()
        );
        self.persist();
        &self.deck
    }

    fn persist(&self) {
        let payload = match serde_json::to_string(&self.deck) {
            Ok(payload) => payload,
            Err(err) => {
                error!(
                    "event=deck_persist module=deck status=error error_code=deck_encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = self.slots.write_slot(&self.slot_key, &payload) {
            warn!(
                "event=deck_persist module=deck status=error error_code=deck_write_failed error={err}"
            );
        }
    }
}
