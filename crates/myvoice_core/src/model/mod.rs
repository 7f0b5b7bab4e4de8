//! Domain model for the card deck and the drawing canvas.
//!
//! # Responsibility
//! - Define the persisted shapes of both durable aggregates.
//! - Keep style and icon references opaque at the core layer.
//!
//! # Invariants
//! - `Deck` order is the display and speak order; there is no rank field.
//! - `Deck` and `Drawing` never reference each other.

pub mod card;
pub mod stroke;
