//! Core use-case services.
//!
//! # Responsibility
//! - Own the deck, the durable drawing document and speech dispatch.
//! - Keep callers decoupled from storage details and storage faults.

pub mod deck_store;
pub mod drawing_store;
pub mod speech;
