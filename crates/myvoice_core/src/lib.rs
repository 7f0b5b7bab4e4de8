//! Core state layer for the MyVoice communication board.
//! This crate owns the card deck, the saved drawing and the canvas
//! readiness protocol; presentation lives elsewhere.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use config::{ConfigError, CoreConfig, FirstRunPolicy};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::card::{Card, CardId, CardValidationError, Deck};
pub use model::stroke::{Drawing, Point, StrokePath};
pub use repo::kv_store::{
    KeyValueStore, KvError, KvResult, MemoryKeyValueStore, SqliteKeyValueStore,
};
pub use repo::slot_repo::{MemorySlotStore, SlotError, SlotResult, SlotStore, SqliteSlotStore};
pub use service::deck_store::{
    apply_command, CardDeckStore, DeckCommand, DeckCommandError, DragEnd, HydrationSource,
};
pub use service::drawing_store::DrawingStore;
pub use service::speech::{SpeechDispatcher, SpeechEngine};
pub use sync::canvas_sync::{CanvasSynchronizer, SaveOutcome, SyncPhase};
pub use sync::surface::{DrawingSurface, SurfaceError, SurfaceSlot};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
