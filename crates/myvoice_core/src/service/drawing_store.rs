//! Stroke persistence adapter.
//!
//! # Responsibility
//! - Save and load the whole drawing document under one fixed key.
//! - Absorb every storage fault so drawing is never interrupted.
//!
//! # Invariants
//! - Saves are whole-document, last-writer-wins.
//! - Callers cannot distinguish a read failure from "nothing saved".
//! - A failed save is logged only; memory and storage may then diverge.

use crate::config::CoreConfig;
use crate::model::stroke::{Drawing, StrokePath};
use crate::repo::kv_store::{KeyValueStore, KvResult};
use log::{debug, warn};

/// Adapter between the canvas and the asynchronous key-value store.
pub struct DrawingStore<K: KeyValueStore> {
    kv: K,
    key: String,
}

impl<K: KeyValueStore> DrawingStore<K> {
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn from_config(kv: K, config: &CoreConfig) -> Self {
        Self::new(kv, config.storage.drawing_key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrites the saved drawing with `strokes`.
    ///
    /// Never fails from the caller's point of view.
    pub async fn save_drawing(&self, strokes: &[StrokePath]) {
        match self.try_save(strokes).await {
            Ok(()) => debug!(
                "event=drawing_save module=drawing status=ok paths={}",
                strokes.len()
            ),
            Err(err) => warn!(
                "event=drawing_save module=drawing status=error error_code=drawing_save_failed paths={} error={err}",
                strokes.len()
            ),
        }
    }

    /// Reads the saved drawing.
    ///
    /// Returns `None` when nothing was saved or the read failed.
    pub async fn get_saved_drawing(&self) -> Option<Drawing> {
        match self.try_load().await {
            Ok(drawing) => {
                debug!(
                    "event=drawing_load module=drawing status=ok found={} paths={}",
                    drawing.is_some(),
                    drawing.as_ref().map_or(0, Drawing::len)
                );
                drawing
            }
            Err(err) => {
                warn!(
                    "event=drawing_load module=drawing status=error error_code=drawing_load_failed error={err}"
                );
                None
            }
        }
    }

    async fn try_save(&self, strokes: &[StrokePath]) -> KvResult<()> {
        let value = serde_json::to_value(strokes)?;
        self.kv.set(&self.key, value).await
    }

    async fn try_load(&self) -> KvResult<Option<Drawing>> {
        match self.kv.get(&self.key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}
