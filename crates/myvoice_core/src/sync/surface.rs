//! Drawing widget capability and its pollable handle slot.

use crate::model::stroke::StrokePath;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

/// Drawing widget failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    Detached,
    Export(String),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detached => write!(f, "drawing surface is detached"),
            Self::Export(message) => write!(f, "path export failed: {message}"),
        }
    }
}

impl Error for SurfaceError {}

/// Programmatic control of a mounted drawing widget.
#[async_trait]
pub trait DrawingSurface: Send + Sync {
    /// Replaces the widget content with `paths`.
    fn load_paths(&self, paths: &[StrokePath]);
    /// Exports the full current document, not just the latest stroke.
    async fn export_paths(&self) -> Result<Vec<StrokePath>, SurfaceError>;
    fn clear_canvas(&self);
    fn undo(&self);
    fn erase_mode(&self, enabled: bool);
}

/// Shared slot the host fills once the widget is usable.
///
/// There is no ready notification; the synchronizer polls `current()`.
#[derive(Clone, Default)]
pub struct SurfaceSlot {
    inner: Arc<Mutex<Option<Arc<dyn DrawingSurface>>>>,
}

impl SurfaceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, surface: Arc<dyn DrawingSurface>) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(surface);
        }
    }

    pub fn detach(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = None;
        }
    }

    /// Returns the widget handle if it is currently available.
    pub fn current(&self) -> Option<Arc<dyn DrawingSurface>> {
        self.inner.lock().ok()?.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.current().is_some()
    }
}
