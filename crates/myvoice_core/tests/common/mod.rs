#![allow(dead_code)]

use async_trait::async_trait;
use myvoice_core::{DrawingSurface, Point, StrokePath, SurfaceError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scriptable drawing widget that records every call.
#[derive(Default)]
pub struct FakeSurface {
    content: Mutex<Vec<StrokePath>>,
    loads: Mutex<Vec<Vec<StrokePath>>>,
    clears: AtomicUsize,
    undos: AtomicUsize,
    eraser: AtomicBool,
    fail_export: AtomicBool,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user finishing a stroke on the widget.
    pub fn draw(&self, stroke: StrokePath) {
        self.content.lock().unwrap().push(stroke);
    }

    pub fn content(&self) -> Vec<StrokePath> {
        self.content.lock().unwrap().clone()
    }

    pub fn loads(&self) -> Vec<Vec<StrokePath>> {
        self.loads.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn undo_count(&self) -> usize {
        self.undos.load(Ordering::SeqCst)
    }

    pub fn eraser_enabled(&self) -> bool {
        self.eraser.load(Ordering::SeqCst)
    }

    pub fn set_fail_export(&self, fail: bool) {
        self.fail_export.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DrawingSurface for FakeSurface {
    fn load_paths(&self, paths: &[StrokePath]) {
        self.loads.lock().unwrap().push(paths.to_vec());
        *self.content.lock().unwrap() = paths.to_vec();
    }

    async fn export_paths(&self) -> Result<Vec<StrokePath>, SurfaceError> {
        if self.fail_export.load(Ordering::SeqCst) {
            return Err(SurfaceError::Export("canvas not ready".to_string()));
        }
        Ok(self.content())
    }

    fn clear_canvas(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.content.lock().unwrap().clear();
    }

    fn undo(&self) {
        self.undos.fetch_add(1, Ordering::SeqCst);
        self.content.lock().unwrap().pop();
    }

    fn erase_mode(&self, enabled: bool) {
        self.eraser.store(enabled, Ordering::SeqCst);
    }
}

pub fn stroke(color: &str, points: &[(f64, f64)]) -> StrokePath {
    StrokePath::pen(
        points.iter().map(|(x, y)| Point::new(*x, *y)).collect(),
        color,
        5.0,
    )
}
