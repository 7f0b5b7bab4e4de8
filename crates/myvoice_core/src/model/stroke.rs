//! Stroke path and drawing model.
//!
//! Field names follow the drawing widget's export format so a saved document
//! can be handed back to `load_paths` without conversion.

use serde::{Deserialize, Serialize};

/// One sampled pen position in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One continuous pen gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokePath {
    pub paths: Vec<Point>,
    pub stroke_width: f64,
    pub stroke_color: String,
    /// `true` for pen strokes, `false` for eraser strokes.
    pub draw_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<u64>,
}

impl StrokePath {
    /// Creates a pen stroke.
    pub fn pen(points: Vec<Point>, color: impl Into<String>, width: f64) -> Self {
        Self {
            paths: points,
            stroke_width: width,
            stroke_color: color.into(),
            draw_mode: true,
            start_timestamp: None,
            end_timestamp: None,
        }
    }

    /// Creates an eraser stroke.
    pub fn eraser(points: Vec<Point>, width: f64) -> Self {
        Self {
            draw_mode: false,
            ..Self::pen(points, "#000000", width)
        }
    }

    pub fn is_eraser(&self) -> bool {
        !self.draw_mode
    }
}

/// Full ordered set of stroke paths on the canvas, saved as one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Drawing {
    paths: Vec<StrokePath>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[StrokePath] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn push(&mut self, path: StrokePath) {
        self.paths.push(path);
    }
}

impl From<Vec<StrokePath>> for Drawing {
    fn from(paths: Vec<StrokePath>) -> Self {
        Self { paths }
    }
}
