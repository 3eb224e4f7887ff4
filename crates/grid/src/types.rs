use crate::error::{GridError, Result};
use browsecloud_formats::{DocEntry, LexiconWord, RgbColor};
use serde::{Deserialize, Serialize};

/// Pixel position on the rendered grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A word ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordLabel {
    pub word: String,
    pub word_id: usize,
    /// Weight normalized to `[0, 1]` over the current tag set
    pub scaled_weight: f64,
    pub point: Point,
    /// Color of the label's cell, when the color table has one
    pub color: Option<RgbColor>,
}

/// Labels of the visible cells plus the cell size in pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaledGridData {
    /// Ascending by `scaled_weight`
    pub word_labels: Vec<WordLabel>,
    pub row_distance: f64,
    pub col_distance: f64,
}

/// The rendering surface and its pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub translation_x: f64,
    #[serde(default)]
    pub translation_y: f64,
    #[serde(default = "default_zoom")]
    pub zoom_ratio: f64,
}

fn default_zoom() -> f64 {
    1.0
}

impl Viewport {
    /// Unzoomed, untranslated surface of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            translation_x: 0.0,
            translation_y: 0.0,
            zoom_ratio: default_zoom(),
        }
    }

    pub fn with_translation(mut self, translation_x: f64, translation_y: f64) -> Self {
        self.translation_x = translation_x;
        self.translation_y = translation_y;
        self
    }

    pub fn with_zoom(mut self, zoom_ratio: f64) -> Self {
        self.zoom_ratio = zoom_ratio;
        self
    }

    /// Size and zoom must be positive and every field finite.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.width,
            self.height,
            self.translation_x,
            self.translation_y,
            self.zoom_ratio,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(GridError::InvalidViewport(format!(
                "non-finite value in {self:?}"
            )));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(GridError::InvalidViewport(format!(
                "size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.zoom_ratio <= 0.0 {
            return Err(GridError::InvalidViewport(format!(
                "zoom_ratio must be positive, got {}",
                self.zoom_ratio
            )));
        }
        Ok(())
    }
}

/// A document entry with its relevance for the queried cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDocument {
    #[serde(flatten)]
    pub entry: DocEntry,
    pub score: f64,
}

/// User-typed search words split into known lexicon words and the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchTerms {
    pub resolved: Vec<LexiconWord>,
    pub unresolved: Vec<String>,
}

impl SearchTerms {
    /// Word ids of the resolved words, in input order.
    pub fn word_ids(&self) -> Vec<usize> {
        self.resolved.iter().map(|w| w.word_id).collect()
    }
}

/// Overview of a loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub rows: usize,
    pub columns: usize,
    pub layers: usize,
    pub lexicon_size: usize,
    pub word_tags: usize,
    pub documents: usize,
    pub populated_cells: usize,
    pub extra_columns: Vec<String>,
    pub has_legend: bool,
}
