use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for the Counting Grid queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Above this zoom ratio only cells inside the viewport are laid out
    pub zoom_cull_threshold: f64,

    /// Label jitter is drawn per word id from `0..jitter_span` pixels
    pub jitter_span: u32,

    /// Seed of the jitter table; same seed, same label positions
    pub jitter_seed: u64,

    /// How many of a cell's words take part in document ranking
    pub max_words_in_search: usize,

    /// Keep labels whose normalized weight is exactly 0 (the lightest word)
    pub keep_floor_labels: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            zoom_cull_threshold: 1.5,
            jitter_span: 15,
            jitter_seed: 0x00C0_FFEE,
            max_words_in_search: 100,
            keep_floor_labels: true,
        }
    }
}

impl GridConfig {
    /// Parse a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(GridError::InvalidConfig)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.zoom_cull_threshold.is_finite() || self.zoom_cull_threshold < 1.0 {
            return Err(format!(
                "zoom_cull_threshold ({}) must be a finite value >= 1.0",
                self.zoom_cull_threshold
            ));
        }

        if self.jitter_span == 0 {
            return Err("jitter_span must be > 0".to_string());
        }

        if self.max_words_in_search == 0 {
            return Err("max_words_in_search must be > 0".to_string());
        }

        Ok(())
    }
}
