use crate::artifact::Artifact;
use crate::error::{FormatError, LookupError, Result};
use crate::lines::{content_lines, one_based, prefixed_number};
use crate::top_grid::{word_entries, WordEntry, COL_PREFIX, LAYER_PREFIX, ROW_PREFIX};
use regex::Regex;
use std::collections::HashMap;

/// Dominant words for every probability layer, from `top_pi_layers.txt`.
///
/// Layers, rows and cols are 1-indexed on this API, matching [`crate::TopGrid`].
#[derive(Debug, Clone, Default)]
pub struct LayeredTopGrid {
    cells: HashMap<(usize, usize, usize), Vec<WordEntry>>,
    layer_count: usize,
}

impl LayeredTopGrid {
    /// Parse `layer:L<TAB>row:R<TAB>col:C<TAB>wordId:weight...` lines.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cells: HashMap<(usize, usize, usize), Vec<WordEntry>> = HashMap::new();
        let mut layer_count = 0;

        for (line_no, line) in content_lines(text) {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 3
                || !parts[0].starts_with("layer:")
                || !parts[1].starts_with("row:")
                || !parts[2].starts_with("col:")
            {
                return Err(FormatError::at_line(
                    Artifact::TopGridLayers,
                    line_no,
                    "expected 'layer:', 'row:' and 'col:' tokens",
                ));
            }

            let number = |regex: &Regex, token: &str| -> Result<usize> {
                one_based(
                    prefixed_number(regex, token, Artifact::TopGridLayers, line_no)?,
                    Artifact::TopGridLayers,
                    line_no,
                )
            };
            let layer = number(&LAYER_PREFIX, parts[0])?;
            let row = number(&ROW_PREFIX, parts[1])?;
            let col = number(&COL_PREFIX, parts[2])?;
            layer_count = layer_count.max(layer);

            let entries = word_entries(parts[3..].iter().copied());
            if !entries.is_empty() {
                cells.entry((layer, row, col)).or_default().extend(entries);
            }
        }

        log::debug!(
            "Parsed layered top grid: {} layers, {} populated cells",
            layer_count,
            cells.len()
        );

        Ok(Self { cells, layer_count })
    }

    /// Number of layers (the largest layer number seen).
    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Probability of `word_id` at a layer cell. The word must be present.
    pub fn word_probability(
        &self,
        layer: usize,
        row: usize,
        col: usize,
        word_id: usize,
    ) -> std::result::Result<f64, LookupError> {
        let entries = self
            .cells
            .get(&(layer, row, col))
            .ok_or(LookupError::LayerCellNotPopulated { layer, row, col })?;
        entries
            .iter()
            .find(|w| w.word_id == word_id)
            .map(|w| w.weight)
            .ok_or(LookupError::WordNotInCell { row, col, word_id })
    }

    /// Thresholded words of a layer cell; empty when none survived.
    pub fn word_entry_list(&self, layer: usize, row: usize, col: usize) -> &[WordEntry] {
        self.cells
            .get(&(layer, row, col))
            .map_or(&[][..], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAYERS: &str = "layer:1\trow:1\tcol:1\t0:0.4\t1:0.00001\n\
                          layer:2\trow:1\tcol:1\t0:0.2\t1:0.7\n\
                          layer:2\trow:2\tcol:2\n";

    #[test]
    fn counts_layers() {
        let layers = LayeredTopGrid::parse(LAYERS).unwrap();
        assert_eq!(layers.layer_count(), 2);
    }

    #[test]
    fn thresholds_per_layer() {
        let layers = LayeredTopGrid::parse(LAYERS).unwrap();
        assert_eq!(layers.word_entry_list(1, 1, 1).len(), 1);
        assert_eq!(layers.word_entry_list(2, 1, 1).len(), 2);
        assert!(layers.word_entry_list(2, 2, 2).is_empty());
    }

    #[test]
    fn word_probability_by_layer() {
        let layers = LayeredTopGrid::parse(LAYERS).unwrap();
        assert_eq!(layers.word_probability(2, 1, 1, 1), Ok(0.7));
        assert!(layers.word_probability(1, 1, 1, 1).is_err());
        assert_eq!(
            layers.word_probability(3, 1, 1, 0),
            Err(LookupError::LayerCellNotPopulated {
                layer: 3,
                row: 1,
                col: 1
            })
        );
    }

    #[test]
    fn missing_layer_prefix_is_rejected() {
        let err = LayeredTopGrid::parse("row:1\tcol:1\tlayer:1\t0:0.4").unwrap_err();
        assert!(err
            .to_string()
            .contains("top_pi_layers.txt improperly formatted."));
    }
}
