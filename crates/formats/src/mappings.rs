use crate::artifact::Artifact;
use crate::error::{FormatError, LookupError, Result};
use crate::lines::{content_lines, one_based, prefixed_number, zero_indexed};
use crate::top_grid::{COL_PREFIX, ROW_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static ENTRY_WEIGHT_LAYER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+):([eE+\-.\d]+):(\d+)")
        .expect("valid regex")
});

/// Soft assignment of a document entry to a cell at one layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocEntryWeight {
    pub entry_id: usize,
    pub weight: f64,
    pub layer: usize,
}

/// Where a document entry sits on the grid (1-indexed row/col).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocEntryPosition {
    pub row: usize,
    pub col: usize,
    pub weight: f64,
}

/// Cell <-> document assignments from `docmap.txt`.
#[derive(Debug, Clone, Default)]
pub struct GridMappings {
    cells: HashMap<(usize, usize), Vec<DocEntryWeight>>,
    entry_positions: HashMap<usize, DocEntryPosition>,
}

impl GridMappings {
    /// Parse `row:R<TAB>col:C<TAB>entryId:weight:layer...` lines.
    ///
    /// Every `row/col` line populates its cell, even when no assignment token
    /// on it is usable.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cells: HashMap<(usize, usize), Vec<DocEntryWeight>> = HashMap::new();
        let mut entry_positions = HashMap::new();

        for (line_no, line) in content_lines(text) {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 || !parts[0].starts_with("row:") || !parts[1].starts_with("col:") {
                return Err(FormatError::at_line(
                    Artifact::DocMap,
                    line_no,
                    "expected 'row:' and 'col:' tokens",
                ));
            }

            let row = one_based(
                prefixed_number(&ROW_PREFIX, parts[0], Artifact::DocMap, line_no)?,
                Artifact::DocMap,
                line_no,
            )?;
            let col = one_based(
                prefixed_number(&COL_PREFIX, parts[1], Artifact::DocMap, line_no)?,
                Artifact::DocMap,
                line_no,
            )?;

            let cell = cells.entry((row, col)).or_default();
            for token in &parts[2..] {
                let Some(caps) = ENTRY_WEIGHT_LAYER.captures(token) else {
                    continue;
                };
                let (Ok(entry), Ok(weight), Ok(layer)) = (
                    caps[1].parse::<usize>(),
                    caps[2].parse::<f64>(),
                    caps[3].parse::<usize>(),
                ) else {
                    continue;
                };

                let assignment = DocEntryWeight {
                    entry_id: zero_indexed(entry, Artifact::DocMap, line_no)?,
                    weight,
                    layer: zero_indexed(layer, Artifact::DocMap, line_no)?,
                };
                cell.push(assignment);

                // Only the cell is kept; a document listed twice keeps its last cell.
                entry_positions.insert(assignment.entry_id, DocEntryPosition { row, col, weight });
            }
        }

        log::debug!(
            "Parsed docmap: {} cells, {} entries",
            cells.len(),
            entry_positions.len()
        );

        Ok(Self {
            cells,
            entry_positions,
        })
    }

    /// Assignments of a cell (1-indexed). The cell must have been populated.
    pub fn mappings(
        &self,
        row: usize,
        col: usize,
    ) -> std::result::Result<&[DocEntryWeight], LookupError> {
        self.cells
            .get(&(row, col))
            .map(Vec::as_slice)
            .ok_or(LookupError::CellNotPopulated { row, col })
    }

    /// Number of assignments in a cell; negative coordinates count as 0.
    pub fn mappings_count(&self, row: i64, col: i64) -> std::result::Result<usize, LookupError> {
        if row < 0 || col < 0 {
            return Ok(0);
        }
        self.mappings(row as usize, col as usize).map(<[_]>::len)
    }

    pub fn position_of_entry(&self, entry_id: usize) -> Option<&DocEntryPosition> {
        self.entry_positions.get(&entry_id)
    }

    /// Populated cells as `((row, col), assignments)`, 1-indexed, in no particular order.
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), &[DocEntryWeight])> {
        self.cells
            .iter()
            .map(|(&cell, list)| (cell, list.as_slice()))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entry_positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCMAP: &str = "row:1\tcol:1\t1:0.5:1\t2:1e-2:2\nrow:2\tcol:3\t3:0.9:1\n";

    #[test]
    fn parses_assignments_zero_indexed() {
        let mappings = GridMappings::parse(DOCMAP).unwrap();
        assert_eq!(
            mappings.mappings(1, 1).unwrap(),
            &[
                DocEntryWeight {
                    entry_id: 0,
                    weight: 0.5,
                    layer: 0
                },
                DocEntryWeight {
                    entry_id: 1,
                    weight: 0.01,
                    layer: 1
                },
            ]
        );
    }

    #[test]
    fn reverse_index_keeps_one_indexed_cell() {
        let mappings = GridMappings::parse(DOCMAP).unwrap();
        assert_eq!(
            mappings.position_of_entry(2),
            Some(&DocEntryPosition {
                row: 2,
                col: 3,
                weight: 0.9
            })
        );
        assert_eq!(mappings.position_of_entry(7), None);
    }

    #[test]
    fn last_assignment_wins_in_reverse_index() {
        let mappings = GridMappings::parse("row:1\tcol:1\t1:0.2:1\nrow:4\tcol:4\t1:0.7:1").unwrap();
        assert_eq!(mappings.position_of_entry(0).unwrap().row, 4);
    }

    #[test]
    fn unpopulated_cell_is_an_error() {
        let mappings = GridMappings::parse(DOCMAP).unwrap();
        assert_eq!(
            mappings.mappings(5, 5),
            Err(LookupError::CellNotPopulated { row: 5, col: 5 })
        );
    }

    #[test]
    fn count_treats_negative_as_empty() {
        let mappings = GridMappings::parse(DOCMAP).unwrap();
        assert_eq!(mappings.mappings_count(-1, 1), Ok(0));
        assert_eq!(mappings.mappings_count(1, -3), Ok(0));
        assert_eq!(mappings.mappings_count(1, 1), Ok(2));
        assert!(mappings.mappings_count(9, 9).is_err());
    }

    #[test]
    fn line_without_col_is_rejected() {
        let err = GridMappings::parse("row:1\t1:0.5:1\n").unwrap_err();
        assert!(err.to_string().contains("docmap.txt improperly formatted."));
    }
}
