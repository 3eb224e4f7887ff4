use crate::artifact::Artifact;
use crate::error::{FormatError, LookupError, Result};
use crate::lines::{content_lines, one_based, prefixed_number};
use crate::vocabulary::Vocabulary;
use crate::PI_THRESHOLD;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) static LAYER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^layer:(\d+)").expect("valid regex"));
pub(crate) static ROW_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^row:(\d+)").expect("valid regex"));
pub(crate) static COL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^col:(\d+)").expect("valid regex"));
static WORD_WEIGHT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):([eE+\-.\d]+)").expect("valid regex"));

/// A word and its probability in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word_id: usize,
    pub weight: f64,
}

/// A [`WordEntry`] placed on the grid with its text resolved (1-indexed row/col).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTag {
    pub word: String,
    pub word_id: usize,
    pub weight: f64,
    pub row: usize,
    pub col: usize,
}

/// Flat list of word tags with the weight range across all of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordTagSet {
    pub word_tags: Vec<WordTag>,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl WordTagSet {
    /// Collect tags and their weight range. An empty set has range `[0, 0]`.
    pub fn from_tags(word_tags: Vec<WordTag>) -> Self {
        let (min_weight, max_weight) = word_tags
            .iter()
            .map(|t| t.weight)
            .fold(None, |range: Option<(f64, f64)>, w| match range {
                None => Some((w, w)),
                Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
            })
            .unwrap_or((0.0, 0.0));

        Self {
            word_tags,
            min_weight,
            max_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.word_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word_tags.is_empty()
    }
}

/// Parsed `wordId:weight` tokens of one line, thresholded.
pub(crate) fn word_entries<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<WordEntry> {
    tokens
        .filter_map(|token| {
            let caps = WORD_WEIGHT.captures(token)?;
            let word_id = caps[1].parse::<usize>().ok()?;
            let weight = caps[2].parse::<f64>().ok()?;
            Some(WordEntry { word_id, weight })
        })
        .filter(|entry| entry.weight > PI_THRESHOLD)
        .collect()
}

/// Dominant words of the base grid (layer 0), from `top_pi.txt`.
#[derive(Debug, Clone, Default)]
pub struct TopGrid {
    cells: HashMap<(usize, usize), Vec<WordEntry>>,
    row_count: usize,
    column_count: usize,
    tags: Arc<WordTagSet>,
}

impl TopGrid {
    /// Parse `row:R<TAB>col:C<TAB>wordId:weight...` lines.
    ///
    /// Word text is resolved through `vocabulary`. Entries whose id is not in
    /// the lexicon stay in the grid but get no word tag.
    pub fn parse(text: &str, vocabulary: &Vocabulary) -> Result<Self> {
        let mut cells: HashMap<(usize, usize), Vec<WordEntry>> = HashMap::new();
        let mut word_tags = Vec::new();
        let mut row_count = 0;
        let mut column_count = 0;
        let mut unknown_words = 0usize;

        for (line_no, line) in content_lines(text) {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() < 2 || !parts[0].starts_with("row:") || !parts[1].starts_with("col:") {
                return Err(FormatError::at_line(
                    Artifact::TopGrid,
                    line_no,
                    "expected 'row:' and 'col:' tokens",
                ));
            }

            let row = one_based(
                prefixed_number(&ROW_PREFIX, parts[0], Artifact::TopGrid, line_no)?,
                Artifact::TopGrid,
                line_no,
            )?;
            let col = one_based(
                prefixed_number(&COL_PREFIX, parts[1], Artifact::TopGrid, line_no)?,
                Artifact::TopGrid,
                line_no,
            )?;
            row_count = row_count.max(row);
            column_count = column_count.max(col);

            let entries = word_entries(parts[2..].iter().copied());
            for entry in &entries {
                match vocabulary.lexicon_word_by_id(entry.word_id) {
                    Some(lexicon_word) => word_tags.push(WordTag {
                        word: lexicon_word.word.clone(),
                        word_id: entry.word_id,
                        weight: entry.weight,
                        row,
                        col,
                    }),
                    None => unknown_words += 1,
                }
            }
            cells.entry((row, col)).or_default().extend(entries);
        }

        if unknown_words > 0 {
            log::warn!("top_pi.txt references {unknown_words} word ids missing from the lexicon");
        }

        let tags = WordTagSet::from_tags(word_tags);
        log::debug!(
            "Parsed top grid {}x{}: {} word tags, weights [{}, {}]",
            row_count,
            column_count,
            tags.len(),
            tags.min_weight,
            tags.max_weight
        );

        Ok(Self {
            cells,
            row_count,
            column_count,
            tags: Arc::new(tags),
        })
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    /// Probability of `word_id` at a cell (1-indexed). The word must be present.
    pub fn word_probability(
        &self,
        row: usize,
        col: usize,
        word_id: usize,
    ) -> std::result::Result<f64, LookupError> {
        self.word_entry_list(row, col)
            .iter()
            .find(|w| w.word_id == word_id)
            .map(|w| w.weight)
            .ok_or(LookupError::WordNotInCell { row, col, word_id })
    }

    /// Thresholded words of a cell (1-indexed) in file order; empty when none survived.
    pub fn word_entry_list(&self, row: usize, col: usize) -> &[WordEntry] {
        self.cells.get(&(row, col)).map_or(&[][..], Vec::as_slice)
    }

    pub fn is_in_bounds(&self, row: usize, col: usize) -> bool {
        row >= 1 && col >= 1 && row <= self.row_count && col <= self.column_count
    }

    pub fn word_tags(&self) -> &[WordTag] {
        &self.tags.word_tags
    }

    pub fn max_weight(&self) -> f64 {
        self.tags.max_weight
    }

    pub fn min_weight(&self) -> f64 {
        self.tags.min_weight
    }

    /// The precomputed tags with their weight range, shared.
    pub fn word_tag_set(&self) -> Arc<WordTagSet> {
        Arc::clone(&self.tags)
    }
}
