//! Search-term weighting of the layered grids.
//!
//! With search words, each (layer, cell) is weighted by how strongly its
//! assigned documents contain those words. Layer word probabilities scaled by
//! that weight become the word tags that replace the base grid's tags.

use crate::model::CountingGridModel;
use browsecloud_formats::{WordCounts, WordTag, WordTagSet, PI_THRESHOLD};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

const BASE_WORD_WEIGHT: f64 = 20.0;
const MAX_WORD_WEIGHT: f64 = 25.0;

/// Memoized search tag sets, keyed by the exact ordered word id list.
///
/// Additive only; entries live as long as the model.
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: Mutex<HashMap<Vec<usize>, Arc<WordTagSet>>>,
    computations: AtomicUsize,
}

impl SearchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached tags for `key`, running `compute` on a miss.
    ///
    /// The lock is held while computing so one key is computed once even
    /// under concurrent callers.
    pub fn get_or_compute<F>(&self, key: &[usize], compute: F) -> Arc<WordTagSet>
    where
        F: FnOnce() -> WordTagSet,
    {
        // Entries are only ever inserted whole, so a poisoned map is still consistent.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(hit) = entries.get(key) {
            log::debug!("Search cache hit for {key:?}");
            return Arc::clone(hit);
        }

        log::debug!("Search cache miss for {key:?}");
        self.computations.fetch_add(1, Ordering::Relaxed);
        let tags = Arc::new(compute());
        entries.insert(key.to_vec(), Arc::clone(&tags));
        tags
    }

    /// How many times a tag set was actually computed.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Search weight of one document and how many search words it contains.
///
/// Each contained word adds `min(25, 20 + count - 1)`; the sum is raised to
/// `1 + ln(matches)` so documents matching several words pull ahead. Words
/// absent from the document add nothing.
pub fn document_search_weight(
    counts: &WordCounts,
    entry_id: usize,
    search_word_ids: &[usize],
) -> (f64, usize) {
    let mut weight = 0.0;
    let mut matches = 0;

    for &word_id in search_word_ids {
        let count = counts.word_counts(entry_id, word_id).unwrap_or(0);
        if count > 0 {
            matches += 1;
            weight += MAX_WORD_WEIGHT.min(BASE_WORD_WEIGHT + f64::from(count - 1));
        }
    }

    if matches == 0 {
        return (0.0, 0);
    }

    (weight.powf(1.0 + (matches as f64).ln()), matches)
}

/// Dense `layer x row x col` accumulator, 0-indexed.
struct LayeredWeights {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl LayeredWeights {
    fn new(layers: usize, rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; layers * rows * cols],
        }
    }

    fn index(&self, layer: usize, row: usize, col: usize) -> usize {
        (layer * self.rows + row) * self.cols + col
    }

    fn get(&self, layer: usize, row: usize, col: usize) -> Option<f64> {
        self.values.get(self.index(layer, row, col)).copied()
    }

    fn add(&mut self, layer: usize, row: usize, col: usize, value: f64) -> bool {
        let idx = self.index(layer, row, col);
        match self.values.get_mut(idx) {
            Some(slot) => {
                *slot += value;
                true
            }
            None => false,
        }
    }

    fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }
}

impl CountingGridModel {
    /// Word tags for a non-empty search, uncached.
    pub(crate) fn compute_search_word_tags(&self, search_word_ids: &[usize]) -> WordTagSet {
        let rows = self.top_grid().row_count();
        let cols = self.top_grid().column_count();
        let layer_count = self.layers().layer_count();

        let mut layered = LayeredWeights::new(layer_count, rows, cols);
        let mut out_of_range = 0usize;

        for row in 1..=rows {
            for col in 1..=cols {
                // Cells without assignments contribute nothing.
                let assignments = self.mappings().mappings(row, col).unwrap_or_default();
                for assignment in assignments {
                    let (weight, _) =
                        document_search_weight(self.counts(), assignment.entry_id, search_word_ids);
                    if assignment.layer >= layer_count
                        || !layered.add(assignment.layer, row - 1, col - 1, weight)
                    {
                        out_of_range += 1;
                    }
                }
            }
        }

        if out_of_range > 0 {
            log::warn!(
                "{out_of_range} docmap assignments reference layers beyond the {layer_count} in top_pi_layers.txt"
            );
        }

        let max_layered_weight = layered.max();
        if max_layered_weight <= 0.0 {
            log::debug!("No document contains {search_word_ids:?}; search has no word tags");
            return WordTagSet::default();
        }

        let vocabulary = self.vocabulary();
        let mut tags = Vec::new();
        for row in 1..=rows {
            for col in 1..=cols {
                for layer in 1..=layer_count {
                    let cell_weight = layered.get(layer - 1, row - 1, col - 1).unwrap_or(0.0);
                    for entry in self.layers().word_entry_list(layer, row, col) {
                        let weight = entry.weight * cell_weight / max_layered_weight;
                        if weight <= PI_THRESHOLD {
                            continue;
                        }
                        let Some(lexicon_word) = vocabulary.lexicon_word_by_id(entry.word_id) else {
                            log::warn!(
                                "Word id {} is not in the lexicon; tag skipped",
                                entry.word_id
                            );
                            continue;
                        };
                        tags.push(WordTag {
                            word: lexicon_word.word.clone(),
                            word_id: entry.word_id,
                            weight,
                            row,
                            col,
                        });
                    }
                }
            }
        }

        let set = WordTagSet::from_tags(tags);
        log::debug!(
            "Search {:?}: {} tags, weights {}..{}",
            search_word_ids,
            set.len(),
            set.min_weight,
            set.max_weight
        );
        set
    }
}
