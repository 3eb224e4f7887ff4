//! Relevance ranking of the documents assigned to one grid cell.

use crate::error::Result;
use crate::model::CountingGridModel;
use crate::types::RankedDocument;
use browsecloud_formats::{DocEntry, DocEntryWeight, WordTag};
use std::collections::HashMap;

/// At most this many documents are returned for a cell.
pub const MAX_DOCUMENTS: usize = 100;

impl CountingGridModel {
    /// Documents of a cell (1-indexed), most relevant first.
    ///
    /// Uses the configured `max_words_in_search`.
    pub fn document_entry_list(
        &self,
        row: usize,
        col: usize,
        search_word_ids: &[usize],
    ) -> Result<Vec<DocEntry>> {
        self.document_entry_list_with_limit(
            row,
            col,
            search_word_ids,
            self.config().max_words_in_search,
        )
    }

    pub fn document_entry_list_with_limit(
        &self,
        row: usize,
        col: usize,
        search_word_ids: &[usize],
        max_words_in_search: usize,
    ) -> Result<Vec<DocEntry>> {
        Ok(self
            .ranked_documents(row, col, search_word_ids, max_words_in_search)?
            .into_iter()
            .map(|ranked| ranked.entry)
            .collect())
    }

    /// Documents of a cell with their relevance scores.
    ///
    /// The cell must have been populated in the docmap. Ties keep docmap
    /// order; entries missing from the database are skipped before the list
    /// is cut to [`MAX_DOCUMENTS`].
    pub fn ranked_documents(
        &self,
        row: usize,
        col: usize,
        search_word_ids: &[usize],
        max_words_in_search: usize,
    ) -> Result<Vec<RankedDocument>> {
        let assignments = self.mappings().mappings(row, col)?;

        let scores = if search_word_ids.is_empty() {
            self.base_scores(row, col, assignments, max_words_in_search)?
        } else {
            self.search_scores(row, col, assignments, search_word_ids, max_words_in_search)
        };

        let mut scored: Vec<(&DocEntryWeight, f64)> = assignments.iter().zip(scores).collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut missing = 0usize;
        let ranked: Vec<RankedDocument> = scored
            .into_iter()
            .filter_map(|(assignment, score)| {
                let entry = self.database().doc_entry(assignment.entry_id);
                if entry.is_none() {
                    missing += 1;
                }
                entry.map(|entry| RankedDocument {
                    entry: entry.clone(),
                    score,
                })
            })
            .take(MAX_DOCUMENTS)
            .collect();

        if missing > 0 {
            log::debug!("Cell ({row}, {col}): {missing} ranked entries missing from database.txt");
        }

        Ok(ranked)
    }

    /// Without search: each document sums the probabilities of the cell's
    /// words it contains, scaled by its assignment weight.
    fn base_scores(
        &self,
        row: usize,
        col: usize,
        assignments: &[DocEntryWeight],
        max_words_in_search: usize,
    ) -> Result<Vec<f64>> {
        let mut doc_weights: HashMap<usize, f64> = HashMap::new();

        for word in self
            .top_grid()
            .word_entry_list(row, col)
            .iter()
            .take(max_words_in_search)
        {
            for assignment in assignments {
                if self.counts().contains(assignment.entry_id, word.word_id) {
                    *doc_weights.entry(assignment.entry_id).or_default() +=
                        self.top_grid().word_probability(row, col, word.word_id)?;
                }
            }
        }

        Ok(assignments
            .iter()
            .map(|a| a.weight * doc_weights.get(&a.entry_id).copied().unwrap_or(0.0))
            .collect())
    }

    /// With search: the cell's search tags (lightest first) accumulate the
    /// word's probability over every layer for each containing document,
    /// normalized by the best document, then scaled by how many search words
    /// the document contains and its assignment weight.
    fn search_scores(
        &self,
        row: usize,
        col: usize,
        assignments: &[DocEntryWeight],
        search_word_ids: &[usize],
        max_words_in_search: usize,
    ) -> Vec<f64> {
        let tags = self.word_tags(search_word_ids);
        let mut cell_tags: Vec<&WordTag> = tags
            .word_tags
            .iter()
            .filter(|tag| tag.row == row && tag.col == col)
            .collect();
        cell_tags.sort_by(|a, b| a.weight.total_cmp(&b.weight));

        let layer_count = self.layers().layer_count();
        let mut doc_weights: HashMap<usize, f64> = HashMap::new();
        let mut max_doc_weight = 0.0f64;

        for tag in cell_tags.iter().take(max_words_in_search) {
            for assignment in assignments {
                if !self.counts().contains(assignment.entry_id, tag.word_id) {
                    continue;
                }
                let accumulated = doc_weights.entry(assignment.entry_id).or_default();
                for layer in 1..=layer_count {
                    // Layers where the word was thresholded away add nothing.
                    *accumulated += self
                        .layers()
                        .word_probability(layer, row, col, tag.word_id)
                        .unwrap_or(0.0);
                }
                max_doc_weight = max_doc_weight.max(*accumulated);
            }
        }

        assignments
            .iter()
            .map(|assignment| {
                let matches = search_word_ids
                    .iter()
                    .filter(|word_id| self.counts().contains(assignment.entry_id, **word_id))
                    .count();
                let accumulated = doc_weights
                    .get(&assignment.entry_id)
                    .copied()
                    .unwrap_or(0.0);
                let relative = if max_doc_weight > 0.0 {
                    accumulated / max_doc_weight
                } else {
                    0.0
                };
                matches as f64 * assignment.weight * relative
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::bundle::ArtifactBundle;
    use crate::error::GridError;
    use crate::model::CountingGridModel;
    use browsecloud_formats::{Artifact, LookupError};
    use pretty_assertions::assert_eq;

    // Cell (1,1) holds three documents. Word 0 ("apple") is in entries 0 and
    // 1, word 1 ("pear") only in entry 2.
    fn model() -> CountingGridModel {
        let bundle = ArtifactBundle::new()
            .with(
                Artifact::Correspondences,
                "apple\tapple\t1\npear\tpear\t2\n",
            )
            .with(
                Artifact::TopGrid,
                "row:1\tcol:1\t0:0.6\t1:0.3\nrow:1\tcol:2\t1:0.2\n",
            )
            .with(
                Artifact::TopGridLayers,
                "layer:1\trow:1\tcol:1\t0:0.5\t1:0.1\nlayer:2\trow:1\tcol:1\t0:0.2\t1:0.4\n",
            )
            .with(Artifact::WordCounts, "id:1\t1:2\t2:1\nid:2\t3:5\n")
            .with(
                Artifact::DocMap,
                "row:1\tcol:1\t1:0.5:1\t2:0.9:1\t3:0.7:2\nrow:1\tcol:2\n",
            )
            .with(
                Artifact::Database,
                "id:1\ttitle:First\tlayer:1\nid:2\ttitle:Second\tlayer:1\nid:3\ttitle:Third\tlayer:2\n",
            );
        CountingGridModel::from_bundle(&bundle).unwrap()
    }

    fn titles(model: &CountingGridModel, search: &[usize]) -> Vec<String> {
        model
            .document_entry_list(1, 1, search)
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect()
    }

    #[test]
    fn base_ranking_uses_assignment_weight() {
        let model = model();
        // Scores: entry 0 = 0.5 * 0.6, entry 1 = 0.9 * 0.6, entry 2 = 0.7 * 0.3.
        assert_eq!(titles(&model, &[]), vec!["Second", "First", "Third"]);

        let ranked = model.ranked_documents(1, 1, &[], 100).unwrap();
        assert!((ranked[0].score - 0.54).abs() < 1e-12);
        assert!((ranked[2].score - 0.21).abs() < 1e-12);
    }

    #[test]
    fn word_limit_restricts_base_ranking() {
        let model = model();
        let ranked = model.ranked_documents(1, 1, &[], 1).unwrap();
        let third = ranked.iter().find(|r| r.entry.title == "Third").unwrap();
        assert_eq!(third.score, 0.0);
    }

    #[test]
    fn search_ranking_favours_matching_documents() {
        let model = model();
        let ranked = model.ranked_documents(1, 1, &[1], 100).unwrap();

        assert_eq!(ranked[0].entry.title, "Third");
        assert!(ranked[0].score > 0.0);
        assert!(ranked[1..].iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn ranking_is_deterministic() {
        let model = model();
        let first = titles(&model, &[0, 1]);
        for _ in 0..5 {
            assert_eq!(titles(&model, &[0, 1]), first);
        }
        assert_eq!(model.search_computations(), 1);
    }

    #[test]
    fn empty_cell_ranks_nothing() {
        let model = model();
        assert!(model.document_entry_list(1, 2, &[]).unwrap().is_empty());
    }

    #[test]
    fn unpopulated_cell_is_a_lookup_error() {
        let model = model();
        assert!(matches!(
            model.document_entry_list(2, 2, &[]),
            Err(GridError::Lookup(LookupError::CellNotPopulated { row: 2, col: 2 }))
        ));
    }
}
