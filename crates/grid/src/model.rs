use crate::bundle::ArtifactBundle;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::search::SearchCache;
use crate::types::{ModelSummary, Point, ScaledGridData, SearchTerms, Viewport, WordLabel};
use crate::visibility::VisibilityMask;
use browsecloud_formats::{
    Artifact, ColorTable, Database, DocEntry, DocEntryPosition, GridMappings, LayeredTopGrid,
    Legend, RgbColor, TopGrid, Vocabulary, WordCounts, WordTagSet,
};
use std::sync::Arc;

/// A trained Counting Grid: every decoded artifact plus the query algorithms
/// that combine them.
///
/// Immutable after construction apart from the search cache, so one model can
/// serve concurrent readers.
#[derive(Debug)]
pub struct CountingGridModel {
    vocabulary: Vocabulary,
    top_grid: TopGrid,
    colors: ColorTable,
    mappings: GridMappings,
    counts: WordCounts,
    database: Database,
    legend: Legend,
    layers: LayeredTopGrid,
    config: GridConfig,
    jitter: JitterTable,
    search_cache: SearchCache,
}

impl CountingGridModel {
    /// Decode every artifact of `bundle`. Any malformed artifact aborts the
    /// whole construction.
    pub fn new(bundle: &ArtifactBundle, config: GridConfig) -> Result<Self> {
        config.validate().map_err(GridError::InvalidConfig)?;
        bundle.ensure_required()?;

        let colors = ColorTable::parse(bundle.get(Artifact::Colors))?;
        let vocabulary = Vocabulary::parse(bundle.get(Artifact::Correspondences))?;
        let top_grid = TopGrid::parse(bundle.get(Artifact::TopGrid), &vocabulary)?;
        let mappings = GridMappings::parse(bundle.get(Artifact::DocMap))?;
        let counts = WordCounts::parse(bundle.get(Artifact::WordCounts))?;
        let database = Database::parse(bundle.get(Artifact::Database))?;
        let legend = Legend::parse(bundle.get(Artifact::Legend))?;
        let layers = LayeredTopGrid::parse(bundle.get(Artifact::TopGridLayers))?;

        let jitter = JitterTable::new(vocabulary.lexicon_len(), &config);

        log::info!(
            "Loaded counting grid: {}x{} cells, {} layers, {} words, {} documents",
            top_grid.row_count(),
            top_grid.column_count(),
            layers.layer_count(),
            vocabulary.len(),
            database.len()
        );

        Ok(Self {
            vocabulary,
            top_grid,
            colors,
            mappings,
            counts,
            database,
            legend,
            layers,
            config,
            jitter,
            search_cache: SearchCache::new(),
        })
    }

    /// [`CountingGridModel::new`] with the default configuration.
    pub fn from_bundle(bundle: &ArtifactBundle) -> Result<Self> {
        Self::new(bundle, GridConfig::default())
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn top_grid(&self) -> &TopGrid {
        &self.top_grid
    }

    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    pub fn mappings(&self) -> &GridMappings {
        &self.mappings
    }

    pub fn counts(&self) -> &WordCounts {
        &self.counts
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn layers(&self) -> &LayeredTopGrid {
        &self.layers
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of search tag sets computed so far (cache misses).
    pub fn search_computations(&self) -> usize {
        self.search_cache.computations()
    }

    /// Tags to lay out: the base grid's when there is no search, otherwise
    /// the search-weighted layer tags, memoized by the ordered id list.
    pub fn word_tags(&self, search_word_ids: &[usize]) -> Arc<WordTagSet> {
        if search_word_ids.is_empty() {
            return self.top_grid.word_tag_set();
        }
        self.search_cache.get_or_compute(search_word_ids, || {
            self.compute_search_word_tags(search_word_ids)
        })
    }

    /// Word labels of the visible cells, placed in pixel space.
    ///
    /// Labels are sorted ascending by normalized weight so heavier words draw
    /// last. When every tag has the same weight, each normalizes to 1.
    pub fn scaled_grid_data(
        &self,
        search_word_ids: &[usize],
        viewport: &Viewport,
    ) -> Result<ScaledGridData> {
        viewport.validate()?;

        let rows = self.top_grid.row_count();
        let cols = self.top_grid.column_count();
        let row_distance = viewport.height / rows.max(1) as f64;
        let col_distance = viewport.width / cols.max(1) as f64;

        let visibility = VisibilityMask::compute(
            rows,
            cols,
            viewport,
            row_distance,
            col_distance,
            self.config.zoom_cull_threshold,
        );

        let tags = self.word_tags(search_word_ids);
        let range = tags.max_weight - tags.min_weight;

        let mut word_labels = Vec::new();
        for tag in &tags.word_tags {
            if !visibility.is_visible(tag.row, tag.col) {
                continue;
            }

            let scaled_weight = if range > 0.0 {
                (tag.weight - tags.min_weight) / range
            } else {
                1.0
            };
            if scaled_weight == 0.0 && !self.config.keep_floor_labels {
                continue;
            }

            let offset = self.jitter.offset(tag.word_id) * viewport.zoom_ratio;
            let y = wrap_pixel(
                tag.row as f64 * row_distance + offset + viewport.translation_y,
                viewport.height,
            );
            let x = wrap_pixel(
                tag.col as f64 * col_distance + offset + viewport.translation_x,
                viewport.width,
            );

            word_labels.push(WordLabel {
                word: tag.word.clone(),
                word_id: tag.word_id,
                scaled_weight,
                point: Point { x, y },
                color: self.colors.color(tag.row, tag.col),
            });
        }

        word_labels.sort_by(|a, b| a.scaled_weight.total_cmp(&b.scaled_weight));

        log::debug!(
            "Laid out {} of {} tags ({} visible cells)",
            word_labels.len(),
            tags.len(),
            visibility.visible_count()
        );

        Ok(ScaledGridData {
            word_labels,
            row_distance,
            col_distance,
        })
    }

    /// Split typed words into lexicon words and words the grid never saw.
    pub fn resolve_search_terms<S: AsRef<str>>(&self, words: &[S]) -> SearchTerms {
        let mut terms = SearchTerms::default();
        for word in words {
            let word = word.as_ref().trim();
            if word.is_empty() {
                continue;
            }
            match self.vocabulary.lexicon_word_by_word(word) {
                Some(lexicon_word) => terms.resolved.push(lexicon_word.clone()),
                None => terms.unresolved.push(word.to_string()),
            }
        }
        terms
    }

    /// Every surface form of the searched words, for highlighting matches in
    /// document text.
    pub fn highlight_words(&self, search_word_ids: &[usize]) -> Vec<String> {
        search_word_ids
            .iter()
            .filter_map(|id| self.vocabulary.vocabulary_words_by_id(*id))
            .flatten()
            .cloned()
            .collect()
    }

    /// Cell holding a document entry (1-indexed row/col).
    pub fn entry_position(&self, entry_id: usize) -> Option<DocEntryPosition> {
        self.mappings.position_of_entry(entry_id).copied()
    }

    /// Legend color of an entry's feature value, if both exist.
    pub fn legend_color_for_entry(&self, entry: &DocEntry) -> Option<RgbColor> {
        entry
            .feature
            .and_then(|feature| self.legend.color_for_feature(feature))
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            rows: self.top_grid.row_count(),
            columns: self.top_grid.column_count(),
            layers: self.layers.layer_count(),
            lexicon_size: self.vocabulary.len(),
            word_tags: self.top_grid.word_tags().len(),
            documents: self.database.len(),
            populated_cells: self.mappings.cell_count(),
            extra_columns: self.database.extra_columns().to_vec(),
            has_legend: self.legend.has_legend(),
        }
    }
}

/// Floored position folded into `(0, extent]`, matching how labels wrap
/// around the torus.
fn wrap_pixel(position: f64, extent: f64) -> f64 {
    let wrapped = (position % extent).floor();
    if wrapped > 0.0 {
        wrapped
    } else {
        wrapped + extent
    }
}

/// Per-word label offsets in pixels, drawn once from a seeded generator.
#[derive(Debug, Clone)]
struct JitterTable {
    offsets: Vec<u32>,
}

impl JitterTable {
    fn new(lexicon_len: usize, config: &GridConfig) -> Self {
        let mut rng = fastrand::Rng::with_seed(config.jitter_seed);
        let offsets = (0..lexicon_len)
            .map(|_| rng.u32(0..config.jitter_span))
            .collect();
        Self { offsets }
    }

    fn offset(&self, word_id: usize) -> f64 {
        self.offsets.get(word_id).copied().map_or(0.0, f64::from)
    }
}
