//! # BrowseCloud Grid
//!
//! The Counting Grid model: decodes a trained grid's artifacts and answers
//! the two queries a visualization needs.
//!
//! ## Features
//!
//! - **Word label placement** with toroidal viewport culling and per-word jitter
//! - **Search weighting** of layered grids, memoized per ordered search
//! - **Document ranking** for a grid cell, with or without search words
//! - **CSV export** of ranked results
//!
//! ## Architecture
//!
//! ```text
//! ArtifactBundle (8 texts)
//!     │
//!     └──> CountingGridModel
//!            ├─> scaled_grid_data(search, viewport)
//!            │     ├─> VisibilityMask (zoom > threshold: scrolled window only)
//!            │     ├─> word tags (base grid, or SearchCache → layered weighting)
//!            │     └─> WordLabel[] ascending by scaled weight
//!            │
//!            └─> ranked_documents(row, col, search)
//!                  ├─> docmap assignments of the cell
//!                  ├─> word counts x grid probabilities
//!                  └─> DocEntry[] (top 100)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use browsecloud_formats::Artifact;
//! use browsecloud_grid::{ArtifactBundle, CountingGridModel, Viewport};
//!
//! let bundle = ArtifactBundle::new()
//!     .with(Artifact::Correspondences, "cats\tcat\t1\ndogs\tdog\t2")
//!     .with(Artifact::TopGrid, "row:1\tcol:1\t0:0.5\nrow:2\tcol:2\t1:0.8")
//!     .with(Artifact::TopGridLayers, "layer:1\trow:1\tcol:1\t0:0.5");
//!
//! let model = CountingGridModel::from_bundle(&bundle).unwrap();
//! let data = model.scaled_grid_data(&[], &Viewport::new(200.0, 100.0)).unwrap();
//!
//! assert_eq!(data.word_labels.len(), 2);
//! assert_eq!(data.word_labels[1].word, "dog");
//! ```

mod bundle;
mod config;
mod error;
mod export;
mod model;
mod ranking;
mod search;
mod types;
mod visibility;

pub use bundle::ArtifactBundle;
pub use config::GridConfig;
pub use error::{GridError, Result};
pub use export::write_results_csv;
pub use model::CountingGridModel;
pub use ranking::MAX_DOCUMENTS;
pub use search::{document_search_weight, SearchCache};
pub use types::{
    ModelSummary, Point, RankedDocument, ScaledGridData, SearchTerms, Viewport, WordLabel,
};
pub use visibility::VisibilityMask;
