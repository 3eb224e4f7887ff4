//! # BrowseCloud Formats
//!
//! Decoders for the tab-delimited artifacts written by the Counting Grid
//! training job.
//!
//! ## Artifacts
//!
//! ```text
//! correspondences.txt ──> Vocabulary ──┐
//!                                       ├──> TopGrid        (top_pi.txt)
//! top_pi_layers.txt   ──> LayeredTopGrid
//! colors_browser.txt  ──> ColorTable
//! legend.txt          ──> Legend
//! words.txt           ──> WordCounts
//! database.txt        ──> Database
//! docmap.txt          ──> GridMappings
//! ```
//!
//! Every decoder parses its whole input at construction and is immutable
//! afterwards. Ids from the files (words, documents, layers) are 1-indexed
//! and stored 0-indexed, except word ids inside the top grids, which the
//! training job already writes 0-indexed. Row/col stay 1-indexed on every
//! public lookup.
//!
//! ## Example
//!
//! ```rust
//! use browsecloud_formats::{TopGrid, Vocabulary};
//!
//! let vocabulary = Vocabulary::parse("cats\tcat\t1\ndogs\tdog\t2").unwrap();
//! let grid = TopGrid::parse("row:1\tcol:1\t0:0.5\t1:0.25", &vocabulary).unwrap();
//!
//! assert_eq!(grid.word_tags()[0].word, "cat");
//! assert_eq!(grid.word_probability(1, 1, 1).unwrap(), 0.25);
//! ```

mod artifact;
mod color;
mod counts;
mod database;
mod error;
mod legend;
mod lines;
mod mappings;
mod top_grid;
mod top_grid_layers;
mod vocabulary;

/// Word probabilities at or below this value are dropped while parsing.
pub const PI_THRESHOLD: f64 = 0.0001;

pub use artifact::Artifact;
pub use color::{ColorTable, RgbColor};
pub use counts::{DocEntryWordCount, WordCounts};
pub use database::{Database, DocEntry};
pub use error::{FormatError, LookupError, Result};
pub use legend::{Legend, LegendItem};
pub use mappings::{DocEntryPosition, DocEntryWeight, GridMappings};
pub use top_grid::{TopGrid, WordEntry, WordTag, WordTagSet};
pub use top_grid_layers::LayeredTopGrid;
pub use vocabulary::{LexiconWord, Vocabulary};
