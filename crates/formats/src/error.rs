use crate::artifact::Artifact;
use thiserror::Error;

/// Result type for decoder construction
pub type Result<T> = std::result::Result<T, FormatError>;

/// An artifact violated its line grammar. Always fatal to the decoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A line (or the whole input) does not match the expected layout
    #[error("{} improperly formatted. {reason}", .artifact.label())]
    Malformed { artifact: Artifact, reason: String },
}

impl FormatError {
    /// Create a malformed-input error for a whole artifact
    pub fn malformed(artifact: Artifact, reason: impl Into<String>) -> Self {
        Self::Malformed {
            artifact,
            reason: reason.into(),
        }
    }

    /// Create a malformed-input error pinned to a 1-based line number
    pub fn at_line(artifact: Artifact, line: usize, reason: impl AsRef<str>) -> Self {
        Self::malformed(artifact, format!("line {line}: {}", reason.as_ref()))
    }

    pub fn artifact(&self) -> Artifact {
        match self {
            Self::Malformed { artifact, .. } => *artifact,
        }
    }
}

/// Lookups whose callers must guarantee the index is valid.
///
/// Unlike the `Option`-returning lookups (vocabulary, colors, entry positions),
/// these report a miss as an error instead of an empty value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The grid mapping has no line for this cell
    #[error("No cell populated at row {row}, col {col}")]
    CellNotPopulated { row: usize, col: usize },

    /// The layered top grid has no line for this layer and cell
    #[error("No cell populated at layer {layer}, row {row}, col {col}")]
    LayerCellNotPopulated { layer: usize, row: usize, col: usize },

    /// The cell's word list does not contain this word
    #[error("Word {word_id} not present at row {row}, col {col}")]
    WordNotInCell { row: usize, col: usize, word_id: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_message_names_the_artifact() {
        let err = FormatError::at_line(Artifact::DocMap, 3, "missing col: token");
        assert_eq!(
            err.to_string(),
            "docmap.txt improperly formatted. line 3: missing col: token"
        );
        assert_eq!(err.artifact(), Artifact::DocMap);
    }

    #[test]
    fn correspondences_use_legacy_label() {
        let err =
            FormatError::malformed(Artifact::Correspondences, "Every line must have 3 values.");
        assert!(err
            .to_string()
            .starts_with("Correspondence file improperly formatted"));
    }
}
