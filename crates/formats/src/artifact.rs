use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight text artifacts written by the Counting Grid training job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// `top_pi.txt`: dominant words of the base grid
    TopGrid,
    /// `colors_browser.txt`: per-cell RGB colors
    Colors,
    /// `words.txt`: word x document count matrix
    WordCounts,
    /// `docmap.txt`: document to cell assignments
    DocMap,
    /// `database.txt`: document metadata
    Database,
    /// `legend.txt`: optional two-color legend
    Legend,
    /// `correspondences.txt`: surface form / lemma / word id table
    Correspondences,
    /// `top_pi_layers.txt`: dominant words per layer
    TopGridLayers,
}

impl Artifact {
    pub const ALL: [Artifact; 8] = [
        Artifact::TopGrid,
        Artifact::Colors,
        Artifact::WordCounts,
        Artifact::DocMap,
        Artifact::Database,
        Artifact::Legend,
        Artifact::Correspondences,
        Artifact::TopGridLayers,
    ];

    /// File name as produced by the training job
    pub fn file_name(self) -> &'static str {
        match self {
            Self::TopGrid => "top_pi.txt",
            Self::Colors => "colors_browser.txt",
            Self::WordCounts => "words.txt",
            Self::DocMap => "docmap.txt",
            Self::Database => "database.txt",
            Self::Legend => "legend.txt",
            Self::Correspondences => "correspondences.txt",
            Self::TopGridLayers => "top_pi_layers.txt",
        }
    }

    /// Name used in error messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Correspondences => "Correspondence file",
            other => other.file_name(),
        }
    }

    /// Whether a model cannot be built without this artifact
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Self::TopGrid | Self::Correspondences | Self::TopGridLayers
        )
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}
