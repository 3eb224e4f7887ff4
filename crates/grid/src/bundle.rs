use crate::error::{GridError, Result};
use browsecloud_formats::Artifact;
use std::collections::HashMap;
use std::path::Path;

/// The raw text of the eight training artifacts.
///
/// Optional artifacts that were not supplied read as empty text, which every
/// decoder accepts.
#[derive(Debug, Clone, Default)]
pub struct ArtifactBundle {
    texts: HashMap<Artifact, String>,
}

impl ArtifactBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text of one artifact, replacing any previous text.
    pub fn with(mut self, artifact: Artifact, text: impl Into<String>) -> Self {
        self.insert(artifact, text);
        self
    }

    pub fn insert(&mut self, artifact: Artifact, text: impl Into<String>) {
        self.texts.insert(artifact, text.into());
    }

    /// Read every artifact present in `dir` by its training-job file name.
    ///
    /// A missing required artifact is an error; missing optional ones are
    /// left empty.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut bundle = Self::new();

        for artifact in Artifact::ALL {
            let path = dir.join(artifact.file_name());
            if !path.is_file() {
                if artifact.is_required() {
                    return Err(GridError::MissingArtifact(artifact));
                }
                log::debug!(
                    "Optional artifact {} not found in {}",
                    artifact,
                    dir.display()
                );
                continue;
            }

            bundle.insert(artifact, std::fs::read_to_string(&path)?);
        }

        log::debug!(
            "Loaded {} artifacts from {}",
            bundle.texts.len(),
            dir.display()
        );

        Ok(bundle)
    }

    /// Text of an artifact; empty when it was never supplied.
    pub fn get(&self, artifact: Artifact) -> &str {
        self.texts.get(&artifact).map_or("", String::as_str)
    }

    pub fn contains(&self, artifact: Artifact) -> bool {
        self.texts.contains_key(&artifact)
    }

    /// Fail with [`GridError::MissingArtifact`] for the first required
    /// artifact that was never supplied.
    pub fn ensure_required(&self) -> Result<()> {
        match Artifact::ALL
            .into_iter()
            .find(|a| a.is_required() && !self.contains(*a))
        {
            Some(missing) => Err(GridError::MissingArtifact(missing)),
            None => Ok(()),
        }
    }
}
