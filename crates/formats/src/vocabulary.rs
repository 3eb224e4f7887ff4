use crate::artifact::Artifact;
use crate::error::{FormatError, Result};
use crate::lines::{content_lines, zero_indexed};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A lemmatized word with its canonical 0-indexed id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LexiconWord {
    pub word: String,
    pub word_id: usize,
}

/// Word <-> id lexicon from `correspondences.txt`.
///
/// Each line maps a surface form to its lemma and the lemma's id. Several
/// surface forms share one id; the id is 1-indexed in the file and stored
/// 0-indexed here.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    word_to_id: HashMap<String, usize>,
    id_to_surface_forms: HashMap<usize, Vec<String>>,
    lexicon: HashMap<usize, LexiconWord>,
    lexicon_len: usize,
}

impl Vocabulary {
    pub fn parse(text: &str) -> Result<Self> {
        let mut vocabulary = Self::default();

        for (line_no, line) in content_lines(text) {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
                return Err(FormatError::at_line(
                    Artifact::Correspondences,
                    line_no,
                    "Every line must have 3 values.",
                ));
            }

            let (surface, lemma, id_text) = (fields[0], fields[1], fields[2]);
            let one_based = id_text.trim().parse::<usize>().map_err(|_| {
                FormatError::at_line(
                    Artifact::Correspondences,
                    line_no,
                    format!("bad word id '{id_text}'"),
                )
            })?;
            let word_id = zero_indexed(one_based, Artifact::Correspondences, line_no)?;

            vocabulary.lexicon.insert(
                word_id,
                LexiconWord {
                    word: lemma.to_string(),
                    word_id,
                },
            );
            vocabulary.word_to_id.insert(surface.to_string(), word_id);
            vocabulary
                .id_to_surface_forms
                .entry(word_id)
                .or_default()
                .push(surface.to_string());
            vocabulary.lexicon_len = vocabulary.lexicon_len.max(word_id + 1);
        }

        log::debug!(
            "Parsed vocabulary: {} lemmas, {} surface forms",
            vocabulary.lexicon.len(),
            vocabulary.word_to_id.len()
        );

        Ok(vocabulary)
    }

    /// Lexicon entry for a surface form, `None` if the form is unknown.
    pub fn lexicon_word_by_word(&self, surface_form: &str) -> Option<&LexiconWord> {
        self.word_to_id
            .get(surface_form)
            .and_then(|id| self.lexicon.get(id))
    }

    /// Every surface form that lemmatizes to `word_id`.
    pub fn vocabulary_words_by_id(&self, word_id: usize) -> Option<&[String]> {
        self.id_to_surface_forms.get(&word_id).map(Vec::as_slice)
    }

    pub fn lexicon_word_by_id(&self, word_id: usize) -> Option<&LexiconWord> {
        self.lexicon.get(&word_id)
    }

    /// Dense length of the lexicon (largest id + 1); ids below it may be holes.
    pub fn lexicon_len(&self) -> usize {
        self.lexicon_len
    }

    /// Number of distinct lemmas
    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }
}
