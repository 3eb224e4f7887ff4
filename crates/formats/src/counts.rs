use crate::artifact::Artifact;
use crate::error::{FormatError, Result};
use crate::lines::{content_lines, prefixed_number, zero_indexed};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static ID_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^id:(\d+)").expect("valid regex"));
static ENTRY_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+):(\d+)").expect("valid regex"));

/// Occurrences of one word in one document entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntryWordCount {
    pub entry_id: usize,
    pub word_count: u32,
}

/// Sparse word x document count matrix from `words.txt`.
#[derive(Debug, Clone, Default)]
pub struct WordCounts {
    rows: HashMap<usize, Vec<DocEntryWordCount>>,
}

impl WordCounts {
    /// Parse `id:<wordId><TAB>entryId:count...` lines (all ids 1-indexed).
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = HashMap::new();

        for (line_no, line) in content_lines(text) {
            let mut tokens = line.split('\t');
            let head = tokens.next().unwrap_or_default();
            if !head.starts_with("id:") {
                return Err(FormatError::at_line(
                    Artifact::WordCounts,
                    line_no,
                    "line must start with 'id:'",
                ));
            }

            let word_id = zero_indexed(
                prefixed_number(&ID_PREFIX, head, Artifact::WordCounts, line_no)?,
                Artifact::WordCounts,
                line_no,
            )?;

            let mut counts = Vec::new();
            for token in tokens {
                let Some(caps) = ENTRY_COUNT.captures(token) else {
                    continue;
                };
                let (Ok(entry), Ok(word_count)) =
                    (caps[1].parse::<usize>(), caps[2].parse::<u32>())
                else {
                    continue;
                };
                counts.push(DocEntryWordCount {
                    entry_id: zero_indexed(entry, Artifact::WordCounts, line_no)?,
                    word_count,
                });
            }

            rows.insert(word_id, counts);
        }

        log::debug!("Parsed word counts for {} words", rows.len());
        Ok(Self { rows })
    }

    /// Count of `word_id` in document `entry_id`.
    ///
    /// `None` when the word has no row at all; `Some(0)` when the row exists
    /// but does not list the entry. Callers rely on the difference.
    pub fn word_counts(&self, entry_id: usize, word_id: usize) -> Option<u32> {
        let row = self.rows.get(&word_id)?;
        Some(
            row.iter()
                .find(|c| c.entry_id == entry_id)
                .map_or(0, |c| c.word_count),
        )
    }

    /// Whether `word_id` occurs at least once in `entry_id`
    pub fn contains(&self, entry_id: usize, word_id: usize) -> bool {
        self.word_counts(entry_id, word_id).unwrap_or(0) > 0
    }

    pub fn word_row(&self, word_id: usize) -> Option<&[DocEntryWordCount]> {
        self.rows.get(&word_id).map(Vec::as_slice)
    }

    /// Number of word rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_is_none_missing_entry_is_zero() {
        let counts = WordCounts::parse("id:1\t1:3\t4:1\nid:3\t2:7").unwrap();

        assert_eq!(counts.word_counts(0, 0), Some(3));
        assert_eq!(counts.word_counts(3, 0), Some(1));
        assert_eq!(counts.word_counts(1, 0), Some(0));
        assert_eq!(counts.word_counts(1, 2), Some(7));
        assert_eq!(counts.word_counts(0, 1), None);
    }

    #[test]
    fn empty_row_still_exists() {
        let counts = WordCounts::parse("id:2\n").unwrap();
        assert_eq!(counts.word_counts(0, 1), Some(0));
        assert!(!counts.contains(0, 1));
    }

    #[test]
    fn garbage_tokens_are_ignored() {
        let counts = WordCounts::parse("id:1\tnope\t2:5\t").unwrap();
        assert_eq!(counts.word_row(0).unwrap().len(), 1);
        assert_eq!(counts.word_counts(1, 0), Some(5));
    }

    #[test]
    fn missing_id_prefix_is_rejected() {
        let err = WordCounts::parse("1\t1:3").unwrap_err();
        assert!(err.to_string().contains("words.txt improperly formatted."));

        assert!(WordCounts::parse("id:x\t1:3").is_err());
    }
}
