use crate::error::Result;
use crate::lines::content_lines;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Keys with a fixed place in [`DocEntry`]. `image` is a legacy column that is
/// recognized and discarded.
const RESERVED_KEYS: [&str; 7] = ["id", "title", "abstract", "link", "layer", "feature", "image"];

/// Metadata of one trained document entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    pub id: usize,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub link: String,
    pub layer: usize,
    pub feature: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other_fields: BTreeMap<String, String>,
}

/// Document metadata from `database.txt`.
#[derive(Debug, Clone, Default)]
pub struct Database {
    entries: HashMap<usize, DocEntry>,
    extra_columns: Vec<String>,
}

impl Database {
    /// Parse lines of tab-separated `key:value` tokens.
    ///
    /// Lines without a usable `id` and `layer` are dropped, not rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        let mut extra_columns = Vec::new();
        let mut seen_columns = HashSet::new();
        let mut dropped = 0usize;

        for (line_no, line) in content_lines(text) {
            let pairs: Vec<(&str, &str)> = line
                .split('\t')
                .filter_map(|token| token.split_once(':'))
                .collect();
            let mut components: BTreeMap<String, String> = pairs
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();

            let Some((id, layer)) = identity(&components) else {
                log::debug!("Dropping database.txt line {line_no}: missing id or layer");
                dropped += 1;
                continue;
            };

            let text_field = |key: &str| {
                components
                    .get(key)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default()
            };
            let title = text_field("title");
            let abstract_text = text_field("abstract");
            let link = text_field("link");
            let feature = components
                .get("feature")
                .and_then(|v| v.trim().parse::<f64>().ok());

            for key in RESERVED_KEYS {
                components.remove(key);
            }

            for (key, _) in &pairs {
                if !RESERVED_KEYS.contains(key) && seen_columns.insert(*key) {
                    extra_columns.push(key.to_string());
                }
            }

            entries.insert(
                id,
                DocEntry {
                    id,
                    title,
                    abstract_text,
                    link,
                    layer,
                    feature,
                    other_fields: components,
                },
            );
        }

        if dropped > 0 {
            log::warn!("Dropped {dropped} database.txt lines without id/layer");
        }
        log::debug!(
            "Parsed {} document entries, {} extra columns",
            entries.len(),
            extra_columns.len()
        );

        Ok(Self {
            entries,
            extra_columns,
        })
    }

    pub fn doc_entry(&self, entry_id: usize) -> Option<&DocEntry> {
        self.entries.get(&entry_id)
    }

    /// Distinct non-reserved columns, in the order first seen.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 0-indexed (id, layer), if both are present and valid.
fn identity(components: &BTreeMap<String, String>) -> Option<(usize, usize)> {
    let parse = |key: &str| {
        components
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(|v| v.checked_sub(1))
    };
    Some((parse("id")?, parse("layer")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_known_and_extra_fields() {
        let db = Database::parse(
            "id:1\ttitle: Hello \tabstract:World\tlink:http://x\tlayer:2\tfeature:0.25\tauthor:Ann\n",
        )
        .unwrap();

        let entry = db.doc_entry(0).unwrap();
        assert_eq!(entry.title, "Hello");
        assert_eq!(entry.abstract_text, "World");
        assert_eq!(entry.link, "http://x");
        assert_eq!(entry.layer, 1);
        assert_eq!(entry.feature, Some(0.25));
        assert_eq!(
            entry.other_fields.get("author").map(String::as_str),
            Some("Ann")
        );
        assert_eq!(db.extra_columns(), &["author".to_string()]);
    }

    #[test]
    fn token_order_does_not_matter() {
        let db = Database::parse("layer:1\ttitle:T\tid:3").unwrap();
        assert_eq!(db.doc_entry(2).unwrap().title, "T");
        assert!(db.doc_entry(0).is_none());
    }

    #[test]
    fn values_keep_later_colons() {
        let db = Database::parse("id:1\tlayer:1\tlink:https://example.com/a").unwrap();
        assert_eq!(db.doc_entry(0).unwrap().link, "https://example.com/a");
    }

    #[test]
    fn lines_without_id_or_layer_are_dropped() {
        let db = Database::parse(
            "title:nope\tlayer:1\nid:2\ttitle:no layer\nid:\tlayer:1\nid:1\tlayer:1",
        )
        .unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.doc_entry(0).is_some());
    }

    #[test]
    fn extra_columns_in_first_seen_order() {
        let db = Database::parse(
            "id:1\tlayer:1\tzeta:1\talpha:2\nid:2\tlayer:1\tbeta:3\talpha:4\timage:x.png",
        )
        .unwrap();
        assert_eq!(
            db.extra_columns(),
            &["zeta".to_string(), "alpha".to_string(), "beta".to_string()]
        );
        assert!(db.doc_entry(1).unwrap().other_fields.get("image").is_none());
    }

    #[test]
    fn missing_feature_is_none() {
        let db = Database::parse("id:1\tlayer:1").unwrap();
        let entry = db.doc_entry(0).unwrap();
        assert_eq!(entry.feature, None);
        assert!(entry.other_fields.is_empty());
    }
}
