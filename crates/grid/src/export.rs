//! CSV export of a ranked document list.

use crate::error::Result;
use browsecloud_formats::DocEntry;
use std::io::Write;

const FIXED_HEADERS: [&str; 5] = ["Title", "Text", "Relevance", "Link", "Feature"];

/// Placeholder the training job writes for missing titles and abstracts.
const MISSING_TEXT: &str = "nan";

/// Write `entries` (most relevant first) as CSV with CRLF row endings.
///
/// Relevance counts down from the list length to 1. `extra_columns` become
/// trailing columns filled from each entry's other fields.
pub fn write_results_csv<W: Write>(
    writer: W,
    entries: &[DocEntry],
    extra_columns: &[String],
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let header = FIXED_HEADERS
        .iter()
        .copied()
        .chain(extra_columns.iter().map(String::as_str));
    csv.write_record(header)?;

    for (index, entry) in entries.iter().enumerate() {
        let relevance = (entries.len() - index).to_string();
        let feature = match entry.feature {
            Some(feature) if feature > 0.0 => feature.to_string(),
            _ => String::new(),
        };

        let mut record = vec![
            present_text(&entry.title).to_string(),
            present_text(&entry.abstract_text).to_string(),
            relevance,
            entry.link.clone(),
            feature,
        ];
        record.extend(
            extra_columns
                .iter()
                .map(|key| entry.other_fields.get(key).cloned().unwrap_or_default()),
        );
        csv.write_record(&record)?;
    }

    csv.flush()?;
    Ok(())
}

fn present_text(text: &str) -> &str {
    if text.eq_ignore_ascii_case(MISSING_TEXT) {
        ""
    } else {
        text
    }
}
