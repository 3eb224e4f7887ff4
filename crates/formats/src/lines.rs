//! Line and token helpers shared by every decoder.

use crate::artifact::Artifact;
use crate::error::{FormatError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\n|\r").expect("valid regex"));

/// Non-blank lines with their 1-based line numbers.
pub(crate) fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    LINE_BREAK
        .split(text)
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Parse the numeric part of a `prefix:N` token (e.g. `row:12`).
pub(crate) fn prefixed_number(
    regex: &Regex,
    token: &str,
    artifact: Artifact,
    line: usize,
) -> Result<usize> {
    regex
        .captures(token)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .ok_or_else(|| FormatError::at_line(artifact, line, format!("bad token '{token}'")))
}

/// Convert a 1-indexed value from the source text to a 0-indexed one.
pub(crate) fn zero_indexed(value: usize, artifact: Artifact, line: usize) -> Result<usize> {
    value
        .checked_sub(1)
        .ok_or_else(|| FormatError::at_line(artifact, line, "indices are 1-based, found 0"))
}

/// 1-based row/col coordinates must be at least 1.
pub(crate) fn one_based(value: usize, artifact: Artifact, line: usize) -> Result<usize> {
    if value == 0 {
        return Err(FormatError::at_line(
            artifact,
            line,
            "row/col are 1-based, found 0",
        ));
    }
    Ok(value)
}
