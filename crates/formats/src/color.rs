use crate::artifact::Artifact;
use crate::error::{FormatError, Result};
use crate::lines::{content_lines, one_based};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_COLOR_VALUE: f64 = 255.0;

/// RGB color with channels in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RgbColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl RgbColor {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Scale `[0, 1]` channels (as written by the training job) to `[0, 255]`.
    pub fn from_unit(red: f64, green: f64, blue: f64) -> Self {
        Self::new(
            red * MAX_COLOR_VALUE,
            green * MAX_COLOR_VALUE,
            blue * MAX_COLOR_VALUE,
        )
    }

    /// Linear fade from `self` towards `end`; `amount` 0 is `self`, 1 is `end`.
    pub fn fade_to(&self, end: &RgbColor, amount: f64) -> RgbColor {
        RgbColor {
            red: (end.red - self.red) * amount + self.red,
            green: (end.green - self.green) * amount + self.green,
            blue: (end.blue - self.blue) * amount + self.blue,
        }
    }
}

/// Per-cell colors of the base grid, from `colors_browser.txt`.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    colors: HashMap<(usize, usize), RgbColor>,
}

impl ColorTable {
    /// Parse `row<TAB>col<TAB>red<TAB>green<TAB>blue` lines.
    pub fn parse(text: &str) -> Result<Self> {
        let mut colors = HashMap::new();

        for (line_no, line) in content_lines(text) {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                return Err(FormatError::at_line(
                    Artifact::Colors,
                    line_no,
                    format!("expected 5 fields, found {}", fields.len()),
                ));
            }

            let row = parse_index(fields[0], line_no)?;
            let col = parse_index(fields[1], line_no)?;
            let red = parse_channel(fields[2], line_no)?;
            let green = parse_channel(fields[3], line_no)?;
            let blue = parse_channel(fields[4], line_no)?;

            colors.insert((row, col), RgbColor::from_unit(red, green, blue));
        }

        log::debug!("Parsed {} cell colors", colors.len());
        Ok(Self { colors })
    }

    /// Color of a cell (1-indexed). `None` when the cell has no color.
    pub fn color(&self, row: usize, col: usize) -> Option<RgbColor> {
        self.colors.get(&(row, col)).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

fn parse_index(field: &str, line_no: usize) -> Result<usize> {
    let value = field.trim().parse::<usize>().map_err(|_| {
        FormatError::at_line(Artifact::Colors, line_no, format!("bad index '{field}'"))
    })?;
    one_based(value, Artifact::Colors, line_no)
}

fn parse_channel(field: &str, line_no: usize) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| {
        FormatError::at_line(
            Artifact::Colors,
            line_no,
            format!("bad color channel '{field}'"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_channels_to_255() {
        let table = ColorTable::parse("1\t2\t1.0\t0.5\t0\n").unwrap();
        assert_eq!(table.color(1, 2), Some(RgbColor::new(255.0, 127.5, 0.0)));
    }

    #[test]
    fn unpopulated_cells_are_none() {
        let table = ColorTable::parse("1\t1\t0.1\t0.2\t0.3").unwrap();
        assert_eq!(table.color(1, 2), None);
        assert_eq!(table.color(7, 1), None);
        assert_eq!(table.color(0, 0), None);
    }

    #[test]
    fn short_line_is_rejected() {
        let err = ColorTable::parse("1\t1\t0.1\t0.2").unwrap_err();
        assert!(err
            .to_string()
            .contains("colors_browser.txt improperly formatted."));
    }

    #[test]
    fn fade_endpoints() {
        let black = RgbColor::new(0.0, 0.0, 0.0);
        let white = RgbColor::new(255.0, 255.0, 255.0);
        assert_eq!(black.fade_to(&white, 0.0), black);
        assert_eq!(black.fade_to(&white, 1.0), white);
        assert_eq!(
            black.fade_to(&white, 0.5),
            RgbColor::new(127.5, 127.5, 127.5)
        );
    }
}
