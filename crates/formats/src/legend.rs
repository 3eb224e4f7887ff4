use crate::artifact::Artifact;
use crate::color::RgbColor;
use crate::error::{FormatError, Result};
use serde::{Deserialize, Serialize};

const LEGEND_FIELDS: usize = 11;

/// One named end of the legend gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub name: String,
    pub color: RgbColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gradient {
    first: LegendItem,
    middle: RgbColor,
    second: LegendItem,
}

/// Optional two-endpoint color legend from `legend.txt`.
///
/// Either fully present or absent; partial legends are rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    gradient: Option<Gradient>,
}

impl Legend {
    /// Parse a single line of 11 tab-separated fields:
    /// `name1 r g b  rm gm bm  name2 r g b`. Blank input means "no legend".
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() != LEGEND_FIELDS {
            return Err(FormatError::malformed(
                Artifact::Legend,
                format!("expected {LEGEND_FIELDS} fields, found {}", fields.len()),
            ));
        }

        let color_at = |start: usize| -> Result<RgbColor> {
            Ok(RgbColor::from_unit(
                channel(fields[start])?,
                channel(fields[start + 1])?,
                channel(fields[start + 2])?,
            ))
        };

        let gradient = Gradient {
            first: LegendItem {
                name: fields[0].trim().to_string(),
                color: color_at(1)?,
            },
            middle: color_at(4)?,
            second: LegendItem {
                name: fields[7].trim().to_string(),
                color: color_at(8)?,
            },
        };

        Ok(Self {
            gradient: Some(gradient),
        })
    }

    pub fn has_legend(&self) -> bool {
        self.gradient.is_some()
    }

    pub fn first(&self) -> Option<&LegendItem> {
        self.gradient.as_ref().map(|g| &g.first)
    }

    pub fn middle(&self) -> Option<RgbColor> {
        self.gradient.as_ref().map(|g| g.middle)
    }

    pub fn second(&self) -> Option<&LegendItem> {
        self.gradient.as_ref().map(|g| &g.second)
    }

    /// Interpolated color for a feature value in `[0, 1]`.
    ///
    /// `[0, 0.5]` fades first -> middle, `(0.5, 1]` fades middle -> second.
    /// Out-of-range features (and NaN) yield `None`, as does a missing legend.
    pub fn color_for_feature(&self, feature: f64) -> Option<RgbColor> {
        let gradient = self.gradient.as_ref()?;

        if (0.0..=0.5).contains(&feature) {
            let amount = feature * 2.0;
            Some(gradient.first.color.fade_to(&gradient.middle, amount))
        } else if feature > 0.5 && feature <= 1.0 {
            let amount = (feature - 0.5) * 2.0;
            Some(gradient.middle.fade_to(&gradient.second.color, amount))
        } else {
            None
        }
    }
}

fn channel(field: &str) -> Result<f64> {
    field.trim().parse::<f64>().map_err(|_| {
        FormatError::malformed(Artifact::Legend, format!("bad color channel '{field}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEGEND: &str = "negative\t1\t0\t0\t1\t1\t1\tpositive\t0\t0\t1\n";

    #[test]
    fn blank_input_has_no_legend() {
        assert!(!Legend::parse("").unwrap().has_legend());
        assert!(!Legend::parse("  \n").unwrap().has_legend());
        assert_eq!(Legend::parse("").unwrap().color_for_feature(0.5), None);
    }

    #[test]
    fn parses_endpoints_and_middle() {
        let legend = Legend::parse(LEGEND).unwrap();
        assert!(legend.has_legend());
        assert_eq!(legend.first().unwrap().name, "negative");
        assert_eq!(legend.second().unwrap().name, "positive");
        assert_eq!(legend.middle(), Some(RgbColor::new(255.0, 255.0, 255.0)));
    }

    #[test]
    fn interpolation_boundaries() {
        let legend = Legend::parse(LEGEND).unwrap();
        let first = legend.first().unwrap().color;
        let second = legend.second().unwrap().color;

        assert_eq!(legend.color_for_feature(0.0), Some(first));
        assert_eq!(legend.color_for_feature(0.5), legend.middle());
        assert_eq!(legend.color_for_feature(1.0), Some(second));
        assert_eq!(
            legend.color_for_feature(0.25),
            Some(RgbColor::new(255.0, 127.5, 127.5))
        );
        assert_eq!(legend.color_for_feature(-0.01), None);
        assert_eq!(legend.color_for_feature(1.01), None);
        assert_eq!(legend.color_for_feature(f64::NAN), None);
    }

    #[test]
    fn ten_fields_are_rejected() {
        let err = Legend::parse("a\t1\t0\t0\t1\t1\t1\tb\t0\t0").unwrap_err();
        assert!(err.to_string().contains("legend.txt improperly formatted."));
    }

    #[test]
    fn twelve_fields_are_rejected() {
        assert!(Legend::parse("a\t1\t0\t0\t1\t1\t1\tb\t0\t0\t1\t9").is_err());
    }
}
