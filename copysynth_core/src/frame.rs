//! Feature frames: one analysis window's vocoder parameters.

use std::{fmt, str::FromStr, sync::Arc};

use serde::Serialize;

use crate::error::ParseFrameError;

/// Parameter vector of one 5 ms analysis window.
///
/// The column schema is defined by the voice model and is opaque here.
/// Values are shared, so cloning a frame (e.g. when a span is handed to a
/// segment) never copies the parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureFrame {
    values: Arc<[f64]>,
}

impl FeatureFrame {
    pub fn new(values: impl Into<Arc<[f64]>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    /// Parse one record of a frame file.
    ///
    /// Lines containing a comma are comma-separated (fields are trimmed and
    /// must not be empty); anything else is split on whitespace.
    pub fn parse_line(line: &str) -> Result<Self, ParseFrameError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseFrameError::Empty);
        }

        let values = if line.contains(',') {
            line.split(',')
                .enumerate()
                .map(|(column, field)| parse_field(column, field.trim()))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            line.split_whitespace()
                .enumerate()
                .map(|(column, field)| parse_field(column, field))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self::new(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn parse_field(column: usize, field: &str) -> Result<f64, ParseFrameError> {
    if field.is_empty() {
        return Err(ParseFrameError::EmptyField { column });
    }
    let value: f64 = field
        .parse()
        .map_err(|source| ParseFrameError::InvalidNumber {
            column,
            field: field.to_string(),
            source,
        })?;
    if !value.is_finite() {
        return Err(ParseFrameError::NonFinite {
            column,
            field: field.to_string(),
        });
    }
    Ok(value)
}

impl FromStr for FeatureFrame {
    type Err = ParseFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_line(s)
    }
}

impl From<Vec<f64>> for FeatureFrame {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl fmt::Display for FeatureFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        let frame = FeatureFrame::parse_line("1.5, -2,3e-2").unwrap();
        assert_eq!(frame.values(), &[1.5, -2.0, 0.03]);
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_parse_whitespace_separated() {
        let frame: FeatureFrame = "  0.25\t4   -1e10 ".parse().unwrap();
        assert_eq!(frame.values(), &[0.25, 4.0, -1e10]);
    }

    #[test]
    fn test_parse_rejects_non_numeric_field() {
        let err = FeatureFrame::parse_line("1.0,abc,3.0").unwrap_err();
        match err {
            ParseFrameError::InvalidNumber { column, field, .. } => {
                assert_eq!(column, 1);
                assert_eq!(field, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_empty_field() {
        let err = FeatureFrame::parse_line("1.0,,3.0").unwrap_err();
        assert!(matches!(err, ParseFrameError::EmptyField { column: 1 }));
    }

    #[test]
    fn test_parse_rejects_blank_and_non_finite() {
        assert!(matches!(
            FeatureFrame::parse_line("   "),
            Err(ParseFrameError::Empty)
        ));
        assert!(matches!(
            FeatureFrame::parse_line("1.0 NaN"),
            Err(ParseFrameError::NonFinite { column: 1, .. })
        ));
        assert!(matches!(
            FeatureFrame::parse_line("inf,1"),
            Err(ParseFrameError::NonFinite { column: 0, .. })
        ));
    }

    #[test]
    fn test_clone_shares_values() {
        let frame = FeatureFrame::from(vec![1.0, 2.0]);
        let copy = frame.clone();
        assert!(std::ptr::eq(frame.values(), copy.values()));
        assert_eq!(copy.to_string(), "1,2");
    }
}
