//! Boundary to the linguistic front end.
//!
//! Copy synthesis needs fully specified markup (segment timings taken from the
//! recording the frames were analysed from); standard synthesis only has the
//! text. [`JsonMarkupFrontEnd`] reads timing markup as JSON and lays text out
//! with a fixed phone duration.

use std::io::BufRead;

use serde::Deserialize;

use crate::{
    error::FrontEndError,
    segment::{Segment, Utterance},
};

pub trait FrontEnd: Send + Sync {
    /// Build an utterance from markup that already carries segment timings.
    fn utterance_from_markup(&self, markup: &mut dyn BufRead) -> Result<Utterance, FrontEndError>;

    /// Build an utterance for plain text (the standard synthesis path).
    fn utterance_from_text(&self, text: &str) -> Result<Utterance, FrontEndError>;
}

#[derive(Debug, Deserialize)]
struct MarkupDocument {
    words: Vec<MarkupWord>,
}

#[derive(Debug, Deserialize)]
struct MarkupWord {
    text: String,
    #[serde(default)]
    segments: Vec<MarkupSegment>,
}

#[derive(Debug, Deserialize)]
struct MarkupSegment {
    phone: String,
    /// Defaults to the end of the previous segment.
    start: Option<f64>,
    end: f64,
}

#[derive(Debug, Clone)]
pub struct JsonMarkupFrontEnd {
    phone_duration: f64,
}

impl JsonMarkupFrontEnd {
    pub const DEFAULT_PHONE_DURATION: f64 = 0.08;

    pub fn new(phone_duration: f64) -> Self {
        Self { phone_duration }
    }
}

impl Default for JsonMarkupFrontEnd {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PHONE_DURATION)
    }
}

impl FrontEnd for JsonMarkupFrontEnd {
    fn utterance_from_markup(&self, markup: &mut dyn BufRead) -> Result<Utterance, FrontEndError> {
        let doc: MarkupDocument = serde_json::from_reader(markup)?;

        let mut builder = Utterance::builder();
        let mut previous_end = 0.0;
        for word in doc.words {
            let mut segments = Vec::with_capacity(word.segments.len());
            for seg in word.segments {
                let start = seg.start.unwrap_or(previous_end);
                if !start.is_finite() || !seg.end.is_finite() || start < 0.0 {
                    return Err(FrontEndError::InvalidMarkup(format!(
                        "segment {:?} in word {:?} has invalid times {start}..{}",
                        seg.phone, word.text, seg.end
                    )));
                }
                if seg.end < start {
                    return Err(FrontEndError::InvalidMarkup(format!(
                        "segment {:?} in word {:?} ends at {} before it starts at {start}",
                        seg.phone, word.text, seg.end
                    )));
                }
                previous_end = seg.end;
                segments.push(Segment::new(seg.phone, start, seg.end));
            }
            builder = builder.word(word.text, segments);
        }

        Ok(builder.build())
    }

    fn utterance_from_text(&self, text: &str) -> Result<Utterance, FrontEndError> {
        let mut builder = Utterance::builder();
        let mut t = 0.0;
        let mut any = false;

        for token in text.split_whitespace() {
            let mut segments = Vec::new();
            for c in token.chars().filter(|c| c.is_alphanumeric()) {
                let end = t + self.phone_duration;
                segments.push(Segment::new(c.to_lowercase().to_string(), t, end));
                t = end;
            }
            if segments.is_empty() {
                continue;
            }
            any = true;
            builder = builder.word(token, segments);
        }

        if !any {
            return Err(FrontEndError::EmptyText);
        }
        Ok(builder.build())
    }
}
