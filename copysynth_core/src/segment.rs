//! Utterance structure: words owning runs of time-stamped segments.
//!
//! All segments of an utterance live in one contiguous, time-ordered
//! sequence. A word owns an index range of that sequence, and the
//! "next segment on the same level" is simply the following index; the end
//! of the sequence terminates the chain.

use std::ops::Range;

use crate::{error::AlignError, frame::FeatureFrame};

/// Position of a segment inside its utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub usize);

/// Frames bound to a segment by alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSpan {
    /// Frame index computed from the segment start, before clamping.
    pub start_index: usize,
    /// Frame index computed from the segment end, before clamping.
    pub end_index: usize,
    pub frames: Vec<FeatureFrame>,
}

/// Synthesis features of a segment. Set once, never replaced.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeatureSpan {
    #[default]
    Unaligned,
    Aligned(AlignedSpan),
}

/// A phone-level unit with utterance-relative times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    label: String,
    start_time: f64,
    end_time: f64,
    span: FeatureSpan,
}

impl Segment {
    pub fn new(label: impl Into<String>, start_time: f64, end_time: f64) -> Self {
        Self {
            label: label.into(),
            start_time,
            end_time,
            span: FeatureSpan::Unaligned,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn span(&self) -> &FeatureSpan {
        &self.span
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self.span, FeatureSpan::Aligned(_))
    }

    /// Attached frames, or `None` while the segment is unaligned.
    pub fn frames(&self) -> Option<&[FeatureFrame]> {
        match &self.span {
            FeatureSpan::Aligned(span) => Some(&span.frames),
            FeatureSpan::Unaligned => None,
        }
    }

    fn attach(&mut self, index: usize, span: AlignedSpan) -> Result<(), AlignError> {
        if self.is_aligned() {
            return Err(AlignError::AlreadyAligned { segment: index });
        }
        self.span = FeatureSpan::Aligned(span);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    text: String,
    segments: Range<usize>,
}

impl Word {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Entry point into the segment chain of this word.
    pub fn first_segment(&self) -> Option<SegmentId> {
        (!self.segments.is_empty()).then_some(SegmentId(self.segments.start))
    }

    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> {
        self.segments.clone().map(SegmentId)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

/// Linguistic structure of one synthesis request.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Utterance {
    words: Vec<Word>,
    segments: Vec<Segment>,
}

impl Utterance {
    pub fn builder() -> UtteranceBuilder {
        UtteranceBuilder::default()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment of the first word that has any.
    pub fn first_segment(&self) -> Option<SegmentId> {
        self.words.iter().find_map(Word::first_segment)
    }

    /// Same-level successor of `id`, `None` at the end of the chain.
    pub fn next_segment(&self, id: SegmentId) -> Option<SegmentId> {
        let next = id.0 + 1;
        (next < self.segments.len()).then_some(SegmentId(next))
    }

    /// Word owning the segment.
    pub fn word_of(&self, id: SegmentId) -> Option<&Word> {
        self.words.iter().find(|w| w.segments.contains(&id.0))
    }

    pub fn is_aligned(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(Segment::is_aligned)
    }

    pub(crate) fn first_aligned(&self) -> Option<SegmentId> {
        self.segments.iter().position(Segment::is_aligned).map(SegmentId)
    }

    /// One-shot span attachment. Fails if the segment already has one.
    pub(crate) fn attach_span(&mut self, id: SegmentId, span: AlignedSpan) -> Result<(), AlignError> {
        match self.segments.get_mut(id.0) {
            Some(segment) => segment.attach(id.0, span),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct UtteranceBuilder {
    words: Vec<Word>,
    segments: Vec<Segment>,
}

impl UtteranceBuilder {
    /// Append a word and its segments to the end of the utterance.
    pub fn word<I>(mut self, text: impl Into<String>, segments: I) -> Self
    where
        I: IntoIterator<Item = Segment>,
    {
        let start = self.segments.len();
        self.segments.extend(segments);
        self.words.push(Word {
            text: text.into(),
            segments: start..self.segments.len(),
        });
        self
    }

    pub fn build(self) -> Utterance {
        Utterance {
            words: self.words,
            segments: self.segments,
        }
    }
}
