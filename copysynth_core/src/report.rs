use serde::Serialize;

use crate::segment::{FeatureSpan, SegmentId, Utterance};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentReport {
    pub word: String,
    pub phone: String,
    pub start_time: f64,
    pub end_time: f64,
    pub start_frame: Option<usize>,
    pub end_frame: Option<usize>,
    pub frame_count: usize,
    pub aligned: bool,
}

/// Per-segment overview of an utterance and the frames bound to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentReport {
    pub frame_rate_hz: u32,
    pub words: usize,
    pub attached_frames: usize,
    pub segments: Vec<SegmentReport>,
}

impl AlignmentReport {
    pub fn from_utterance(utterance: &Utterance, frame_rate_hz: u32) -> Self {
        let segments: Vec<SegmentReport> = utterance
            .segments()
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                let word = utterance
                    .word_of(SegmentId(i))
                    .map(|w| w.text().to_string())
                    .unwrap_or_default();
                let (start_frame, end_frame, frame_count) = match segment.span() {
                    FeatureSpan::Aligned(span) => {
                        (Some(span.start_index), Some(span.end_index), span.frames.len())
                    }
                    FeatureSpan::Unaligned => (None, None, 0),
                };
                SegmentReport {
                    word,
                    phone: segment.label().to_string(),
                    start_time: segment.start_time(),
                    end_time: segment.end_time(),
                    start_frame,
                    end_frame,
                    frame_count,
                    aligned: segment.is_aligned(),
                }
            })
            .collect();

        Self {
            frame_rate_hz,
            words: utterance.words().len(),
            attached_frames: segments.iter().map(|s| s.frame_count).sum(),
            segments,
        }
    }
}
