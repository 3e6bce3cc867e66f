//! Binding frame spans onto time-stamped segments.
//!
//! The frame rate is not stored in frame files. Analysis data and aligner
//! must agree on it out of band; [`FRAME_RATE_HZ`] is the rate the stored
//! corpora are analysed at.

use tracing::debug;

use crate::{
    error::AlignError,
    segment::{AlignedSpan, SegmentId, Utterance},
    stream::{FileBackedFrameStream, FrameStream},
};

/// Analysis frames per second (5 ms frames).
pub const FRAME_RATE_HZ: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentSummary {
    pub segments_visited: usize,
    pub frames_attached: usize,
    /// Segments that received no frames (zero length, rounding or past the
    /// end of the stream).
    pub empty_spans: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aligner {
    frame_rate_hz: u32,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(FRAME_RATE_HZ)
    }
}

impl Aligner {
    pub fn new(frame_rate_hz: u32) -> Self {
        Self { frame_rate_hz }
    }

    pub fn frame_rate_hz(&self) -> u32 {
        self.frame_rate_hz
    }

    /// Frame index containing time `t` (seconds). Negative times map to 0.
    pub fn frame_index(&self, t: f64) -> usize {
        let index = (t * f64::from(self.frame_rate_hz)).floor();
        if index.is_nan() || index <= 0.0 {
            0
        } else {
            index as usize
        }
    }

    /// Walk the segment chain from the first segment and attach to every
    /// segment the frames covering its time span.
    ///
    /// Fails only if some segment was aligned before, in which case no
    /// segment is modified. Out-of-range and degenerate spans are clamped.
    pub fn align(
        &self,
        utterance: &mut Utterance,
        frames: &FileBackedFrameStream,
    ) -> Result<AlignmentSummary, AlignError> {
        if let Some(SegmentId(segment)) = utterance.first_aligned() {
            return Err(AlignError::AlreadyAligned { segment });
        }

        let mut summary = AlignmentSummary::default();
        let mut current = utterance.first_segment();

        while let Some(id) = current {
            let (start_index, end_index) = match utterance.segment(id) {
                Some(segment) => (
                    self.frame_index(segment.start_time()),
                    self.frame_index(segment.end_time()),
                ),
                None => break,
            };

            let span = frames.span(start_index, end_index);
            if span.is_empty() {
                debug!(
                    "segment {} gets no frames (indices {start_index}..{end_index}, {} available)",
                    id.0,
                    frames.frame_count()
                );
                summary.empty_spans += 1;
            }
            summary.frames_attached += span.len();
            summary.segments_visited += 1;

            utterance.attach_span(
                id,
                AlignedSpan {
                    start_index,
                    end_index,
                    frames: span,
                },
            )?;
            current = utterance.next_segment(id);
        }

        Ok(summary)
    }
}

/// [`Aligner::align`] at [`FRAME_RATE_HZ`].
pub fn align_segments(
    utterance: &mut Utterance,
    frames: &FileBackedFrameStream,
) -> Result<AlignmentSummary, AlignError> {
    Aligner::default().align(utterance, frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{FeatureSpan, Segment};
    use std::io::Cursor;

    fn stream_of(n: usize) -> FileBackedFrameStream {
        let data: String = (0..n).map(|i| format!("{i} 0.5\n")).collect();
        FileBackedFrameStream::from_reader(Cursor::new(data)).unwrap()
    }

    #[test]
    fn test_frame_index() {
        let aligner = Aligner::default();
        assert_eq!(aligner.frame_index(0.0), 0);
        assert_eq!(aligner.frame_index(0.04), 8);
        assert_eq!(aligner.frame_index(0.0051), 1);
        assert_eq!(aligner.frame_index(1.0), 200);
        assert_eq!(aligner.frame_index(-0.3), 0);
        assert_eq!(Aligner::new(100).frame_index(0.04), 4);
    }

    #[test]
    fn test_first_segment_gets_frames_zero_to_seven() {
        let mut utt = Utterance::builder()
            .word("a", [Segment::new("a", 0.0, 0.04)])
            .build();
        let frames = stream_of(20);

        let summary = align_segments(&mut utt, &frames).unwrap();
        assert_eq!(summary.segments_visited, 1);
        assert_eq!(summary.frames_attached, 8);

        match utt.segments()[0].span() {
            FeatureSpan::Aligned(span) => {
                assert_eq!(span.start_index, 0);
                assert_eq!(span.end_index, 8);
                let firsts: Vec<f64> = span.frames.iter().map(|f| f.values()[0]).collect();
                assert_eq!(firsts, (0..8).map(f64::from).collect::<Vec<_>>());
            }
            FeatureSpan::Unaligned => panic!("segment was not aligned"),
        }
    }

    #[test]
    fn test_visits_every_segment_once() {
        let k = 7;
        let segments: Vec<Segment> = (0..k)
            .map(|i| Segment::new(format!("p{i}"), i as f64 * 0.05, (i + 1) as f64 * 0.05))
            .collect();
        let mut utt = Utterance::builder()
            .word("first", segments[..3].to_vec())
            .word("second", segments[3..].to_vec())
            .build();

        let summary = align_segments(&mut utt, &stream_of(100)).unwrap();
        assert_eq!(summary.segments_visited, k);
        assert!(utt.is_aligned());
    }

    #[test]
    fn test_degenerate_and_out_of_range_spans_are_empty() {
        let mut utt = Utterance::builder()
            .word(
                "x",
                [
                    Segment::new("a", 0.0, 0.02),
                    Segment::new("b", 0.02, 0.02),
                    Segment::new("c", 0.02, 0.06),
                    Segment::new("d", 0.06, 0.5),
                ],
            )
            .build();
        // 10 frames cover 0.0 to 0.05 s.
        let summary = align_segments(&mut utt, &stream_of(10)).unwrap();

        let lens: Vec<usize> = utt
            .segments()
            .iter()
            .map(|s| s.frames().map_or(usize::MAX, <[_]>::len))
            .collect();
        assert_eq!(lens, vec![4, 0, 6, 0]);
        assert_eq!(summary.empty_spans, 2);
        assert_eq!(summary.frames_attached, 10);
        assert!(utt.is_aligned());
    }

    #[test]
    fn test_realignment_is_rejected_without_changes() {
        let mut utt = Utterance::builder()
            .word("a", [Segment::new("a", 0.0, 0.01)])
            .build();
        align_segments(&mut utt, &stream_of(4)).unwrap();
        let before = utt.clone();

        let err = align_segments(&mut utt, &stream_of(40)).unwrap_err();
        assert_eq!(err, AlignError::AlreadyAligned { segment: 0 });
        assert_eq!(utt, before);
    }

    #[test]
    fn test_empty_utterance() {
        let mut utt = Utterance::default();
        let summary = align_segments(&mut utt, &stream_of(4)).unwrap();
        assert_eq!(summary, AlignmentSummary::default());
    }
}
