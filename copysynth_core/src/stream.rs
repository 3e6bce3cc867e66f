//! Sequential frame sources.
//!
//! A [`FrameStream`] hands out frames strictly in order through an internal
//! cursor. The vocoder pulls from it while rendering; nothing here supports
//! random access. [`FileBackedFrameStream`] additionally exposes
//! [`span`](FileBackedFrameStream::span) extraction for alignment, which
//! reads the loaded frames without touching the cursor.

use std::{
    io::{BufRead, BufReader, ErrorKind, Read},
    path::Path,
    time::Duration,
};

use tracing::info;
use url::Url;

use crate::{
    error::{FrameStreamError, ParseFrameError, ResourceError},
    frame::FeatureFrame,
    locator::ResourceLocator,
    segment::{SegmentId, Utterance},
};

/// A stateful, single-consumer source of feature frames.
pub trait FrameStream {
    /// Next unread frame, or `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Option<FeatureFrame>;

    /// Total number of frames, independent of how many were read.
    fn frame_count(&self) -> usize;
}

/// Frames of a whole frame file, loaded eagerly into memory.
#[derive(Debug, Clone)]
pub struct FileBackedFrameStream {
    frames: Vec<FeatureFrame>,
    cursor: usize,
}

impl FileBackedFrameStream {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FrameStreamError> {
        Self::from_locator(&ResourceLocator::from(path.as_ref()), None)
    }

    pub fn from_url(url: &Url, timeout: Option<Duration>) -> Result<Self, FrameStreamError> {
        let locator = ResourceLocator::from_url(url.clone())?;
        Self::from_locator(&locator, timeout)
    }

    pub fn from_locator(
        locator: &ResourceLocator,
        timeout: Option<Duration>,
    ) -> Result<Self, FrameStreamError> {
        let reader = locator.open(timeout)?;
        let stream = Self::load(reader, &locator.to_string())?;
        info!("loaded {} frames from {locator}", stream.frames.len());
        Ok(stream)
    }

    /// Read frames from an already open source. The reader is consumed and
    /// closed before this returns, whether loading succeeds or not.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FrameStreamError> {
        Self::load(reader, "<reader>")
    }

    fn load<R: Read>(reader: R, resource: &str) -> Result<Self, FrameStreamError> {
        let reader = BufReader::new(reader);
        let mut frames = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    return Err(FrameStreamError::Parse {
                        line: i + 1,
                        source: ParseFrameError::InvalidUtf8,
                    });
                }
                Err(e) => return Err(ResourceError::io(resource, e).into()),
            };
            if line.trim().is_empty() {
                continue;
            }
            let frame = FeatureFrame::parse_line(&line)
                .map_err(|source| FrameStreamError::Parse { line: i + 1, source })?;
            frames.push(frame);
        }

        Ok(Self { frames, cursor: 0 })
    }

    /// Fail unless every frame has exactly `expected` columns.
    ///
    /// Blank lines are skipped during loading, so the reported line is the
    /// 1-based frame number.
    pub fn ensure_arity(self, expected: usize) -> Result<Self, FrameStreamError> {
        if let Some((i, frame)) = self
            .frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.len() != expected)
        {
            return Err(FrameStreamError::Arity {
                line: i + 1,
                expected,
                found: frame.len(),
            });
        }
        Ok(self)
    }

    /// Frames in `[start, end)`, clamped to the loaded range. Degenerate or
    /// out-of-range spans yield an empty vector.
    pub fn span(&self, start: usize, end: usize) -> Vec<FeatureFrame> {
        let end = end.min(self.frames.len());
        if start >= end {
            return Vec::new();
        }
        self.frames[start..end].to_vec()
    }

    pub fn frames(&self) -> &[FeatureFrame] {
        &self.frames
    }

    /// Index of the next frame `next_frame` would return.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }
}

impl FrameStream for FileBackedFrameStream {
    fn next_frame(&mut self) -> Option<FeatureFrame> {
        let frame = self.frames.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some(frame)
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Replays the spans attached to an aligned utterance, segment by segment.
///
/// Unaligned segments contribute no frames.
#[derive(Debug)]
pub struct SegmentFrameStream<'a> {
    utterance: &'a Utterance,
    segment: Option<SegmentId>,
    offset: usize,
}

impl<'a> SegmentFrameStream<'a> {
    pub fn new(utterance: &'a Utterance) -> Self {
        Self {
            utterance,
            segment: utterance.first_segment(),
            offset: 0,
        }
    }
}

impl FrameStream for SegmentFrameStream<'_> {
    fn next_frame(&mut self) -> Option<FeatureFrame> {
        while let Some(id) = self.segment {
            let frames = self
                .utterance
                .segment(id)
                .and_then(|s| s.frames())
                .unwrap_or_default();
            if let Some(frame) = frames.get(self.offset) {
                self.offset += 1;
                return Some(frame.clone());
            }
            self.segment = self.utterance.next_segment(id);
            self.offset = 0;
        }
        None
    }

    fn frame_count(&self) -> usize {
        self.utterance
            .segments()
            .iter()
            .filter_map(|s| s.frames())
            .map(<[_]>::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ParseFrameError, segment::Segment};
    use std::io::Cursor;

    fn eight_frames() -> String {
        (0..8)
            .map(|i| format!("{i}.0,{}.5,-1", i * 10))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_next_frame_until_exhausted() {
        let mut stream = FileBackedFrameStream::from_reader(Cursor::new(eight_frames())).unwrap();
        assert_eq!(stream.frame_count(), 8);

        for i in 0..8 {
            let frame = stream.next_frame().expect("frame available");
            assert_eq!(frame.values()[0], i as f64);
        }
        assert!(stream.next_frame().is_none());
        assert!(stream.next_frame().is_none());
        assert_eq!(stream.frame_count(), 8);
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn test_span_extraction_and_clamping() {
        let stream = FileBackedFrameStream::from_reader(Cursor::new(eight_frames())).unwrap();

        let all = stream.span(0, 8);
        assert_eq!(all.len(), 8);
        assert_eq!(all.as_slice(), stream.frames());

        assert!(stream.span(2, 2).is_empty());
        assert!(stream.span(5, 3).is_empty());
        assert!(stream.span(9, 12).is_empty());

        let tail = stream.span(6, 20);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].values()[0], 6.0);
        assert_eq!(tail[1].values()[0], 7.0);
    }

    #[test]
    fn test_span_does_not_move_cursor() {
        let mut stream = FileBackedFrameStream::from_reader(Cursor::new(eight_frames())).unwrap();
        stream.next_frame();
        let _ = stream.span(0, 8);
        assert_eq!(stream.position(), 1);
        assert_eq!(stream.next_frame().unwrap().values()[0], 1.0);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let data = "1 2 3\n\n   \n4 5 6\n";
        let stream = FileBackedFrameStream::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(stream.frame_count(), 2);
    }

    #[test]
    fn test_malformed_line_fails_whole_load() {
        let data = "1,2,3\n4,5,6\n7,x,9\n10,11,12\n";
        let err = FileBackedFrameStream::from_reader(Cursor::new(data)).unwrap_err();
        assert!(err.is_parse_error());
        match err {
            FrameStreamError::Parse { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(source, ParseFrameError::InvalidNumber { column: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let data: &[u8] = b"1,2,3\n4,\xff,6\n";
        let err = FileBackedFrameStream::from_reader(data).unwrap_err();
        assert!(err.is_parse_error());
        assert!(matches!(
            err,
            FrameStreamError::Parse { line: 2, source: ParseFrameError::InvalidUtf8 }
        ));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let err = FileBackedFrameStream::from_path("no/such/dir/DE_0000.cmp").unwrap_err();
        assert!(err.is_resource_error());
        assert!(err.to_string().contains("DE_0000.cmp"));
    }

    #[test]
    fn test_ensure_arity() {
        let stream = FileBackedFrameStream::from_reader(Cursor::new(eight_frames())).unwrap();
        let stream = stream.ensure_arity(3).unwrap();

        let err = stream.ensure_arity(4).unwrap_err();
        assert!(matches!(
            err,
            FrameStreamError::Arity { line: 1, expected: 4, found: 3 }
        ));

        let ragged = FileBackedFrameStream::from_reader(Cursor::new("1 2\n1 2\n1\n")).unwrap();
        assert!(matches!(
            ragged.ensure_arity(2),
            Err(FrameStreamError::Arity { line: 3, .. })
        ));
    }

    #[test]
    fn test_segment_stream_replays_spans_in_order() {
        let mut utt = Utterance::builder()
            .word("ab", [Segment::new("a", 0.0, 0.01), Segment::new("b", 0.01, 0.02)])
            .word("c", [Segment::new("c", 0.02, 0.02)])
            .build();
        let frames = FileBackedFrameStream::from_reader(Cursor::new("1\n2\n3\n4\n")).unwrap();
        crate::align::align_segments(&mut utt, &frames).unwrap();

        let mut stream = SegmentFrameStream::new(&utt);
        assert_eq!(stream.frame_count(), 4);
        let values: Vec<f64> = std::iter::from_fn(|| stream.next_frame())
            .map(|f| f.values()[0])
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(stream.next_frame().is_none());
    }

    #[test]
    fn test_segment_stream_over_unaligned_utterance_is_empty() {
        let utt = Utterance::builder()
            .word("a", [Segment::new("a", 0.0, 0.1)])
            .build();
        let mut stream = SegmentFrameStream::new(&utt);
        assert_eq!(stream.frame_count(), 0);
        assert!(stream.next_frame().is_none());
    }
}
