//! Copy synthesis: replaying recorded vocoder parameter frames.
//!
//! Instead of generating acoustic parameters from a voice model, copy
//! synthesis takes frames analysed from a recording (a `.cmp` frame file,
//! one 5 ms frame per line) and binds them to the phone segments of the
//! matching utterance, so the vocoder renders the recording segment by
//! segment.
//!
//! ```no_run
//! use copysynth_core::{CopySynthesisAdapter, CopySynthesisConfig, JsonMarkupFrontEnd, SynthesisRequest};
//!
//! let adapter = CopySynthesisAdapter::new(JsonMarkupFrontEnd::default(), CopySynthesisConfig::default());
//! let synthesis = adapter.synthesize(&SynthesisRequest::new("corpus/DE_1234"))?;
//! for segment in synthesis.utterance().segments() {
//!     println!("{} {:?}", segment.label(), segment.frames().map(|f| f.len()));
//! }
//! # Ok::<(), copysynth_core::FrontEndError>(())
//! ```

pub mod adapter;
pub mod align;
pub mod error;
pub mod frame;
pub mod frontend;
pub mod locator;
pub mod report;
pub mod segment;
pub mod stream;

pub use adapter::{CopySynthesis, CopySynthesisAdapter, CopySynthesisConfig, Synthesis, SynthesisRequest};
pub use align::{align_segments, Aligner, AlignmentSummary, FRAME_RATE_HZ};
pub use error::{
    AlignError, CopySynthesisError, FrameStreamError, FrontEndError, ParseFrameError, ResourceError,
};
pub use frame::FeatureFrame;
pub use frontend::{FrontEnd, JsonMarkupFrontEnd};
pub use locator::ResourceLocator;
pub use report::{AlignmentReport, SegmentReport};
pub use segment::{AlignedSpan, FeatureSpan, Segment, SegmentId, Utterance, UtteranceBuilder, Word};
pub use stream::{FileBackedFrameStream, FrameStream, SegmentFrameStream};
