//! Copy synthesis with fallback to the standard synthesis path.
//!
//! For an identifier `B` the adapter reads timing markup from
//! `B.<markup_suffix>` and frames from `B.<frame_suffix>`, aligns them, and
//! hands back the aligned utterance. Any failure along the way is reported
//! and the request is served by the front end's text path instead.

use std::{io::BufReader, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    align::{Aligner, AlignmentSummary, FRAME_RATE_HZ},
    error::{CopySynthesisError, FrontEndError},
    frontend::FrontEnd,
    locator::ResourceLocator,
    segment::Utterance,
    stream::{FileBackedFrameStream, FrameStream},
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CopySynthesisConfig {
    pub markup_suffix: String,
    pub frame_suffix: String,
    pub frame_rate_hz: u32,
    /// Reject frame files whose rows do not have this many columns.
    pub expected_columns: Option<usize>,
    pub fetch_timeout_secs: Option<u64>,
    /// Relative identifiers are resolved against this directory.
    pub resource_root: Option<PathBuf>,
}

impl Default for CopySynthesisConfig {
    fn default() -> Self {
        Self {
            markup_suffix: "json".to_string(),
            frame_suffix: "cmp".to_string(),
            frame_rate_hz: FRAME_RATE_HZ,
            expected_columns: None,
            fetch_timeout_secs: None,
            resource_root: None,
        }
    }
}

impl CopySynthesisConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Base identifier of the companion resources.
    pub id: String,
    /// Text for the standard path; the identifier is used when absent.
    pub text: Option<String>,
}

impl SynthesisRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Result of a successful copy-synthesis attempt.
#[derive(Debug, Clone)]
pub struct CopySynthesis {
    pub utterance: Utterance,
    pub summary: AlignmentSummary,
    pub total_frames: usize,
}

/// What the adapter produced for a request.
#[derive(Debug)]
pub enum Synthesis {
    Copy(CopySynthesis),
    Standard {
        utterance: Utterance,
        reason: CopySynthesisError,
    },
}

impl Synthesis {
    pub fn utterance(&self) -> &Utterance {
        match self {
            Self::Copy(copy) => &copy.utterance,
            Self::Standard { utterance, .. } => utterance,
        }
    }

    pub fn into_utterance(self) -> Utterance {
        match self {
            Self::Copy(copy) => copy.utterance,
            Self::Standard { utterance, .. } => utterance,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy(_))
    }

    pub fn fallback_reason(&self) -> Option<&CopySynthesisError> {
        match self {
            Self::Copy(_) => None,
            Self::Standard { reason, .. } => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CopySynthesisAdapter<F> {
    front_end: F,
    config: CopySynthesisConfig,
    aligner: Aligner,
}

impl<F: FrontEnd> CopySynthesisAdapter<F> {
    pub fn new(front_end: F, config: CopySynthesisConfig) -> Self {
        let aligner = Aligner::new(config.frame_rate_hz);
        Self {
            front_end,
            config,
            aligner,
        }
    }

    pub fn config(&self) -> &CopySynthesisConfig {
        &self.config
    }

    pub fn front_end(&self) -> &F {
        &self.front_end
    }

    /// Markup and frame-file locators for `id`.
    pub fn companion_locators(
        &self,
        id: &str,
    ) -> Result<(ResourceLocator, ResourceLocator), CopySynthesisError> {
        let mut base = id.parse::<ResourceLocator>().map_err(CopySynthesisError::Locator)?;
        if let Some(root) = &self.config.resource_root {
            base = base
                .resolve_against(root)
                .map_err(CopySynthesisError::Locator)?;
        }
        Ok((
            base.with_suffix(&self.config.markup_suffix),
            base.with_suffix(&self.config.frame_suffix),
        ))
    }

    /// Build the utterance from markup and bind the recorded frames to it.
    ///
    /// Frames are loaded completely before any segment is touched, so a
    /// failure never leaves a partially aligned utterance behind.
    pub fn try_copy_synthesis(&self, id: &str) -> Result<CopySynthesis, CopySynthesisError> {
        let (markup, frame_file) = self.companion_locators(id)?;
        let timeout = self.config.fetch_timeout();

        let mut utterance = {
            let reader = markup
                .open(timeout)
                .map_err(CopySynthesisError::Markup)?;
            self.front_end
                .utterance_from_markup(&mut BufReader::new(reader))?
        };
        if utterance.words().is_empty() {
            return Err(FrontEndError::InvalidMarkup("markup contains no words".to_string()).into());
        }

        let mut frames = FileBackedFrameStream::from_locator(&frame_file, timeout)?;
        if let Some(columns) = self.config.expected_columns {
            frames = frames.ensure_arity(columns)?;
        }

        let summary = self.aligner.align(&mut utterance, &frames)?;
        info!(
            "copy synthesis for {id}: {} segments, {} of {} frames attached",
            summary.segments_visited,
            summary.frames_attached,
            frames.frame_count()
        );

        Ok(CopySynthesis {
            utterance,
            summary,
            total_frames: frames.frame_count(),
        })
    }

    /// Copy synthesis when the companion resources allow it, standard
    /// synthesis otherwise. Only a failing standard path is an error.
    pub fn synthesize(&self, request: &SynthesisRequest) -> Result<Synthesis, FrontEndError> {
        match self.try_copy_synthesis(&request.id) {
            Ok(copy) => Ok(Synthesis::Copy(copy)),
            Err(reason) => {
                warn!(
                    "trouble finding files for copy synthesis of {}: {reason}; using standard synthesis",
                    request.id
                );
                let text = request.text.as_deref().unwrap_or(&request.id);
                let utterance = self.front_end.utterance_from_text(text)?;
                Ok(Synthesis::Standard { utterance, reason })
            }
        }
    }
}
