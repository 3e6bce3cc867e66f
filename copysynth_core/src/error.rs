use std::num::ParseFloatError;

use thiserror::Error;

/// A single frame line could not be decoded.
#[derive(Debug, Error)]
pub enum ParseFrameError {
    #[error("frame line has no fields")]
    Empty,

    #[error("column {column}: empty field")]
    EmptyField { column: usize },

    #[error("column {column}: {field:?} is not a number: {source}")]
    InvalidNumber {
        column: usize,
        field: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("column {column}: {field:?} is not a finite value")]
    NonFinite { column: usize, field: String },

    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// A companion resource could not be located, opened or read.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("invalid resource locator {locator:?}: {message}")]
    InvalidLocator { locator: String, message: String },

    #[error("unsupported URL scheme {scheme:?} in {locator}")]
    UnsupportedScheme { locator: String, scheme: String },

    #[error("I/O error while reading {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error while fetching {resource}: {source}")]
    Http {
        resource: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ResourceError {
    pub(crate) fn io(resource: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            resource: resource.into(),
            source,
        }
    }

    pub(crate) fn http(resource: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            resource: resource.into(),
            source,
        }
    }

    pub(crate) fn invalid_locator(locator: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidLocator {
            locator: locator.into(),
            message: message.to_string(),
        }
    }
}

/// Construction of a frame stream failed. No partial stream is ever returned.
#[derive(Debug, Error)]
pub enum FrameStreamError {
    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("malformed frame at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseFrameError,
    },

    #[error("frame at line {line} has {found} columns, expected {expected}")]
    Arity {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl FrameStreamError {
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Arity { .. })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    #[error("segment {segment} already carries a feature span")]
    AlreadyAligned { segment: usize },
}

#[derive(Debug, Error)]
pub enum FrontEndError {
    #[error("I/O error while reading markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("markup is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid markup: {0}")]
    InvalidMarkup(String),

    #[error("text contains nothing to synthesize")]
    EmptyText,
}

/// Reason a copy-synthesis attempt was abandoned.
#[derive(Debug, Error)]
pub enum CopySynthesisError {
    #[error("cannot derive companion resources: {0}")]
    Locator(#[source] ResourceError),

    #[error("cannot open markup: {0}")]
    Markup(#[source] ResourceError),

    #[error("front end rejected markup: {0}")]
    FrontEnd(#[from] FrontEndError),

    #[error("cannot load frames: {0}")]
    Frames(#[from] FrameStreamError),

    #[error("alignment failed: {0}")]
    Align(#[from] AlignError),
}
