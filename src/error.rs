//! Error types for every stage of the engine.
//!
//! Only call-level contract violations surface as errors. Per-region and
//! per-fragment problems are absorbed by the stage that meets them.

use crate::core_modules::region::Region;
use thiserror::Error;

/// A malformed reconstruction request, rejected before any processing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("year must be between {min} and {max}, got {year}")]
    InvalidYear { year: i32, min: i32, max: i32 },
    #[error("unknown calendar mode `{0}` (expected `standard` or `shift-tracking`)")]
    UnknownMode(String),
}

/// A pixel buffer whose sample array does not match its dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("a {width}x{height} RGBA buffer needs {expected} bytes, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// Failure of a single text-recognition call. Never fatal to a pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("no text available for region {0:?}")]
    Unrecognized(Region),
    #[error("region {region:?} lies outside the {width}x{height} image")]
    OutOfBounds {
        region: Region,
        width: u32,
        height: u32,
    },
    #[error("text recognition engine failed: {0}")]
    Engine(String),
}

/// An invalid configuration value read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value `{value}` for {key}: {reason}")]
pub struct ConfigError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Errors surfaced by the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
}
