//! The text-recognition seam between region detection and reconstruction.

use crate::core_modules::region::Region;
use crate::error::ExtractionError;
use async_trait::async_trait;
use image::{RgbaImage, SubImage};
use std::collections::HashMap;

/// Text read from one region, with the engine's confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
}

impl Recognition {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Reads the text inside one region of a calendar photo.
///
/// Calls for different regions may run concurrently. A failure only loses that
/// region.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn recognize(
        &self,
        image: &RgbaImage,
        region: Region,
    ) -> Result<Recognition, ExtractionError>;
}

/// A view of `region` inside `image`, or an error if it does not fit.
pub fn crop(image: &RgbaImage, region: Region) -> Result<SubImage<&RgbaImage>, ExtractionError> {
    let fits = region.width > 0
        && region.height > 0
        && region.right() <= image.width()
        && region.bottom() <= image.height();
    if !fits {
        return Err(ExtractionError::OutOfBounds {
            region,
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(image::imageops::crop_imm(
        image,
        region.x,
        region.y,
        region.width,
        region.height,
    ))
}

/// Answers from a fixed table of region → text. Unknown regions fail.
///
/// Replays fragments captured from an earlier run, and stands in for a real
/// engine in tests.
#[derive(Debug, Clone, Default)]
pub struct CannedExtractor {
    answers: HashMap<Region, Recognition>,
}

impl CannedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, region: Region, text: impl Into<String>, confidence: f32) -> Self {
        self.insert(region, Recognition::new(text, confidence));
        self
    }

    pub fn insert(&mut self, region: Region, recognition: Recognition) {
        self.answers.insert(region, recognition);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

#[async_trait]
impl TextExtractor for CannedExtractor {
    async fn recognize(
        &self,
        image: &RgbaImage,
        region: Region,
    ) -> Result<Recognition, ExtractionError> {
        crop(image, region)?;
        self.answers
            .get(&region)
            .cloned()
            .ok_or(ExtractionError::Unrecognized(region))
    }
}
