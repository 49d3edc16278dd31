//! `TextExtractor` backed by the PaddleOCR models of the `ocr-rs` crate.

use crate::core_modules::region::Region;
use crate::core_modules::text_extractor::{crop, Recognition, TextExtractor};
use crate::error::ExtractionError;
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use log::{debug, info};
use ocr_rs::OcrEngine;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Detection model shared by every recognition language.
const DETECTION_MODEL: &str = "PP-OCRv5_mobile_det.mnn";

/// Recognition model families with a model file and charset in the models directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OcrLanguage {
    #[default]
    English,
    Latin,
    Chinese,
}

impl OcrLanguage {
    /// `(recognition model, charset)` file names.
    fn model_files(self) -> (&'static str, &'static str) {
        match self {
            OcrLanguage::English => ("en_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_en.txt"),
            OcrLanguage::Latin => ("latin_PP-OCRv5_mobile_rec_infer.mnn", "ppocr_keys_latin.txt"),
            OcrLanguage::Chinese => ("PP-OCRv5_mobile_rec.mnn", "ppocr_keys_v5.txt"),
        }
    }
}

impl FromStr for OcrLanguage {
    type Err = ExtractionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(OcrLanguage::English),
            "latin" => Ok(OcrLanguage::Latin),
            "chinese" | "zh" => Ok(OcrLanguage::Chinese),
            other => Err(ExtractionError::Engine(format!(
                "unsupported OCR language `{other}`"
            ))),
        }
    }
}

/// Runs PaddleOCR on each cropped region.
///
/// Inference is CPU-bound, so each call moves to the blocking thread pool. The engine
/// sits behind a mutex and serves one region at a time.
pub struct OcrRsExtractor {
    engine: Arc<Mutex<OcrEngine>>,
}

impl OcrRsExtractor {
    /// Loads the detection model plus the `language` recognition model from `models_dir`.
    pub fn from_models_dir(
        models_dir: impl AsRef<Path>,
        language: OcrLanguage,
    ) -> Result<Self, ExtractionError> {
        let models_dir = models_dir.as_ref();
        let (recognition, charset) = language.model_files();

        let det_path = require(models_dir.join(DETECTION_MODEL))?;
        let rec_path = require(models_dir.join(recognition))?;
        let charset_path = require(models_dir.join(charset))?;

        let engine = OcrEngine::new(&det_path, &rec_path, &charset_path, None)
            .map_err(|e| ExtractionError::Engine(format!("failed to load OCR models: {e}")))?;
        info!(
            "loaded {:?} OCR models from {}",
            language,
            models_dir.display()
        );

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
        })
    }
}

fn require(path: PathBuf) -> Result<PathBuf, ExtractionError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ExtractionError::Engine(format!(
            "model file not found: {}",
            path.display()
        )))
    }
}

#[async_trait]
impl TextExtractor for OcrRsExtractor {
    async fn recognize(
        &self,
        image: &RgbaImage,
        region: Region,
    ) -> Result<Recognition, ExtractionError> {
        let patch = DynamicImage::ImageRgba8(crop(image, region)?.to_image());
        let engine = Arc::clone(&self.engine);

        let lines = tokio::task::spawn_blocking(move || {
            let engine = engine
                .lock()
                .map_err(|_| ExtractionError::Engine("OCR engine lock poisoned".to_string()))?;
            engine
                .recognize(&patch)
                .map_err(|e| ExtractionError::Engine(e.to_string()))
        })
        .await
        .map_err(|e| ExtractionError::Engine(format!("OCR task failed: {e}")))??;

        let mut lines: Vec<_> = lines
            .into_iter()
            .filter(|line| !line.text.trim().is_empty())
            .map(|line| (line.bbox.rect.top(), line.bbox.rect.left(), line.text, line.confidence))
            .collect();
        lines.sort_by_key(|&(top, left, _, _)| (top, left));
        debug!("OCR read {} lines in {:?}", lines.len(), region);

        if lines.is_empty() {
            return Ok(Recognition::new("", 0.0));
        }

        let confidence = lines.iter().map(|line| line.3).sum::<f32>() / lines.len() as f32;
        let text = lines
            .into_iter()
            .map(|(_, _, text, _)| text)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(Recognition::new(text, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_parse_and_name_their_models() {
        assert_eq!("EN".parse::<OcrLanguage>().unwrap(), OcrLanguage::English);
        assert_eq!("latin".parse::<OcrLanguage>().unwrap().model_files().1, "ppocr_keys_latin.txt");
        assert!("klingon".parse::<OcrLanguage>().is_err());
    }

    #[test]
    fn missing_models_are_reported() {
        let error = OcrRsExtractor::from_models_dir("/nonexistent/models", OcrLanguage::English)
            .err()
            .unwrap();
        assert!(matches!(error, ExtractionError::Engine(message) if message.contains(DETECTION_MODEL)));
    }
}
