// THEORY:
// The `pipeline` module is the top-level API for the whole engine. It strings the
// stages together into one call: a calendar photo goes in, dated events come out.
//
// Key architectural principles:
// 1.  **Validate First**: The requested (year, month) is checked before a single pixel
//     is read, so a bad call costs nothing.
// 2.  **Synchronous Core, Async Edge**: Region detection and reconstruction are plain
//     functions. The only `await` is text recognition, which runs once per region
//     with a bounded fan-out.
// 3.  **Order-Free Fan-Out**: Recognition results are collected in completion order.
//     The reconstructor rebuilds reading order from geometry, so nothing here has
//     to preserve it.
// 4.  **Absorb Per-Region Failure**: A region whose recognition fails, comes back
//     empty or falls under the confidence floor is logged and dropped. It never
//     aborts the run.

use crate::core_modules::calendar_event::YearMonth;
use crate::core_modules::calendar_reconstructor::reconstruct;
use crate::core_modules::pixel::pixel::MarkerColor;
use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::core_modules::region_detector::region_detector;
use crate::core_modules::text_extractor::{Recognition, TextExtractor};
use crate::error::{BufferError, ConfigError, ExtractionError, PipelineError};
use futures::{future, stream, StreamExt};
use image::RgbaImage;
use log::{debug, info, warn};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

// Re-export key data structures for the public API.
pub use crate::core_modules::calendar_event::{CalendarEvent, CalendarMode, ParsedCalendarData};
pub use crate::core_modules::fragment::RecognizedFragment;
pub use crate::core_modules::region::Region;

/// Prefix shared by every environment variable `PipelineConfig::from_env` reads.
pub const ENV_PREFIX: &str = "CALVIS_";

/// Tunable behavior of the `CalendarPipeline`.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Marks narrower than this are treated as noise.
    pub min_region_width: u32,
    /// Marks shorter than this are treated as noise.
    pub min_region_height: u32,
    /// Seed-scan step of the region detector; clamped to the minimum region size.
    pub scan_stride: u32,
    /// Recognitions below this confidence are dropped.
    pub min_confidence: f32,
    /// Upper bound on recognition calls in flight at once.
    pub max_concurrent_extractions: usize,
    /// What counts as marker ink.
    pub marker: MarkerColor,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_region_width: 6,
            min_region_height: 6,
            scan_stride: region_detector::DEFAULT_SCAN_STRIDE,
            min_confidence: 0.0,
            max_concurrent_extractions: num_cpus::get(),
            marker: MarkerColor::default(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with any `CALVIS_*` variables set in the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with the values `lookup` returns for `CALVIS_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        overlay(&lookup, "MIN_REGION_WIDTH", &mut config.min_region_width)?;
        overlay(&lookup, "MIN_REGION_HEIGHT", &mut config.min_region_height)?;
        overlay(&lookup, "SCAN_STRIDE", &mut config.scan_stride)?;
        overlay(&lookup, "MIN_CONFIDENCE", &mut config.min_confidence)?;
        overlay(&lookup, "MAX_CONCURRENCY", &mut config.max_concurrent_extractions)?;
        overlay(&lookup, "HUE_TOLERANCE", &mut config.marker.hue_tolerance)?;
        overlay(&lookup, "MIN_SATURATION", &mut config.marker.min_saturation)?;
        overlay(&lookup, "MIN_VALUE", &mut config.marker.min_value)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, value: String, reason: &str| ConfigError {
            key: format!("{ENV_PREFIX}{key}"),
            value,
            reason: reason.to_string(),
        };

        if self.min_region_width == 0 {
            return Err(invalid("MIN_REGION_WIDTH", "0".into(), "must be at least 1"));
        }
        if self.min_region_height == 0 {
            return Err(invalid("MIN_REGION_HEIGHT", "0".into(), "must be at least 1"));
        }
        if self.scan_stride == 0 {
            return Err(invalid("SCAN_STRIDE", "0".into(), "must be at least 1"));
        }
        if self.max_concurrent_extractions == 0 {
            return Err(invalid("MAX_CONCURRENCY", "0".into(), "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(invalid(
                "MIN_CONFIDENCE",
                self.min_confidence.to_string(),
                "must be between 0 and 1",
            ));
        }
        if !(0.0..=180.0).contains(&self.marker.hue_tolerance) {
            return Err(invalid(
                "HUE_TOLERANCE",
                self.marker.hue_tolerance.to_string(),
                "must be between 0 and 180 degrees",
            ));
        }
        for (key, value) in [
            ("MIN_SATURATION", self.marker.min_saturation),
            ("MIN_VALUE", self.marker.min_value),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, value.to_string(), "must be between 0 and 1"));
            }
        }
        Ok(())
    }
}

fn overlay<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let key = format!("{ENV_PREFIX}{key}");
    let Some(raw) = lookup(&key) else {
        return Ok(());
    };
    *target = raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// Finds the marked regions of `image` using the thresholds in `config`.
pub fn detect_regions(config: &PipelineConfig, image: &RgbaImage) -> Vec<Region> {
    let marker = config.marker;
    region_detector::detect_with_stride(
        &PixelBuffer::from(image),
        |red, green, blue| marker.matches(red, green, blue),
        config.min_region_width,
        config.min_region_height,
        config.scan_stride,
    )
}

/// The main, top-level struct for the calendar engine.
pub struct CalendarPipeline {
    config: PipelineConfig,
    extractor: Arc<dyn TextExtractor>,
}

impl CalendarPipeline {
    pub fn new(config: PipelineConfig, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { config, extractor }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detect_regions(&self, image: &RgbaImage) -> Vec<Region> {
        detect_regions(&self.config, image)
    }

    /// Recognizes every region concurrently, keeping only usable text.
    ///
    /// The result is in completion order, not region order.
    pub async fn extract_fragments(
        &self,
        image: &RgbaImage,
        regions: &[Region],
    ) -> Vec<RecognizedFragment> {
        let extractor = &self.extractor;
        stream::iter(regions.iter().copied())
            .map(|region| async move { (region, extractor.recognize(image, region).await) })
            .buffer_unordered(self.config.max_concurrent_extractions.max(1))
            .filter_map(|(region, result)| future::ready(self.accept(region, result)))
            .collect()
            .await
    }

    fn accept(
        &self,
        region: Region,
        result: Result<Recognition, ExtractionError>,
    ) -> Option<RecognizedFragment> {
        let recognition = match result {
            Ok(recognition) => recognition,
            Err(e) => {
                warn!("text recognition failed for {region:?}: {e}");
                return None;
            }
        };

        let text = recognition.text.trim();
        if text.is_empty() {
            debug!("dropping {region:?}: no text");
            return None;
        }
        if recognition.confidence < self.config.min_confidence {
            debug!(
                "dropping {region:?}: confidence {:.2} below {:.2}",
                recognition.confidence, self.config.min_confidence
            );
            return None;
        }
        Some(RecognizedFragment::new(text, region, recognition.confidence))
    }

    /// Runs detection, recognition and reconstruction on one calendar photo.
    pub async fn process_image(
        &self,
        image: &RgbaImage,
        year: i32,
        month: u32,
        mode: CalendarMode,
    ) -> Result<ParsedCalendarData, PipelineError> {
        let requested = YearMonth::new(year, month)?;

        let regions = self.detect_regions(image);
        let fragments = self.extract_fragments(image, &regions).await;
        let data = reconstruct(&fragments, year, month, mode)?;

        info!(
            "{requested}: {} marked regions, {} fragments, {} events",
            regions.len(),
            fragments.len(),
            data.events.len()
        );
        Ok(data)
    }

    /// `process_image` over a raw RGBA sample array.
    pub async fn process_samples(
        &self,
        width: u32,
        height: u32,
        samples: Vec<u8>,
        year: i32,
        month: u32,
        mode: CalendarMode,
    ) -> Result<ParsedCalendarData, PipelineError> {
        YearMonth::new(year, month)?;
        PixelBuffer::new(width, height, &samples)?;

        let actual = samples.len();
        let image = RgbaImage::from_raw(width, height, samples).ok_or(
            BufferError::LengthMismatch {
                width,
                height,
                expected: width as usize * height as usize * 4,
                actual,
            },
        )?;
        self.process_image(&image, year, month, mode).await
    }

    /// Decodes the image at `path` and runs `process_image` on it.
    pub async fn process_path(
        &self,
        path: impl AsRef<Path>,
        year: i32,
        month: u32,
        mode: CalendarMode,
    ) -> Result<ParsedCalendarData, PipelineError> {
        YearMonth::new(year, month)?;

        let path = path.as_ref();
        debug!("loading {}", path.display());
        let image = image::open(path)?.to_rgba8();
        self.process_image(&image, year, month, mode).await
    }
}
