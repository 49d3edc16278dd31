//! Command-line front end for `calendar_vision`.
//!
//! ```bash
//! # Where are the red marks?
//! calendar_vision detect march.jpg
//!
//! # Rebuild events from fragments recognized elsewhere
//! calendar_vision reconstruct fragments.json --year 2024 --month 3 --format ics
//!
//! # Full run with the bundled PaddleOCR backend (feature `ocr`)
//! calendar_vision scan march.jpg --year 2024 --month 3 --models-dir ./models
//! ```
//!
//! Thresholds default to the `CALVIS_*` environment variables, then to built-in
//! values; flags override both. Logging follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use calendar_vision::core_modules::calendar_reconstructor::reconstruct;
use calendar_vision::ics;
use calendar_vision::pipeline::{
    detect_regions, CalendarMode, ParsedCalendarData, PipelineConfig, RecognizedFragment,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calendar_vision")]
#[command(version, about = "Turn a photo of a marked-up calendar into events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merged bounding boxes of red marks as JSON
    Detect {
        image: PathBuf,

        #[command(flatten)]
        detection: DetectionArgs,
    },

    /// Rebuild dated events from a JSON array of recognized fragments
    Reconstruct {
        fragments: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Detect, recognize and reconstruct in one go
    #[cfg(feature = "ocr")]
    Scan {
        image: PathBuf,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        detection: DetectionArgs,

        /// Directory holding the PaddleOCR `.mnn` models and charsets
        #[arg(long, default_value = "models")]
        models_dir: PathBuf,

        /// Recognition model family: english, latin or chinese
        #[arg(long, default_value = "english")]
        language: calendar_vision::core_modules::ocr_engine::OcrLanguage,

        /// Drop recognitions below this confidence (0..1)
        #[arg(long)]
        min_confidence: Option<f32>,

        /// Maximum recognition calls in flight
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

/// The month to read the calendar against, and how to print it.
#[derive(Args, Debug)]
struct TargetArgs {
    /// Four-digit year shown on the calendar
    #[arg(long)]
    year: i32,

    /// Month shown on the calendar (1-12)
    #[arg(long)]
    month: u32,

    /// standard or shift-tracking
    #[arg(long, default_value = "standard")]
    mode: CalendarMode,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

/// Overrides for the region detector.
#[derive(Args, Debug)]
struct DetectionArgs {
    /// Minimum mark width in pixels
    #[arg(long)]
    min_width: Option<u32>,

    /// Minimum mark height in pixels
    #[arg(long)]
    min_height: Option<u32>,

    /// Seed-scan stride in pixels
    #[arg(long)]
    stride: Option<u32>,

    /// Accepted distance from pure red, in degrees
    #[arg(long)]
    hue_tolerance: Option<f32>,
}

impl DetectionArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(width) = self.min_width {
            config.min_region_width = width;
        }
        if let Some(height) = self.min_height {
            config.min_region_height = height;
        }
        if let Some(stride) = self.stride {
            config.scan_stride = stride;
        }
        if let Some(tolerance) = self.hue_tolerance {
            config.marker.hue_tolerance = tolerance;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Ics,
}

fn print_calendar(data: &ParsedCalendarData, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Ics => print!("{}", ics::to_ical(data, chrono::Utc::now().naive_utc())),
    }
    Ok(())
}

fn load_config(detection: &DetectionArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env().context("invalid CALVIS_* environment")?;
    detection.apply(&mut config);
    config.validate().context("invalid detection flags")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect { image, detection } => {
            let config = load_config(&detection)?;
            let picture = image::open(&image)
                .with_context(|| format!("failed to open {}", image.display()))?
                .to_rgba8();
            let regions = detect_regions(&config, &picture);
            println!("{}", serde_json::to_string_pretty(&regions)?);
        }

        Command::Reconstruct { fragments: path, target } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let fragments: Vec<RecognizedFragment> = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a fragment array", path.display()))?;
            let data = reconstruct(&fragments, target.year, target.month, target.mode)?;
            print_calendar(&data, target.format)?;
        }

        #[cfg(feature = "ocr")]
        Command::Scan {
            image,
            target,
            detection,
            models_dir,
            language,
            min_confidence,
            concurrency,
        } => {
            use calendar_vision::core_modules::ocr_engine::OcrRsExtractor;
            use calendar_vision::pipeline::CalendarPipeline;
            use std::sync::Arc;

            let mut config = load_config(&detection)?;
            if let Some(min_confidence) = min_confidence {
                config.min_confidence = min_confidence;
            }
            if let Some(concurrency) = concurrency {
                config.max_concurrent_extractions = concurrency;
            }
            config.validate().context("invalid scan flags")?;

            let extractor = OcrRsExtractor::from_models_dir(&models_dir, language)
                .with_context(|| format!("failed to load models from {}", models_dir.display()))?;
            let pipeline = CalendarPipeline::new(config, Arc::new(extractor));
            let data = pipeline
                .process_path(&image, target.year, target.month, target.mode)
                .await
                .with_context(|| format!("failed to scan {}", image.display()))?;
            print_calendar(&data, target.format)?;
        }
    }

    Ok(())
}
