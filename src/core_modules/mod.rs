pub mod calendar_event;
pub mod calendar_reconstructor;
pub mod event_text;
pub mod fragment;
pub mod month_tracker;
#[cfg(feature = "ocr")]
pub mod ocr_engine;
pub mod pixel;
pub mod pixel_buffer;
pub mod region;
pub mod region_detector;
pub mod text_extractor;
pub mod week_rows;
