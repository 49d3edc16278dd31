// THEORY:
// This file is the main entry point for the `calendar_vision` library crate.
// It defines the public API exposed to consumers such as the bundled command-line
// binary.
//
// The primary goal is to export the `CalendarPipeline` and its associated data
// structures (`PipelineConfig`, `ParsedCalendarData`, `CalendarEvent`, etc.) as the
// high-level interface for the whole engine: photo in, dated events out. The
// stages themselves live in `core_modules` and stay usable on their own, so region
// detection and calendar reconstruction can be driven and tested without a text
// recognition engine.

pub mod core_modules;
pub mod error;
pub mod ics;
pub mod pipeline;
