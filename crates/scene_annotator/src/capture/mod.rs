//! Capture driver
//!
//! For every configuration of a sweep, in order:
//!
//! 1. apply the configuration to the scene
//! 2. render `{prefix}_{index:04}.png`
//! 3. project and encode every annotation target
//! 4. write the label file
//! 5. report progress
//!
//! A failed render or label write is logged and counted; the sweep goes on.

mod driver;
mod progress;
mod render;

#[cfg(test)]
mod tests;

pub use driver::{
    AnnotationTarget, CaptureDriver, CaptureError, CaptureOptions, CaptureRecord, CaptureSummary, StopSignal,
};
pub use progress::{ConsoleProgress, LogProgress, ProgressObserver, ProgressReport, SilentProgress};
pub use render::{CommandRenderer, FlatRenderer, Renderer};
