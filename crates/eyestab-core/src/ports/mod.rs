//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod frame_source;
mod landmark_detector;
mod progress;
mod report_output;

pub use frame_source::{collect_sequence, FrameSource};
pub use landmark_detector::LandmarkDetector;
pub use progress::{NoopProgress, ProgressEvent, ProgressSink};
pub use report_output::ReportOutput;
