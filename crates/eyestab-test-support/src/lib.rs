//! Test support utilities for eyestab.
//!
//! Provides mocks, synthetic frame and face mesh builders, and utilities for
//! testing the stabilization pipeline.
//!
//! # Example
//!
//! ```
//! use eyestab_test_support::{FaceLandmarksBuilder, MockLandmarkDetector, SyntheticFrameBuilder};
//!
//! // Three noise frames and a detector that always sees open eyes
//! let frames = SyntheticFrameBuilder::noise_sequence(3, 64, 64);
//! let face = FaceLandmarksBuilder::new(64, 64).with_ear(0.3).build().unwrap();
//! let detector = MockLandmarkDetector::always(face);
//! assert_eq!(frames.len(), 3);
//! assert!(detector.calls().is_empty());
//! ```

use std::path::PathBuf;

mod builders;
mod mocks;

pub use builders::{landmarks_json, FaceLandmarksBuilder, SyntheticFrameBuilder};
pub use mocks::{MockFrameSource, MockLandmarkDetector, MockProgressSink, MockReportOutput};

/// Monospace TrueType font bundled for overlay text tests (DejaVu license).
#[must_use]
pub fn font_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/DejaVuSansMono.ttf")
}
