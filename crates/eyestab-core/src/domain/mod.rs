//! Core domain types for eye stabilization.

mod error;
mod frame;
mod landmarks;
mod preset;
mod report;

pub use error::{ConfigError, DetectorError, FrameError, StabilizeError};
pub use frame::{Frame, FrameSequence, LoadedFrame, Mask};
pub use landmarks::{
    mesh_indices, EyeLandmarks, FaceLandmarks, LandmarkKey, Point, Region, Side,
    LEFT_EYE_CONTOUR, LEFT_IRIS, MESH_LANDMARK_COUNT, RIGHT_EYE_CONTOUR, RIGHT_IRIS,
};
pub use preset::{resolve as resolve_preset, Population, Preset, SuppressionMode, SuppressionPolicy};
pub use report::{FrameReport, SequenceReport};
