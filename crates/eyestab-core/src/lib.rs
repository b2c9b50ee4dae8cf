//! Eyestab Core - Domain logic and the eye stabilization engine
//!
//! This crate contains the domain types, port traits, and the per-frame
//! pipeline that smooths eye landmarks, detects blinks, and enhances the
//! eye region of video frame sequences.

pub mod domain;
pub mod imaging;
pub mod ports;
pub mod stabilizer;

pub use domain::{
    ConfigError, DetectorError, EyeLandmarks, FaceLandmarks, Frame, FrameError, FrameReport,
    FrameSequence, LoadedFrame, Mask, Point, Population, Preset, Region, SequenceReport, Side,
    StabilizeError, SuppressionMode, SuppressionPolicy, MESH_LANDMARK_COUNT,
};
pub use imaging::OverlayStyle;
pub use ports::{
    collect_sequence, FrameSource, LandmarkDetector, NoopProgress, ProgressEvent, ProgressSink,
    ReportOutput,
};
pub use stabilizer::{EyeStabilizer, ResolvedParams, StabilizationOutput, StabilizerSettings};
