//! Error types surfaced by the stabilization engine.
//!
//! Only configuration and cancellation errors reach the caller of a
//! sequence run. Detector and geometry problems are absorbed per frame.

use thiserror::Error;

/// Invalid stabilizer configuration, rejected before any frame is processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Population selector outside the preset registry.
    #[error("unknown population preset '{0}'")]
    UnknownPopulation(String),

    /// Blink suppression mode outside `off`, `light`, `moderate`, `aggressive`.
    #[error("unknown blink suppression mode '{0}'")]
    UnknownSuppressionMode(String),

    /// A numeric parameter outside its accepted range.
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Name of the offending parameter.
        field: &'static str,
        /// Value that was supplied.
        value: f32,
        /// Inclusive lower bound.
        min: f32,
        /// Inclusive upper bound.
        max: f32,
    },
}

/// Problems assembling a frame sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// A frame does not share the dimensions of the first frame.
    #[error("frame {index} is {actual_width}x{actual_height}, expected {width}x{height}")]
    DimensionMismatch {
        /// Position of the offending frame.
        index: usize,
        /// Width of the first frame.
        width: u32,
        /// Height of the first frame.
        height: u32,
        /// Width of the offending frame.
        actual_width: u32,
        /// Height of the offending frame.
        actual_height: u32,
    },
}

/// Failures reported by a landmark detector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The detector cannot be used at all (missing model, missing runtime).
    #[error("landmark detector unavailable: {0}")]
    Unavailable(String),

    /// The detector produced fewer points than the face mesh convention requires.
    #[error("expected at least {expected} landmarks, got {actual}")]
    InvalidLandmarks {
        /// Minimum number of points.
        expected: usize,
        /// Number of points received.
        actual: usize,
    },

    /// Detection failed for a single frame.
    #[error("landmark detection failed: {0}")]
    Failed(String),
}

/// Errors that abort a sequence run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StabilizeError {
    /// The cancellation flag was raised between frames.
    #[error("stabilization cancelled after {processed} frame(s)")]
    Cancelled {
        /// Frames completed before the flag was observed.
        processed: usize,
    },
}
