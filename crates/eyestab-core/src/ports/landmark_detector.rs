//! Landmark detector port.
//!
//! The engine never runs a face model itself. Anything that can turn an
//! 8-bit RGB frame into a 478-point face mesh plugs in here.

use image::RgbImage;

use crate::domain::{DetectorError, FaceLandmarks};

/// Port for facial landmark detection.
pub trait LandmarkDetector: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Checks whether the detector can be used at all.
    ///
    /// Called once per sequence before the first frame.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Unavailable`] when the detector cannot run.
    fn probe(&self) -> Result<(), DetectorError> {
        Ok(())
    }

    /// Detects the first face in a frame.
    ///
    /// `index` is the frame's position in the sequence, which lets replay
    /// detectors look up precomputed results.
    ///
    /// # Errors
    ///
    /// Returns an error if detection fails for this frame. The pipeline
    /// treats such frames as having no face.
    fn detect(&self, index: usize, frame: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError>;
}
