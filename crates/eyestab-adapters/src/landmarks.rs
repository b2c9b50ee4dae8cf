//! Landmark replay adapter.
//!
//! Replays face meshes exported by an external detector. The file is a JSON
//! array with one entry per frame: `null` when no face was found, otherwise
//! an array of normalized `[x, y]` pairs (a trailing `z` is ignored).

use anyhow::{bail, Context, Result};
use eyestab_core::{DetectorError, FaceLandmarks, LandmarkDetector, Point};
use image::RgbImage;
use std::path::Path;
use tracing::debug;

type RawFrame = Option<Vec<Vec<f32>>>;

/// A [`LandmarkDetector`] backed by pre-computed landmarks.
#[derive(Debug, Clone, Default)]
pub struct JsonLandmarkDetector {
    frames: Vec<Option<FaceLandmarks>>,
}

impl JsonLandmarkDetector {
    /// Loads a landmark file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read landmarks: {}", path.display()))?;
        let detector = Self::from_json(&text)
            .with_context(|| format!("Invalid landmark file: {}", path.display()))?;
        debug!(
            "Loaded landmarks for {} frames from {}",
            detector.len(),
            path.display()
        );
        Ok(detector)
    }

    /// Parses landmark JSON.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, on a point with fewer than two coordinates,
    /// and on any frame with fewer than 478 points.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: Vec<RawFrame> = serde_json::from_str(text).context("Malformed landmark JSON")?;
        let frames = raw
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry
                    .map(|points| parse_face(index, points))
                    .transpose()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { frames })
    }

    /// Number of frames in the file.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the file held no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn parse_face(index: usize, points: Vec<Vec<f32>>) -> Result<FaceLandmarks> {
    let points = points
        .into_iter()
        .enumerate()
        .map(|(i, coords)| match coords.as_slice() {
            [x, y, ..] => Ok(Point::new(*x, *y)),
            _ => bail!("frame {index}: point {i} needs x and y"),
        })
        .collect::<Result<Vec<_>>>()?;
    FaceLandmarks::new(points).with_context(|| format!("frame {index}"))
}

impl LandmarkDetector for JsonLandmarkDetector {
    fn name(&self) -> &str {
        "json-replay"
    }

    fn probe(&self) -> Result<(), DetectorError> {
        if self.frames.is_empty() {
            return Err(DetectorError::Unavailable(
                "landmark file contains no frames".into(),
            ));
        }
        Ok(())
    }

    fn detect(&self, index: usize, _frame: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError> {
        let face = self.frames.get(index).cloned().flatten();
        if face.is_none() {
            debug!("No landmarks recorded for frame {index}");
        }
        Ok(face)
    }
}
