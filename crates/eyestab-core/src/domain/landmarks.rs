//! Facial landmark types and the face mesh index convention.
//!
//! Detectors return normalized coordinates for the full 478-point face mesh
//! (468 face points plus 10 refined iris points). Only the eye contours and
//! irises are consumed here.

// Pixel conversion truncates towards zero
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use super::DetectorError;

/// Number of points a face mesh with refined iris must provide.
pub const MESH_LANDMARK_COUNT: usize = 478;

/// Left eye contour, ordered p1..p6 for the EAR formula.
pub const LEFT_EYE_CONTOUR: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye contour, ordered p1..p6 for the EAR formula.
pub const RIGHT_EYE_CONTOUR: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Left iris: center followed by four boundary points.
pub const LEFT_IRIS: [usize; 5] = [468, 469, 470, 471, 472];

/// Right iris: center followed by four boundary points.
pub const RIGHT_IRIS: [usize; 5] = [473, 474, 475, 476, 477];

/// A 2D point, either normalized `[0, 1]` or in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Which eye a landmark belongs to (subject's perspective as in the mesh).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left eye.
    Left,
    /// Right eye.
    Right,
}

/// Which part of the eye a landmark belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Six-point eyelid contour.
    Contour,
    /// Five-point iris.
    Iris,
}

/// Identity of a single tracked landmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LandmarkKey {
    /// Eye side.
    pub side: Side,
    /// Eye region.
    pub region: Region,
    /// Position within the region (0..6 for contours, 0..5 for irises).
    pub index: usize,
}

/// Mesh indices for one eye region.
#[must_use]
pub const fn mesh_indices(side: Side, region: Region) -> &'static [usize] {
    match (side, region) {
        (Side::Left, Region::Contour) => &LEFT_EYE_CONTOUR,
        (Side::Right, Region::Contour) => &RIGHT_EYE_CONTOUR,
        (Side::Left, Region::Iris) => &LEFT_IRIS,
        (Side::Right, Region::Iris) => &RIGHT_IRIS,
    }
}

/// A full face mesh as returned by a detector, in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    /// Wraps a detector result.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidLandmarks`] when fewer than
    /// [`MESH_LANDMARK_COUNT`] points are supplied.
    pub fn new(points: Vec<Point>) -> Result<Self, DetectorError> {
        if points.len() < MESH_LANDMARK_COUNT {
            return Err(DetectorError::InvalidLandmarks {
                expected: MESH_LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// All normalized points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Extracts both eyes in pixel space for a frame of the given size.
    #[must_use]
    pub fn eyes(&self, width: u32, height: u32) -> EyeLandmarks {
        let region = |side, region| {
            mesh_indices(side, region)
                .iter()
                .map(|&i| {
                    let p = self.points[i];
                    Point::new(
                        (p.x * width as f32).trunc(),
                        (p.y * height as f32).trunc(),
                    )
                })
                .collect()
        };

        EyeLandmarks {
            left_contour: region(Side::Left, Region::Contour),
            right_contour: region(Side::Right, Region::Contour),
            left_iris: region(Side::Left, Region::Iris),
            right_iris: region(Side::Right, Region::Iris),
        }
    }
}

/// Pixel-space eye landmarks for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EyeLandmarks {
    /// Left eyelid contour, p1..p6.
    pub left_contour: Vec<Point>,
    /// Right eyelid contour, p1..p6.
    pub right_contour: Vec<Point>,
    /// Left iris points.
    pub left_iris: Vec<Point>,
    /// Right iris points.
    pub right_iris: Vec<Point>,
}

impl EyeLandmarks {
    /// Borrow one region.
    #[must_use]
    pub fn region(&self, side: Side, region: Region) -> &[Point] {
        match (side, region) {
            (Side::Left, Region::Contour) => &self.left_contour,
            (Side::Right, Region::Contour) => &self.right_contour,
            (Side::Left, Region::Iris) => &self.left_iris,
            (Side::Right, Region::Iris) => &self.right_iris,
        }
    }

    /// Mutably borrow one region.
    pub fn region_mut(&mut self, side: Side, region: Region) -> &mut Vec<Point> {
        match (side, region) {
            (Side::Left, Region::Contour) => &mut self.left_contour,
            (Side::Right, Region::Contour) => &mut self.right_contour,
            (Side::Left, Region::Iris) => &mut self.left_iris,
            (Side::Right, Region::Iris) => &mut self.right_iris,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let d = Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0));
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_short_landmark_set_rejected() {
        let err = FaceLandmarks::new(vec![Point::default(); 468]).err();
        assert_eq!(
            err,
            Some(DetectorError::InvalidLandmarks {
                expected: 478,
                actual: 468
            })
        );
    }

    #[test]
    fn test_eyes_pixel_conversion_truncates() {
        let mut points = vec![Point::default(); MESH_LANDMARK_COUNT];
        points[33] = Point::new(0.259, 0.5);
        points[473] = Point::new(0.999, 0.001);
        let face = FaceLandmarks::new(points);
        assert!(face.is_ok());
        let Ok(face) = face else { return };

        let eyes = face.eyes(100, 50);
        assert_eq!(eyes.left_contour.len(), 6);
        assert_eq!(eyes.right_contour.len(), 6);
        assert_eq!(eyes.left_iris.len(), 5);
        assert_eq!(eyes.right_iris.len(), 5);
        assert_eq!(eyes.left_contour[0], Point::new(25.0, 25.0));
        assert_eq!(eyes.right_iris[0], Point::new(99.0, 0.0));
    }

    #[test]
    fn test_mesh_indices_cover_regions() {
        assert_eq!(mesh_indices(Side::Left, Region::Contour)[0], 33);
        assert_eq!(mesh_indices(Side::Right, Region::Contour)[3], 263);
        assert_eq!(mesh_indices(Side::Left, Region::Iris).len(), 5);
        assert_eq!(mesh_indices(Side::Right, Region::Iris)[4], 477);
    }
}
