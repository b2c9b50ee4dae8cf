//! Synthetic frame and landmark builders for testing.

#![allow(clippy::cast_precision_loss)]

use eyestab_core::domain::{
    mesh_indices, DetectorError, FaceLandmarks, Frame, FrameSequence, LoadedFrame, Point, Region,
    Side, MESH_LANDMARK_COUNT,
};
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Builder for synthetic video frames.
pub struct SyntheticFrameBuilder;

impl SyntheticFrameBuilder {
    /// Uniform random noise, reproducible from `seed`.
    #[must_use]
    pub fn noise(width: u32, height: u32, seed: u64) -> Frame {
        let mut rng = StdRng::seed_from_u64(seed);
        Frame::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
    }

    /// A single flat color.
    #[must_use]
    pub fn uniform(width: u32, height: u32, rgb: [f32; 3]) -> Frame {
        Frame::from_pixel(width, height, Rgb(rgb))
    }

    /// Horizontal luminance ramp.
    #[must_use]
    pub fn gradient(width: u32, height: u32) -> Frame {
        let w = width.max(1) as f32;
        Frame::from_fn(width, height, |x, _| {
            let v = x as f32 / w;
            Rgb([v, v, v])
        })
    }

    /// An 8-bit noise image, for writing to disk.
    #[must_use]
    pub fn noise_rgb8(width: u32, height: u32, seed: u64) -> RgbImage {
        let mut rng = StdRng::seed_from_u64(seed);
        RgbImage::from_fn(width, height, |_, _| Rgb([rng.gen(), rng.gen(), rng.gen()]))
    }

    /// `count` noise frames with distinct seeds.
    #[must_use]
    pub fn noise_sequence(count: usize, width: u32, height: u32) -> FrameSequence {
        Self::sequence((0..count as u64).map(|seed| Self::noise(width, height, seed)).collect())
    }

    /// `count` copies of a uniform gray frame.
    #[must_use]
    pub fn gray_sequence(count: usize, width: u32, height: u32) -> FrameSequence {
        Self::sequence(vec![Self::uniform(width, height, [0.5; 3]); count])
    }

    fn sequence(frames: Vec<Frame>) -> FrameSequence {
        // Every frame above shares one size, so construction cannot fail
        FrameSequence::new(frames).unwrap_or_default()
    }

    /// Tags a frame with a synthetic path.
    #[must_use]
    pub fn loaded(name: &str, frame: Frame) -> LoadedFrame {
        LoadedFrame {
            path: format!("synthetic://{name}"),
            frame,
        }
    }
}

/// Horizontal extent of each synthetic eye, as a fraction of frame width.
const EYE_WIDTH: f32 = 0.2;
/// Iris radius, as a fraction of frame width.
const IRIS_RADIUS: f32 = 0.02;

/// Builder for a 478-point face mesh with controllable eye openness.
///
/// Eye geometry is laid out so that, once converted to pixels for the
/// configured frame size, each contour has the requested EAR (up to pixel
/// truncation).
#[derive(Debug, Clone)]
pub struct FaceLandmarksBuilder {
    width: u32,
    height: u32,
    points: Vec<Point>,
}

impl FaceLandmarksBuilder {
    /// A face for frames of the given size, with both eyes at EAR 0.3.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: vec![Point::new(0.5, 0.6); MESH_LANDMARK_COUNT],
        }
        .with_ear(0.3)
    }

    /// Sets the EAR of both eyes.
    #[must_use]
    pub fn with_ear(self, ear: f32) -> Self {
        self.with_eye_ear(Side::Left, ear).with_eye_ear(Side::Right, ear)
    }

    /// Sets the EAR of one eye and re-centres its iris.
    #[must_use]
    pub fn with_eye_ear(mut self, side: Side, ear: f32) -> Self {
        let (cx, cy) = Self::eye_center(side);
        let aspect = self.width as f32 / self.height.max(1) as f32;
        let half_open = ear * EYE_WIDTH * aspect / 2.0;
        let (hw, sw) = (EYE_WIDTH / 2.0, EYE_WIDTH / 6.0);

        let contour = [
            (cx - hw, cy),
            (cx - sw, cy - half_open),
            (cx + sw, cy - half_open),
            (cx + hw, cy),
            (cx + sw, cy + half_open),
            (cx - sw, cy + half_open),
        ];
        for (&slot, (x, y)) in mesh_indices(side, Region::Contour).iter().zip(contour) {
            self.points[slot] = Point::new(x, y);
        }

        let r = IRIS_RADIUS;
        let ry = r * aspect;
        let iris = [(cx, cy), (cx + r, cy), (cx, cy - ry), (cx - r, cy), (cx, cy + ry)];
        for (&slot, (x, y)) in mesh_indices(side, Region::Iris).iter().zip(iris) {
            self.points[slot] = Point::new(x, y);
        }
        self
    }

    /// Shifts every point by a normalized offset.
    #[must_use]
    pub fn shifted(mut self, dx: f32, dy: f32) -> Self {
        for p in &mut self.points {
            p.x += dx;
            p.y += dy;
        }
        self
    }

    const fn eye_center(side: Side) -> (f32, f32) {
        match side {
            Side::Left => (0.3, 0.45),
            Side::Right => (0.7, 0.45),
        }
    }

    /// The raw normalized points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Builds the face mesh.
    ///
    /// # Errors
    ///
    /// Never fails for builder-produced meshes; the signature mirrors
    /// [`FaceLandmarks::new`].
    pub fn build(self) -> Result<FaceLandmarks, DetectorError> {
        FaceLandmarks::new(self.points)
    }

    /// The mesh as a JSON array of `[x, y]` pairs.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.points
                .iter()
                .map(|p| serde_json::json!([p.x, p.y]))
                .collect(),
        )
    }
}

/// Serializes per-frame faces into the landmark replay format.
///
/// `None` entries become `null` (no face in that frame).
#[must_use]
pub fn landmarks_json(frames: &[Option<FaceLandmarksBuilder>]) -> String {
    let entries: Vec<Value> = frames
        .iter()
        .map(|f| f.as_ref().map_or(Value::Null, FaceLandmarksBuilder::to_json))
        .collect();
    Value::Array(entries).to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use eyestab_core::stabilizer::calculate_ear;

    #[test]
    fn test_noise_is_reproducible() {
        assert_eq!(
            SyntheticFrameBuilder::noise(8, 8, 7),
            SyntheticFrameBuilder::noise(8, 8, 7)
        );
        assert_ne!(
            SyntheticFrameBuilder::noise(8, 8, 7),
            SyntheticFrameBuilder::noise(8, 8, 8)
        );
    }

    #[test]
    fn test_noise_sequence_shape() {
        let seq = SyntheticFrameBuilder::noise_sequence(3, 16, 12);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.dimensions(), Some((16, 12)));
    }

    #[test]
    fn test_face_ear_matches_request() {
        let face = FaceLandmarksBuilder::new(200, 100)
            .with_eye_ear(Side::Left, 0.3)
            .with_eye_ear(Side::Right, 0.1)
            .build()
            .expect("mesh should be complete");
        let eyes = face.eyes(200, 100);

        assert!((calculate_ear(&eyes.left_contour) - 0.3).abs() < 0.03);
        assert!((calculate_ear(&eyes.right_contour) - 0.1).abs() < 0.03);
    }

    #[test]
    fn test_landmarks_json_shape() {
        let json = landmarks_json(&[Some(FaceLandmarksBuilder::new(64, 64)), None]);
        let value: Value = serde_json::from_str(&json).expect("valid json");
        let frames = value.as_array().expect("array");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_array().map(Vec::len), Some(MESH_LANDMARK_COUNT));
        assert!(frames[1].is_null());
    }
}
