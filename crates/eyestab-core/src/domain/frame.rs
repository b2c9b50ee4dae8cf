//! Frame and mask containers.

use image::{DynamicImage, ImageBuffer, Luma, Rgb32FImage};

use super::FrameError;

/// A single RGB video frame with channel values in `[0, 1]`.
pub type Frame = Rgb32FImage;

/// A single-channel mask with values in `[0, 1]`, same size as its frame.
pub type Mask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A frame decoded from some source, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedFrame {
    /// Origin of the frame (file path or synthetic tag).
    pub path: String,
    /// Decoded pixel data.
    pub frame: Frame,
}

impl LoadedFrame {
    /// Wraps a decoded image, converting it to a floating-point RGB frame.
    #[must_use]
    pub fn new(path: impl Into<String>, image: &DynamicImage) -> Self {
        Self {
            path: path.into(),
            frame: image.to_rgb32f(),
        }
    }
}

/// An ordered sequence of equally sized frames.
///
/// The sequence is never mutated by processing; every output is a new frame.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Builds a sequence, rejecting frames whose size differs from the first.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::DimensionMismatch`] for the first frame whose
    /// dimensions differ from frame 0.
    pub fn new(frames: Vec<Frame>) -> Result<Self, FrameError> {
        if let Some(first) = frames.first() {
            let (width, height) = first.dimensions();
            for (index, frame) in frames.iter().enumerate().skip(1) {
                let (actual_width, actual_height) = frame.dimensions();
                if (actual_width, actual_height) != (width, height) {
                    return Err(FrameError::DimensionMismatch {
                        index,
                        width,
                        height,
                        actual_width,
                        actual_height,
                    });
                }
            }
        }
        Ok(Self { frames })
    }

    /// Builds a sequence from decoded images of any pixel format.
    ///
    /// # Errors
    ///
    /// See [`FrameSequence::new`].
    pub fn from_images<'a>(
        images: impl IntoIterator<Item = &'a DynamicImage>,
    ) -> Result<Self, FrameError> {
        Self::new(images.into_iter().map(DynamicImage::to_rgb32f).collect())
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the sequence holds no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Width and height shared by every frame, if any.
    #[must_use]
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frames.first().map(Frame::dimensions)
    }

    /// Borrow the frames in order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate over the frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sequence() {
        let seq = FrameSequence::new(vec![]);
        assert!(seq.is_ok_and(|s| s.is_empty() && s.dimensions().is_none()));
    }

    #[test]
    fn test_uniform_dimensions_accepted() {
        let frames = vec![Frame::new(16, 8), Frame::new(16, 8), Frame::new(16, 8)];
        let seq = FrameSequence::new(frames);
        assert!(seq.is_ok_and(|s| s.len() == 3 && s.dimensions() == Some((16, 8))));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let frames = vec![Frame::new(16, 8), Frame::new(16, 8), Frame::new(8, 8)];
        let err = FrameSequence::new(frames).err();
        assert_eq!(
            err,
            Some(FrameError::DimensionMismatch {
                index: 2,
                width: 16,
                height: 8,
                actual_width: 8,
                actual_height: 8,
            })
        );
    }

    #[test]
    fn test_from_images_converts_to_float() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            4,
            4,
            image::Rgb([255, 0, 0]),
        ));
        let seq = FrameSequence::from_images([&img]);
        assert!(seq.is_ok_and(|s| {
            let px = s.frames()[0].get_pixel(0, 0);
            (px.0[0] - 1.0).abs() < 1e-6 && px.0[1].abs() < 1e-6
        }));
    }
}
