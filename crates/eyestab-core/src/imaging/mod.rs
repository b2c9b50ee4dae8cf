//! Raster operations on 8-bit frames.
//!
//! The stabilizer works on 8-bit RGB internally, mirroring how detectors and
//! image filters expect their input, and converts back to floating point at
//! the sequence boundary.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]

mod enhance;
mod mask;
mod overlay;

pub use enhance::{adjust_contrast, adjust_sharpness, blend_masked, enhance_eyes, sharpen, smooth};
pub use mask::eye_mask;
pub use overlay::{draw_overlay, OverlayStyle};

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::domain::{Frame, Mask};

/// Absorbs f32 error so 8-bit values survive a round trip through [`to_frame`].
const QUANT_EPSILON: f32 = 1e-3;

/// Quantizes a float frame to 8 bits, truncating like a `uint8` cast.
#[must_use]
pub fn to_rgb8(frame: &Frame) -> RgbImage {
    let (width, height) = frame.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Rgb(px) = *frame.get_pixel(x, y);
        Rgb(px.map(|c| (c.clamp(0.0, 1.0) * 255.0 + QUANT_EPSILON) as u8))
    })
}

/// Expands an 8-bit image to a float frame in `[0, 1]`.
#[must_use]
pub fn to_frame(image: &RgbImage) -> Frame {
    let (width, height) = image.dimensions();
    Frame::from_fn(width, height, |x, y| {
        let Rgb(px) = *image.get_pixel(x, y);
        Rgb(px.map(|c| f32::from(c) / 255.0))
    })
}

/// Expands an 8-bit mask to a float mask in `[0, 1]`.
#[must_use]
pub fn to_mask(gray: &GrayImage) -> Mask {
    let (width, height) = gray.dimensions();
    Mask::from_fn(width, height, |x, y| Luma([f32::from(gray.get_pixel(x, y).0[0]) / 255.0]))
}

/// Quantizes a float mask to 8 bits for storage.
#[must_use]
pub fn mask_to_gray(mask: &Mask) -> GrayImage {
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([(mask.get_pixel(x, y).0[0].clamp(0.0, 1.0) * 255.0).round() as u8])
    })
}
