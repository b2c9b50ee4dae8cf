//! Sharpening, contrast and masked blending.
//!
//! The 3x3 filters copy border pixels through unchanged. Enhancement
//! factors interpolate (or extrapolate, above 1) between a degenerate image
//! and the source: `out = degenerate + factor * (source - degenerate)`.

use image::{GrayImage, Rgb, RgbImage};

/// Sharpening kernel: strong center, negative neighbours, sum 16.
const SHARPEN: [i32; 9] = [-2, -2, -2, -2, 32, -2, -2, -2, -2];
const SHARPEN_SCALE: i32 = 16;

/// Mild blur used as the degenerate image for sharpness adjustment.
const SMOOTH: [i32; 9] = [1, 1, 1, 1, 5, 1, 1, 1, 1];
const SMOOTH_SCALE: i32 = 13;

/// Contrast factor of the extra pass for presets that boost contrast.
pub const POST_CONTRAST: f32 = 1.1;

fn clip8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn convolve3x3(image: &RgbImage, kernel: &[i32; 9], scale: i32) -> RgbImage {
    let (width, height) = image.dimensions();
    let mut out = image.clone();
    if width < 3 || height < 3 {
        return out;
    }

    let scale = scale as f32;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut acc = [0i32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let px = image.get_pixel(x + k as u32 % 3 - 1, y + k as u32 / 3 - 1);
                for (sum, &c) in acc.iter_mut().zip(&px.0) {
                    *sum += weight * i32::from(c);
                }
            }
            out.put_pixel(x, y, Rgb(acc.map(|sum| clip8(sum as f32 / scale))));
        }
    }
    out
}

fn interpolate(degenerate: &RgbImage, source: &RgbImage, factor: f32) -> RgbImage {
    let mut out = source.clone();
    for ((o, d), s) in out.pixels_mut().zip(degenerate.pixels()).zip(source.pixels()) {
        for c in 0..3 {
            let d = f32::from(d.0[c]);
            o.0[c] = clip8(d + factor * (f32::from(s.0[c]) - d));
        }
    }
    out
}

/// Applies the 3x3 sharpening kernel.
#[must_use]
pub fn sharpen(image: &RgbImage) -> RgbImage {
    convolve3x3(image, &SHARPEN, SHARPEN_SCALE)
}

/// Applies the 3x3 smoothing kernel.
#[must_use]
pub fn smooth(image: &RgbImage) -> RgbImage {
    convolve3x3(image, &SMOOTH, SMOOTH_SCALE)
}

/// Adjusts sharpness: 0 is smoothed, 1 is the original, above 1 sharpens.
#[must_use]
pub fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    interpolate(&smooth(image), image, factor)
}

/// Adjusts contrast around the rounded mean luma.
#[must_use]
pub fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let pixels = u64::from(image.width()) * u64::from(image.height());
    if pixels == 0 {
        return image.clone();
    }

    let luma_sum: u64 = image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0.map(u64::from);
            (r * 299 + g * 587 + b * 114 + 500) / 1000
        })
        .sum();
    let mean = ((luma_sum as f64 / pixels as f64) + 0.5).floor() as u8;

    let degenerate = RgbImage::from_pixel(image.width(), image.height(), Rgb([mean; 3]));
    interpolate(&degenerate, image, factor)
}

/// Blends `enhanced` over `original` using the mask as per-pixel alpha.
///
/// The result is truncated to 8 bits.
#[must_use]
pub fn blend_masked(original: &RgbImage, enhanced: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut out = original.clone();
    for ((o, e), m) in out.pixels_mut().zip(enhanced.pixels()).zip(mask.pixels()) {
        let alpha = f32::from(m.0[0]) / 255.0;
        for c in 0..3 {
            let blended = f32::from(e.0[c]) * alpha + f32::from(o.0[c]) * (1.0 - alpha);
            o.0[c] = blended.clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Sharpens the eye region of a frame.
///
/// The whole frame is sharpened, sharpness-adjusted by `strength`, optionally
/// contrast-boosted, and then blended back through the mask.
#[must_use]
pub fn enhance_eyes(frame: &RgbImage, mask: &GrayImage, strength: f32, boost_contrast: bool) -> RgbImage {
    let mut enhanced = adjust_sharpness(&sharpen(frame), strength);
    if boost_contrast {
        enhanced = adjust_contrast(&enhanced, POST_CONTRAST);
    }
    blend_masked(frame, &enhanced, mask)
}
