//! Eye region masks.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::morphology::dilate;
use imageproc::point::Point as PixelPoint;

use crate::domain::Point;

const INSIDE: Luma<u8> = Luma([255]);

/// Rasterizes both eye contours into a binary mask, optionally dilated.
///
/// Contour points are truncated to integer pixels. `dilation` is a radius:
/// every lit pixel grows into the square of side `2 * dilation + 1` around it.
#[must_use]
pub fn eye_mask(width: u32, height: u32, contours: &[&[Point]], dilation: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    for contour in contours {
        fill_contour(&mut mask, contour);
    }

    if dilation == 0 {
        return mask;
    }
    let radius = u8::try_from(dilation).unwrap_or(u8::MAX);
    dilate(&mask, Norm::LInf, radius)
}

fn fill_contour(mask: &mut GrayImage, contour: &[Point]) {
    let mut poly: Vec<PixelPoint<i32>> = Vec::with_capacity(contour.len());
    for p in contour {
        let px = PixelPoint::new(p.x as i32, p.y as i32);
        if poly.last() != Some(&px) {
            poly.push(px);
        }
    }
    // The polygon is closed implicitly; a repeated first point is rejected
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }

    match poly.as_slice() {
        [] => {}
        [p] => {
            if let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) {
                if x < mask.width() && y < mask.height() {
                    mask.put_pixel(x, y, INSIDE);
                }
            }
        }
        [a, b] => draw_line_segment_mut(mask, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), INSIDE),
        _ => draw_polygon_mut(mask, &poly, INSIDE),
    }
}
