//! Debug overlay: landmark dots, blink indicator and preset label.

use std::fmt;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::domain::{EyeLandmarks, Point};

const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const IRIS_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BLINK_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 0]);

const CONTOUR_RADIUS: i32 = 2;
const IRIS_RADIUS: i32 = 1;

const BLINK_ORIGIN: (i32, i32) = (10, 8);
const LABEL_ORIGIN: (i32, i32) = (10, 40);
const BADGE_SIZE: u32 = 16;

/// How overlay text is rendered.
#[derive(Clone)]
pub struct OverlayStyle {
    font: Option<FontArc>,
    blink_scale: f32,
    label_scale: f32,
}

impl OverlayStyle {
    /// Style without text: blinks are shown as a solid badge.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            font: None,
            blink_scale: 24.0,
            label_scale: 18.0,
        }
    }

    /// Renders the blink indicator and preset label with a TrueType font.
    #[must_use]
    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    /// Returns true if text can be drawn.
    #[must_use]
    pub const fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OverlayStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayStyle")
            .field("font", &self.font.as_ref().map(|_| "<font>"))
            .field("blink_scale", &self.blink_scale)
            .field("label_scale", &self.label_scale)
            .finish()
    }
}

fn dots(canvas: &mut RgbImage, points: &[Point], radius: i32, color: Rgb<u8>) {
    for p in points {
        draw_filled_circle_mut(canvas, (p.x as i32, p.y as i32), radius, color);
    }
}

/// Draws landmarks and status onto a debug frame.
pub fn draw_overlay(
    canvas: &mut RgbImage,
    eyes: &EyeLandmarks,
    blinking: bool,
    label: Option<&str>,
    style: &OverlayStyle,
) {
    dots(canvas, &eyes.left_contour, CONTOUR_RADIUS, CONTOUR_COLOR);
    dots(canvas, &eyes.right_contour, CONTOUR_RADIUS, CONTOUR_COLOR);
    dots(canvas, &eyes.left_iris, IRIS_RADIUS, IRIS_COLOR);
    dots(canvas, &eyes.right_iris, IRIS_RADIUS, IRIS_COLOR);

    match &style.font {
        Some(font) => {
            if blinking {
                let (x, y) = BLINK_ORIGIN;
                draw_text_mut(canvas, BLINK_COLOR, x, y, PxScale::from(style.blink_scale), font, "BLINK");
            }
            if let Some(label) = label {
                let (x, y) = LABEL_ORIGIN;
                draw_text_mut(canvas, LABEL_COLOR, x, y, PxScale::from(style.label_scale), font, label);
            }
        }
        None => {
            if blinking {
                let (x, y) = BLINK_ORIGIN;
                draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(BADGE_SIZE, BADGE_SIZE), BLINK_COLOR);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use eyestab_test_support::font_fixture;

    fn font() -> FontArc {
        FontArc::try_from_vec(std::fs::read(font_fixture()).unwrap()).unwrap()
    }

    fn eyes() -> EyeLandmarks {
        EyeLandmarks {
            left_contour: vec![Point::new(40.0, 40.0)],
            right_contour: vec![Point::new(80.0, 40.0)],
            left_iris: vec![Point::new(45.0, 50.0)],
            right_iris: vec![Point::new(85.0, 50.0)],
        }
    }

    #[test]
    fn test_landmark_dots_colored() {
        let mut canvas = RgbImage::new(128, 64);
        draw_overlay(&mut canvas, &eyes(), false, Some("Auto-Detect"), &OverlayStyle::new());

        assert_eq!(*canvas.get_pixel(40, 40), CONTOUR_COLOR);
        assert_eq!(*canvas.get_pixel(42, 40), CONTOUR_COLOR);
        assert_eq!(*canvas.get_pixel(85, 50), IRIS_COLOR);
        assert_eq!(*canvas.get_pixel(12, 10), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_blink_badge_without_font() {
        let mut canvas = RgbImage::new(128, 64);
        draw_overlay(&mut canvas, &eyes(), true, None, &OverlayStyle::new());
        assert_eq!(*canvas.get_pixel(12, 10), BLINK_COLOR);
        assert!(!OverlayStyle::new().has_font());
    }

    #[test]
    fn test_font_draws_blink_text_and_label() {
        let style = OverlayStyle::new().with_font(font());
        assert!(style.has_font());

        let mut canvas = RgbImage::new(160, 80);
        draw_overlay(&mut canvas, &eyes(), true, Some("Auto-Detect"), &style);

        // Text blends onto black, so its pixels keep the hue of the text color
        let blink_text = canvas
            .enumerate_pixels()
            .filter(|(_, y, p)| *y < 36 && p.0[2] > 0 && p.0[0] == 0 && p.0[1] == 0)
            .count();
        let label_text = canvas
            .enumerate_pixels()
            .filter(|(_, y, p)| *y >= 40 && p.0[0] > 0 && p.0[0] == p.0[1] && p.0[2] == 0)
            .count();
        assert!(blink_text > 0);
        assert!(label_text > 0);

        // No solid badge when text is available
        let badge = Rect::at(BLINK_ORIGIN.0, BLINK_ORIGIN.1).of_size(BADGE_SIZE, BADGE_SIZE);
        let badge_filled = (badge.top()..=badge.bottom()).all(|y| {
            (badge.left()..=badge.right())
                .all(|x| *canvas.get_pixel(x as u32, y as u32) == BLINK_COLOR)
        });
        assert!(!badge_filled);
    }

    #[test]
    fn test_font_without_blink_draws_label_only() {
        let mut canvas = RgbImage::new(160, 80);
        draw_overlay(&mut canvas, &eyes(), false, Some("Auto-Detect"), &OverlayStyle::new().with_font(font()));

        assert!(canvas.pixels().all(|p| p.0[2] == 0 || p.0[0] > 0 || p.0[1] > 0));
        assert!(canvas.pixels().any(|p| p.0[0] > 0 && p.0[0] == p.0[1] && p.0[2] == 0));
    }

    #[test]
    fn test_points_outside_canvas_are_clipped() {
        let mut canvas = RgbImage::new(8, 8);
        let far = EyeLandmarks {
            left_contour: vec![Point::new(-20.0, 500.0)],
            ..EyeLandmarks::default()
        };
        draw_overlay(&mut canvas, &far, false, None, &OverlayStyle::new());
        assert!(canvas.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
