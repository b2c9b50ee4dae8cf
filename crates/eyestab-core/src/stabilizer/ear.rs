//! Eye Aspect Ratio.
//!
//! For contour points p1..p6 (p1/p4 at the corners, p2/p3 on the upper lid,
//! p5/p6 on the lower lid):
//!
//! ```text
//! EAR = (|p2 - p6| + |p3 - p5|) / (2 |p1 - p4|)
//! ```

use crate::domain::Point;

/// EAR reported when a contour is incomplete, roughly an open eye.
pub const FALLBACK_EAR: f32 = 0.3;

/// Keeps a degenerate contour with coincident corners finite.
const EPSILON: f32 = 1e-6;

/// Computes the eye aspect ratio for a six-point contour.
///
/// Returns [`FALLBACK_EAR`] when fewer than six points are supplied.
#[must_use]
pub fn calculate_ear(contour: &[Point]) -> f32 {
    let [p1, p2, p3, p4, p5, p6, ..] = contour else {
        return FALLBACK_EAR;
    };

    let vertical = p2.distance(*p6) + p3.distance(*p5);
    let horizontal = p1.distance(*p4);
    vertical / (2.0 * horizontal + EPSILON)
}
