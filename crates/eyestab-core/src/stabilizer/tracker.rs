//! Bank of scalar smoothers, one per tracked landmark coordinate.

use std::collections::HashMap;

use tracing::debug;

use super::smoother::ScalarSmoother;
use crate::domain::{LandmarkKey, Point, Region, Side};

/// Coordinate axis of a tracked scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Identity of one smoothed scalar: a landmark plus an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterKey {
    /// The landmark being tracked.
    pub landmark: LandmarkKey,
    /// Which coordinate of it.
    pub axis: Axis,
}

/// Smooths landmark trajectories across frames.
///
/// Filters are created the first time a key is observed, using the strength
/// passed on that call. Later calls with a different strength reuse the
/// existing filter unchanged.
#[derive(Debug, Default)]
pub struct LandmarkTracker {
    filters: HashMap<FilterKey, ScalarSmoother>,
}

impl LandmarkTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Smooths one region's points, preserving their order.
    pub fn smooth(&mut self, side: Side, region: Region, points: &[Point], strength: f32) -> Vec<Point> {
        points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let landmark = LandmarkKey { side, region, index };
                Point::new(
                    self.update(landmark, Axis::X, point.x, strength),
                    self.update(landmark, Axis::Y, point.y, strength),
                )
            })
            .collect()
    }

    fn update(&mut self, landmark: LandmarkKey, axis: Axis, value: f32, strength: f32) -> f32 {
        self.filters
            .entry(FilterKey { landmark, axis })
            .or_insert_with(|| {
                debug!(?landmark, ?axis, strength, "Creating landmark filter");
                ScalarSmoother::with_strength(strength)
            })
            .update(value)
    }

    /// Number of live filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Returns true if no landmark has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Drops every filter.
    pub fn reset(&mut self) {
        self.filters.clear();
    }

    /// Borrow the filter for a key, if it exists.
    #[must_use]
    pub fn filter(&self, key: &FilterKey) -> Option<&ScalarSmoother> {
        self.filters.get(key)
    }
}
