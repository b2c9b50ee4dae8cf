//! The eye stabilization engine.
//!
//! Leaves first: [`smoother`] filters one scalar, [`tracker`] keeps a bank of
//! them per landmark coordinate, [`ear`] measures eye openness, [`blink`]
//! classifies frames, [`settings`] resolves presets into parameters, and
//! [`pipeline`] runs all of it over a frame sequence.

pub mod blink;
pub mod ear;
pub mod pipeline;
pub mod settings;
pub mod smoother;
pub mod tracker;

pub use blink::{BaselinePolicy, BlinkDetector};
pub use ear::calculate_ear;
pub use pipeline::{EyeStabilizer, StabilizationOutput};
pub use settings::{ResolvedParams, StabilizerSettings};
pub use smoother::ScalarSmoother;
pub use tracker::{Axis, FilterKey, LandmarkTracker};
