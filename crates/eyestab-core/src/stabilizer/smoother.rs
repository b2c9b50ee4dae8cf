//! One-dimensional Kalman smoother for a single landmark coordinate.

/// Measurement noise assumed for detector output.
pub const MEASUREMENT_VARIANCE: f32 = 1e-1;

/// Process noise at zero smoothing strength.
const BASE_PROCESS_VARIANCE: f32 = 1e-3;

/// Process variance for a smoothing strength, clamped to `[0, 1]`.
///
/// Strength 1 yields zero process variance, which freezes the estimate once
/// the initial error has decayed.
#[must_use]
pub fn process_variance_for(strength: f32) -> f32 {
    BASE_PROCESS_VARIANCE * (1.0 - strength.clamp(0.0, 1.0))
}

/// Scalar Kalman filter with a constant-position model.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSmoother {
    estimate: f32,
    error_estimate: f32,
    process_variance: f32,
    measurement_variance: f32,
}

impl ScalarSmoother {
    /// Creates a smoother with explicit noise parameters.
    #[must_use]
    pub const fn new(process_variance: f32, measurement_variance: f32) -> Self {
        Self {
            estimate: 0.0,
            error_estimate: 1.0,
            process_variance,
            measurement_variance,
        }
    }

    /// Creates a smoother tuned for a smoothing strength in `[0, 1]`.
    #[must_use]
    pub fn with_strength(strength: f32) -> Self {
        Self::new(process_variance_for(strength), MEASUREMENT_VARIANCE)
    }

    /// Folds in a measurement and returns the new estimate.
    pub fn update(&mut self, measurement: f32) -> f32 {
        let prediction_error = self.error_estimate + self.process_variance;
        let gain = prediction_error / (prediction_error + self.measurement_variance);
        self.estimate += gain * (measurement - self.estimate);
        self.error_estimate = (1.0 - gain) * prediction_error;
        self.estimate
    }

    /// Current estimate.
    #[must_use]
    pub const fn estimate(&self) -> f32 {
        self.estimate
    }

    /// Current error covariance.
    #[must_use]
    pub const fn error_estimate(&self) -> f32 {
        self.error_estimate
    }

    /// Process variance fixed at construction.
    #[must_use]
    pub const fn process_variance(&self) -> f32 {
        self.process_variance
    }
}
