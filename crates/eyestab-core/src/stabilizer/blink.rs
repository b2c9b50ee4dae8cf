//! Adaptive blink detection with optional minimum-run suppression.
//!
//! Every frame feeds the average of both eyes' EAR into a short history.
//! A frame is a raw blink when that average falls below
//! `reference * (1 - threshold)`. The reference is one of:
//!
//! - a fixed baseline supplied by a population preset,
//! - a baseline learned from the first frames of the sequence (auto mode),
//! - the mean of the recent history when neither exists.
//!
//! Suppression then drops raw blinks shorter than a minimum run, which
//! filters the single-frame flicker generative video tends to produce.

#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::domain::SuppressionPolicy;

/// Frames of EAR history kept for the rolling reference.
pub const HISTORY_CAPACITY: usize = 5;

/// Samples collected before auto-calibration settles.
pub const CALIBRATION_SAMPLES: usize = 30;

/// Percentile of calibration samples taken as the open-eye baseline.
pub const CALIBRATION_PERCENTILE: f32 = 75.0;

/// Relative drop from a calibrated baseline that counts as a blink.
pub const CALIBRATED_THRESHOLD: f32 = 0.35;

/// Weight of the current EAR when smoothing through a blink.
const BLINK_BLEND: f32 = 0.3;

/// Where the open-eye reference comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BaselinePolicy {
    /// Mean of the recent history.
    Rolling,
    /// A known open-eye EAR.
    Fixed(f32),
    /// Learn a baseline from the first [`CALIBRATION_SAMPLES`] frames.
    Calibrate,
}

/// Per-sequence blink state.
#[derive(Debug, Clone)]
pub struct BlinkDetector {
    threshold: f32,
    policy: BaselinePolicy,
    baseline: Option<f32>,
    history: VecDeque<f32>,
    calibration_samples: Vec<f32>,
    suppression: SuppressionPolicy,
    run: u32,
}

impl BlinkDetector {
    /// Creates a detector with a relative drop threshold and baseline policy.
    #[must_use]
    pub fn new(threshold: f32, policy: BaselinePolicy) -> Self {
        let baseline = match policy {
            BaselinePolicy::Fixed(baseline) => Some(baseline),
            BaselinePolicy::Rolling | BaselinePolicy::Calibrate => None,
        };

        Self {
            threshold,
            policy,
            baseline,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            calibration_samples: Vec::new(),
            suppression: SuppressionPolicy::DISABLED,
            run: 0,
        }
    }

    /// Sets the suppression policy.
    #[must_use]
    pub const fn with_suppression(mut self, suppression: SuppressionPolicy) -> Self {
        self.suppression = suppression;
        self
    }

    /// Classifies one frame from both eyes' EAR.
    pub fn detect(&mut self, left_ear: f32, right_ear: f32) -> bool {
        let avg = (left_ear + right_ear) / 2.0;

        let calibrating = self.policy == BaselinePolicy::Calibrate && self.baseline.is_none();
        if calibrating {
            self.calibrate(avg);
        }

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(avg);

        if self.policy == BaselinePolicy::Calibrate && self.baseline.is_none() {
            return false;
        }
        if self.history.len() < HISTORY_CAPACITY {
            return false;
        }

        let reference = self.baseline.unwrap_or_else(|| self.history_mean());
        let raw = avg < reference * (1.0 - self.threshold);

        if !self.suppression.enabled {
            return raw;
        }

        if raw {
            self.run = self.run.saturating_add(1);
            if self.run < self.suppression.min_run {
                debug!(run = self.run, min = self.suppression.min_run, "Suppressing short blink");
                return false;
            }
            true
        } else {
            self.run = 0;
            false
        }
    }

    fn calibrate(&mut self, sample: f32) {
        self.calibration_samples.push(sample);
        if self.calibration_samples.len() < CALIBRATION_SAMPLES {
            return;
        }

        let baseline = percentile(&self.calibration_samples, CALIBRATION_PERCENTILE);
        self.baseline = Some(baseline);
        self.threshold = CALIBRATED_THRESHOLD;
        info!(
            "Auto-calibrated baseline EAR: {baseline:.3}, relative threshold {:.2}",
            self.threshold
        );
    }

    /// Blends the current EAR towards the history mean during a blink.
    #[must_use]
    pub fn smooth_ear(&self, current: f32, blinking: bool) -> f32 {
        if !blinking || self.history.is_empty() {
            return current;
        }
        current * BLINK_BLEND + self.history_mean() * (1.0 - BLINK_BLEND)
    }

    fn history_mean(&self) -> f32 {
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Baseline learned by auto-calibration, once it has settled.
    #[must_use]
    pub fn calibrated_baseline(&self) -> Option<f32> {
        match self.policy {
            BaselinePolicy::Calibrate => self.baseline,
            BaselinePolicy::Rolling | BaselinePolicy::Fixed(_) => None,
        }
    }

    /// Returns true while auto-calibration is still collecting samples.
    #[must_use]
    pub fn is_calibrating(&self) -> bool {
        self.policy == BaselinePolicy::Calibrate && self.baseline.is_none()
    }

    /// Relative drop threshold currently in effect.
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Recent EAR history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    /// Consecutive raw-blink frames seen under suppression.
    #[must_use]
    pub const fn run_length(&self) -> u32 {
        self.run
    }
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(samples: &[f32], pct: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f32::total_cmp);

    let rank = pct / 100.0 * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN: f32 = 0.3;
    const CLOSED: f32 = 0.1;

    fn feed(detector: &mut BlinkDetector, ear: f32, frames: usize) -> Vec<bool> {
        (0..frames).map(|_| detector.detect(ear, ear)).collect()
    }

    #[test]
    fn test_no_blink_until_history_full() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Rolling);
        let verdicts: Vec<bool> = [0.3, 0.3, 0.3, 0.01].iter().map(|&e| detector.detect(e, e)).collect();
        assert_eq!(verdicts, vec![false; 4]);
    }

    #[test]
    fn test_rolling_reference_detects_drop() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Rolling);
        feed(&mut detector, OPEN, 4);
        // mean(0.3 x4, 0.1) = 0.26, 0.1 < 0.208
        assert!(detector.detect(CLOSED, CLOSED));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Rolling);
        feed(&mut detector, OPEN, 50);
        assert_eq!(detector.history().count(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_fixed_baseline_reference() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Fixed(0.3));
        feed(&mut detector, OPEN, 5);
        // 0.25 is above 0.3 * 0.8 = 0.24
        assert!(!detector.detect(0.25, 0.25));
        assert!(detector.detect(0.23, 0.23));
        assert_eq!(detector.calibrated_baseline(), None);
    }

    #[test]
    fn test_aggressive_suppression_gates_short_runs() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Fixed(0.3))
            .with_suppression(SuppressionPolicy::min_run(5));
        feed(&mut detector, OPEN, 5);

        assert_eq!(feed(&mut detector, CLOSED, 4), vec![false; 4]);
        assert_eq!(detector.run_length(), 4);

        assert!(!detector.detect(OPEN, OPEN));
        assert_eq!(detector.run_length(), 0);

        assert_eq!(
            feed(&mut detector, CLOSED, 6),
            vec![false, false, false, false, true, true]
        );
    }

    #[test]
    fn test_suppression_disabled_reports_raw() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Fixed(0.3));
        feed(&mut detector, OPEN, 5);
        assert!(detector.detect(CLOSED, CLOSED));
        assert_eq!(detector.run_length(), 0);
    }

    #[test]
    fn test_calibration_on_thirtieth_sample() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Calibrate);
        for _ in 0..29 {
            assert!(!detector.detect(0.25, 0.25));
            assert!(detector.is_calibrating());
        }
        detector.detect(0.25, 0.25);
        assert!(!detector.is_calibrating());
        assert!(detector
            .calibrated_baseline()
            .is_some_and(|b| (b - 0.25).abs() < 1e-6));
        assert!((detector.threshold() - CALIBRATED_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_uncalibrated_never_blinks() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Calibrate);
        feed(&mut detector, OPEN, 10);
        assert_eq!(feed(&mut detector, 0.0, 10), vec![false; 10]);
    }

    #[test]
    fn test_baseline_never_overwritten() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Calibrate);
        feed(&mut detector, 0.25, 30);
        feed(&mut detector, 0.4, 40);
        assert!(detector
            .calibrated_baseline()
            .is_some_and(|b| (b - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_calibrated_detects_relative_drop() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Calibrate);
        feed(&mut detector, 0.3, 30);
        // 0.3 * 0.65 = 0.195
        assert!(!detector.detect(0.2, 0.2));
        assert!(detector.detect(0.19, 0.19));
    }

    #[test]
    fn test_percentile_interpolates() {
        assert!((percentile(&[1.0, 2.0, 3.0, 4.0], 75.0) - 3.25).abs() < 1e-6);
        assert!((percentile(&[4.0, 1.0, 3.0, 2.0, 5.0], 75.0) - 4.0).abs() < 1e-6);
        assert!((percentile(&[7.0], 75.0) - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_smooth_ear() {
        let mut detector = BlinkDetector::new(0.2, BaselinePolicy::Rolling);
        assert!((detector.smooth_ear(0.1, true) - 0.1).abs() < f32::EPSILON);

        feed(&mut detector, OPEN, 5);
        assert!((detector.smooth_ear(0.1, false) - 0.1).abs() < f32::EPSILON);
        // 0.3 * 0.1 + 0.7 * 0.3
        assert!((detector.smooth_ear(0.1, true) - 0.24).abs() < 1e-6);
    }
}
