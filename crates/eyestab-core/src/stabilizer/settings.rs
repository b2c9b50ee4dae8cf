//! Stabilizer settings and preset resolution.

#![allow(clippy::cast_precision_loss)]

use crate::domain::{ConfigError, Population, Preset, SuppressionMode, SuppressionPolicy};

use super::blink::BaselinePolicy;

/// Defaults used when no population preset is selected.
pub mod classic {
    /// Landmark smoothing strength.
    pub const SMOOTHING_STRENGTH: f32 = 0.7;
    /// Sharpness enhancement factor.
    pub const ENHANCEMENT_STRENGTH: f32 = 1.3;
    /// Relative blink threshold.
    pub const BLINK_THRESHOLD: f32 = 0.2;
}

/// Accepted range for smoothing strength.
pub const SMOOTHING_RANGE: (f32, f32) = (0.0, 1.0);
/// Accepted range for enhancement strength.
pub const ENHANCEMENT_RANGE: (f32, f32) = (1.0, 2.0);
/// Accepted range for the relative blink threshold.
pub const BLINK_THRESHOLD_RANGE: (f32, f32) = (0.1, 0.5);
/// Largest accepted mask dilation radius in pixels.
pub const MAX_MASK_DILATION: u32 = 50;
/// Default mask dilation radius in pixels.
pub const DEFAULT_MASK_DILATION: u32 = 10;

/// Caller-facing stabilizer configuration.
///
/// Numeric overrides are `None` unless set explicitly; a set override wins
/// over the preset value for that field only.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilizerSettings {
    /// Population preset. `None` selects classic mode.
    pub population: Option<Population>,
    /// Blink suppression mode.
    pub suppression: SuppressionMode,
    /// Temporal landmark smoothing.
    pub smoothing: bool,
    /// Blink detection.
    pub blink_detection: bool,
    /// Eye region enhancement.
    pub enhancement: bool,
    /// Landmark overlay on debug frames.
    pub debug_overlay: bool,
    /// Smoothing strength override.
    pub smoothing_strength: Option<f32>,
    /// Enhancement strength override.
    pub enhancement_strength: Option<f32>,
    /// Blink threshold override.
    pub blink_threshold: Option<f32>,
    /// Pixels to grow the eye mask by.
    pub mask_dilation: u32,
}

impl Default for StabilizerSettings {
    fn default() -> Self {
        Self {
            population: Some(Population::Auto),
            suppression: SuppressionMode::Off,
            smoothing: true,
            blink_detection: true,
            enhancement: true,
            debug_overlay: true,
            smoothing_strength: None,
            enhancement_strength: None,
            blink_threshold: None,
            mask_dilation: DEFAULT_MASK_DILATION,
        }
    }
}

impl StabilizerSettings {
    /// Settings without a population preset.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            population: None,
            ..Self::default()
        }
    }

    /// Selects a population preset.
    #[must_use]
    pub const fn with_population(mut self, population: Population) -> Self {
        self.population = Some(population);
        self
    }

    /// Sets the blink suppression mode.
    #[must_use]
    pub const fn with_suppression(mut self, mode: SuppressionMode) -> Self {
        self.suppression = mode;
        self
    }

    /// Overrides the smoothing strength.
    #[must_use]
    pub const fn with_smoothing_strength(mut self, strength: f32) -> Self {
        self.smoothing_strength = Some(strength);
        self
    }

    /// Overrides the enhancement strength.
    #[must_use]
    pub const fn with_enhancement_strength(mut self, strength: f32) -> Self {
        self.enhancement_strength = Some(strength);
        self
    }

    /// Overrides the blink threshold.
    #[must_use]
    pub const fn with_blink_threshold(mut self, threshold: f32) -> Self {
        self.blink_threshold = Some(threshold);
        self
    }

    /// Sets the mask dilation radius in pixels.
    #[must_use]
    pub const fn with_mask_dilation(mut self, pixels: u32) -> Self {
        self.mask_dilation = pixels;
        self
    }

    /// Resolves the preset and overrides into concrete parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for any override or dilation
    /// outside its accepted range.
    pub fn resolve(&self) -> Result<ResolvedParams, ConfigError> {
        check_range("smoothing_strength", self.smoothing_strength, SMOOTHING_RANGE)?;
        check_range("enhancement_strength", self.enhancement_strength, ENHANCEMENT_RANGE)?;
        check_range("blink_threshold", self.blink_threshold, BLINK_THRESHOLD_RANGE)?;
        if self.mask_dilation > MAX_MASK_DILATION {
            return Err(ConfigError::OutOfRange {
                field: "mask_dilation",
                value: self.mask_dilation as f32,
                min: 0.0,
                max: MAX_MASK_DILATION as f32,
            });
        }

        let preset = self.population.map(Population::preset);

        let (smoothing, enhancement, threshold) = preset.map_or(
            (
                classic::SMOOTHING_STRENGTH,
                classic::ENHANCEMENT_STRENGTH,
                classic::BLINK_THRESHOLD,
            ),
            |p| (p.smoothing_strength, p.enhancement_strength, p.blink_threshold),
        );

        let baseline = match preset {
            None => BaselinePolicy::Rolling,
            Some(p) => p.baseline_ear.map_or(BaselinePolicy::Calibrate, BaselinePolicy::Fixed),
        };

        Ok(ResolvedParams {
            preset,
            suppression_mode: self.suppression,
            smoothing_strength: self.smoothing_strength.unwrap_or(smoothing),
            enhancement_strength: self.enhancement_strength.unwrap_or(enhancement),
            blink_threshold: self.blink_threshold.unwrap_or(threshold),
            eyelid_weight: preset.and_then(|p| p.eyelid_weight).unwrap_or(1.0),
            iris_weight: preset.and_then(|p| p.iris_visibility_factor).unwrap_or(1.0),
            contrast_boost: preset.and_then(|p| p.contrast_boost),
            baseline,
            suppression: self.suppression.policy(),
            mask_dilation: self.mask_dilation,
        })
    }
}

fn check_range(field: &'static str, value: Option<f32>, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    match value {
        Some(value) if !(min..=max).contains(&value) => Err(ConfigError::OutOfRange { field, value, min, max }),
        _ => Ok(()),
    }
}

/// Concrete parameters for one stabilization run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    /// Selected preset, `None` in classic mode.
    pub preset: Option<&'static Preset>,
    /// Suppression mode as configured.
    pub suppression_mode: SuppressionMode,
    /// Base smoothing strength.
    pub smoothing_strength: f32,
    /// Sharpness enhancement factor.
    pub enhancement_strength: f32,
    /// Relative blink threshold before any calibration.
    pub blink_threshold: f32,
    /// Smoothing multiplier for eyelid contours.
    pub eyelid_weight: f32,
    /// Smoothing multiplier for irises.
    pub iris_weight: f32,
    /// Contrast factor for the detector input.
    pub contrast_boost: Option<f32>,
    /// Open-eye reference policy.
    pub baseline: BaselinePolicy,
    /// Blink run gating.
    pub suppression: SuppressionPolicy,
    /// Mask dilation radius in pixels.
    pub mask_dilation: u32,
}

impl ResolvedParams {
    /// Smoothing strength for eyelid contour points.
    #[must_use]
    pub fn contour_strength(&self) -> f32 {
        (self.smoothing_strength * self.eyelid_weight).clamp(0.0, 1.0)
    }

    /// Smoothing strength for iris points.
    #[must_use]
    pub fn iris_strength(&self) -> f32 {
        (self.smoothing_strength * self.iris_weight).clamp(0.0, 1.0)
    }

    /// Summary line for preset mode: `"<name>: <description>"`, plus the
    /// learned baseline when calibration settled.
    #[must_use]
    pub fn summary(&self, calibrated: Option<f32>) -> Option<String> {
        let preset = self.preset?;
        let mut line = format!("{}: {}", preset.name, preset.description);
        if let Some(baseline) = calibrated {
            line.push_str(&format!(" | Auto-calibrated EAR: {baseline:.3}"));
        }
        Some(line)
    }
}
