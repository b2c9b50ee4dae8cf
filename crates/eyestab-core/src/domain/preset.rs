//! Population presets and blink suppression modes.
//!
//! Presets are a closed registry: every [`Population`] maps to exactly one
//! static [`Preset`]. Downstream stages read their tuning defaults from the
//! resolved preset instead of hardcoded constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Population selector for preset lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    /// Calibrates a baseline from the sequence itself.
    #[default]
    Auto,
    /// East Asian.
    EastAsian,
    /// South Asian.
    SouthAsian,
    /// African / African American.
    African,
    /// Caucasian / European.
    Caucasian,
    /// Middle Eastern / Arab.
    MiddleEastern,
    /// Latino / Hispanic.
    Latino,
}

impl Population {
    /// Every population, in registry order.
    pub const ALL: [Self; 7] = [
        Self::Auto,
        Self::EastAsian,
        Self::SouthAsian,
        Self::African,
        Self::Caucasian,
        Self::MiddleEastern,
        Self::Latino,
    ];

    /// Stable identifier used in configuration and reports.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::EastAsian => "east_asian",
            Self::SouthAsian => "south_asian",
            Self::African => "african",
            Self::Caucasian => "caucasian",
            Self::MiddleEastern => "middle_eastern",
            Self::Latino => "latino",
        }
    }

    /// The preset registered for this population.
    #[must_use]
    pub fn preset(self) -> &'static Preset {
        match self {
            Self::Auto => &AUTO,
            Self::EastAsian => &EAST_ASIAN,
            Self::SouthAsian => &SOUTH_ASIAN,
            Self::African => &AFRICAN,
            Self::Caucasian => &CAUCASIAN,
            Self::MiddleEastern => &MIDDLE_EASTERN,
            Self::Latino => &LATINO,
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Population {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| ConfigError::UnknownPopulation(s.to_string()))
    }
}

/// Looks up the preset for a population identifier.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownPopulation`] for identifiers outside the registry.
pub fn resolve(id: &str) -> Result<&'static Preset, ConfigError> {
    id.parse::<Population>().map(Population::preset)
}

/// Immutable bundle of tuning defaults for one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preset {
    /// Population this preset belongs to.
    pub population: Population,
    /// Human-readable name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Relative EAR drop that counts as a blink.
    pub blink_threshold: f32,
    /// Landmark smoothing strength in `[0, 1]`.
    pub smoothing_strength: f32,
    /// Sharpness enhancement factor.
    pub enhancement_strength: f32,
    /// Fixed open-eye EAR reference. `None` means calibrate from the sequence.
    pub baseline_ear: Option<f32>,
    /// Multiplier on smoothing strength for iris points.
    pub iris_visibility_factor: Option<f32>,
    /// Multiplier on smoothing strength for eyelid contour points.
    pub eyelid_weight: Option<f32>,
    /// Contrast factor applied to the detector input.
    pub contrast_boost: Option<f32>,
}

static AUTO: Preset = Preset {
    population: Population::Auto,
    name: "Auto-Detect",
    description: "Automatically calibrates to the person in the video",
    blink_threshold: 0.2,
    smoothing_strength: 0.7,
    enhancement_strength: 1.3,
    baseline_ear: None,
    iris_visibility_factor: None,
    eyelid_weight: None,
    contrast_boost: None,
};

static EAST_ASIAN: Preset = Preset {
    population: Population::EastAsian,
    name: "East Asian (Chinese, Japanese, Korean)",
    description: "Optimized for monolids and epicanthic folds",
    blink_threshold: 0.12,
    smoothing_strength: 0.4,
    enhancement_strength: 1.1,
    baseline_ear: Some(0.18),
    iris_visibility_factor: Some(0.7),
    eyelid_weight: Some(1.3),
    contrast_boost: None,
};

static SOUTH_ASIAN: Preset = Preset {
    population: Population::SouthAsian,
    name: "South Asian (Indian, Pakistani, Bangladeshi)",
    description: "Balanced for varied eye shapes",
    blink_threshold: 0.18,
    smoothing_strength: 0.6,
    enhancement_strength: 1.25,
    baseline_ear: Some(0.22),
    iris_visibility_factor: Some(0.85),
    eyelid_weight: Some(1.0),
    contrast_boost: None,
};

static AFRICAN: Preset = Preset {
    population: Population::African,
    name: "African / African American",
    description: "Enhanced contrast for better landmark detection",
    blink_threshold: 0.22,
    smoothing_strength: 0.65,
    enhancement_strength: 1.4,
    baseline_ear: Some(0.25),
    iris_visibility_factor: Some(0.9),
    eyelid_weight: Some(0.9),
    contrast_boost: Some(1.15),
};

static CAUCASIAN: Preset = Preset {
    population: Population::Caucasian,
    name: "Caucasian / European",
    description: "Standard MediaPipe calibration",
    blink_threshold: 0.20,
    smoothing_strength: 0.7,
    enhancement_strength: 1.3,
    baseline_ear: Some(0.26),
    iris_visibility_factor: Some(1.0),
    eyelid_weight: Some(1.0),
    contrast_boost: None,
};

static MIDDLE_EASTERN: Preset = Preset {
    population: Population::MiddleEastern,
    name: "Middle Eastern / Arab",
    description: "Optimized for almond-shaped eyes",
    blink_threshold: 0.19,
    smoothing_strength: 0.6,
    enhancement_strength: 1.35,
    baseline_ear: Some(0.24),
    iris_visibility_factor: Some(0.95),
    eyelid_weight: Some(1.1),
    contrast_boost: None,
};

static LATINO: Preset = Preset {
    population: Population::Latino,
    name: "Latino / Hispanic",
    description: "Balanced settings for diverse Latino features",
    blink_threshold: 0.19,
    smoothing_strength: 0.65,
    enhancement_strength: 1.3,
    baseline_ear: Some(0.24),
    iris_visibility_factor: Some(0.95),
    eyelid_weight: Some(1.0),
    contrast_boost: None,
};

/// Blink suppression mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionMode {
    /// Report every raw blink.
    #[default]
    Off,
    /// Drop blinks shorter than 2 frames.
    Light,
    /// Drop blinks shorter than 3 frames.
    Moderate,
    /// Drop blinks shorter than 5 frames.
    Aggressive,
}

impl SuppressionMode {
    /// Every mode, mildest first.
    pub const ALL: [Self; 4] = [Self::Off, Self::Light, Self::Moderate, Self::Aggressive];

    /// Stable identifier used in configuration and reports.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }

    /// The run-length policy for this mode.
    #[must_use]
    pub const fn policy(self) -> SuppressionPolicy {
        match self {
            Self::Off => SuppressionPolicy::DISABLED,
            Self::Light => SuppressionPolicy::min_run(2),
            Self::Moderate => SuppressionPolicy::min_run(3),
            Self::Aggressive => SuppressionPolicy::min_run(5),
        }
    }
}

impl fmt::Display for SuppressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SuppressionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| ConfigError::UnknownSuppressionMode(s.to_string()))
    }
}

/// Minimum-run gating for blink reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionPolicy {
    /// Whether gating is active.
    pub enabled: bool,
    /// Consecutive raw-blink frames required before a blink is reported.
    pub min_run: u32,
}

impl SuppressionPolicy {
    /// No gating; raw blinks are reported as-is.
    pub const DISABLED: Self = Self {
        enabled: false,
        min_run: 0,
    };

    /// Gating with the given minimum run.
    #[must_use]
    pub const fn min_run(min_run: u32) -> Self {
        Self {
            enabled: true,
            min_run,
        }
    }
}

impl Default for SuppressionPolicy {
    fn default() -> Self {
        Self::DISABLED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_seven_entries() {
        assert_eq!(Population::ALL.len(), 7);
        for population in Population::ALL {
            assert_eq!(population.preset().population, population);
        }
    }

    #[test]
    fn test_resolve_known_ids() {
        let preset = resolve("east_asian");
        assert!(preset.is_ok_and(|p| {
            (p.blink_threshold - 0.12).abs() < f32::EPSILON
                && p.baseline_ear == Some(0.18)
                && p.eyelid_weight == Some(1.3)
        }));
        assert!(resolve("african").is_ok_and(|p| p.contrast_boost == Some(1.15)));
    }

    #[test]
    fn test_resolve_unknown_id() {
        assert_eq!(
            resolve("martian"),
            Err(ConfigError::UnknownPopulation("martian".into()))
        );
    }

    #[test]
    fn test_only_auto_lacks_baseline() {
        for population in Population::ALL {
            let has_baseline = population.preset().baseline_ear.is_some();
            assert_eq!(has_baseline, population != Population::Auto);
        }
    }

    #[test]
    fn test_named_presets_within_documented_ranges() {
        for population in Population::ALL.into_iter().skip(1) {
            let p = population.preset();
            assert!((0.12..=0.25).contains(&p.blink_threshold), "{population}");
            assert!((0.4..=0.7).contains(&p.smoothing_strength), "{population}");
            assert!((1.1..=1.4).contains(&p.enhancement_strength), "{population}");
        }
    }

    #[test]
    fn test_population_display_round_trips() {
        for population in Population::ALL {
            assert_eq!(population.to_string().parse::<Population>(), Ok(population));
        }
    }

    #[test]
    fn test_suppression_policies() {
        assert_eq!(SuppressionMode::Off.policy(), SuppressionPolicy::DISABLED);
        assert_eq!(SuppressionMode::Light.policy(), SuppressionPolicy::min_run(2));
        assert_eq!(SuppressionMode::Moderate.policy(), SuppressionPolicy::min_run(3));
        assert_eq!(SuppressionMode::Aggressive.policy(), SuppressionPolicy::min_run(5));
        assert!("sometimes".parse::<SuppressionMode>().is_err());
        assert_eq!("moderate".parse(), Ok(SuppressionMode::Moderate));
    }
}
