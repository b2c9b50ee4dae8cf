//! Configuration file support for eyestab.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/eyestab/config.toml` (lowest priority)
//! - Project-local: `.eyestab.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use eyestab_core::stabilizer::settings::{
    BLINK_THRESHOLD_RANGE, ENHANCEMENT_RANGE, MAX_MASK_DILATION, SMOOTHING_RANGE,
};
use eyestab_core::SuppressionMode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::commands::stabilize::PresetChoice;

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Stabilizer settings.
    pub stabilizer: StabilizerConfig,
    /// Debug overlay settings.
    pub overlay: OverlayConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Stabilizer configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    /// Population preset id, or `classic`.
    pub preset: Option<String>,
    /// Blink suppression mode.
    pub suppression: Option<String>,
    /// Enable/disable landmark smoothing.
    pub smoothing: Option<bool>,
    /// Enable/disable blink detection.
    pub blink_detection: Option<bool>,
    /// Enable/disable eye enhancement.
    pub enhancement: Option<bool>,
    /// Smoothing strength (0.0-1.0).
    pub smoothing_strength: Option<f32>,
    /// Enhancement strength (1.0-2.0).
    pub enhancement_strength: Option<f32>,
    /// Relative blink threshold (0.1-0.5).
    pub blink_threshold: Option<f32>,
    /// Mask dilation radius in pixels.
    pub mask_dilation: Option<u32>,
}

/// Debug overlay configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Enable/disable the landmark overlay.
    pub enabled: Option<bool>,
    /// TrueType/OpenType font for overlay labels.
    pub font: Option<PathBuf>,
}

/// Output configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for stabilized frames.
    pub dir: Option<PathBuf>,
    /// Pretty-print the JSON report.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/eyestab/config.toml`
    /// 2. Project-local: `.eyestab.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), String> {
        let s = &self.stabilizer;

        if let Some(ref preset) = s.preset {
            preset
                .parse::<PresetChoice>()
                .map_err(|e| format!("stabilizer.preset: {e}"))?;
        }
        if let Some(ref mode) = s.suppression {
            mode.parse::<SuppressionMode>()
                .map_err(|e| format!("stabilizer.suppression: {e}"))?;
        }

        check_range("stabilizer.smoothing_strength", s.smoothing_strength, SMOOTHING_RANGE)?;
        check_range(
            "stabilizer.enhancement_strength",
            s.enhancement_strength,
            ENHANCEMENT_RANGE,
        )?;
        check_range("stabilizer.blink_threshold", s.blink_threshold, BLINK_THRESHOLD_RANGE)?;

        if let Some(d) = s.mask_dilation {
            if d > MAX_MASK_DILATION {
                return Err(format!(
                    "stabilizer.mask_dilation must be 0-{MAX_MASK_DILATION}, got {d}"
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    pub fn merge(&mut self, other: Self) {
        let (s, o) = (&mut self.stabilizer, other.stabilizer);
        s.preset = o.preset.or_else(|| s.preset.take());
        s.suppression = o.suppression.or_else(|| s.suppression.take());
        s.smoothing = o.smoothing.or(s.smoothing);
        s.blink_detection = o.blink_detection.or(s.blink_detection);
        s.enhancement = o.enhancement.or(s.enhancement);
        s.smoothing_strength = o.smoothing_strength.or(s.smoothing_strength);
        s.enhancement_strength = o.enhancement_strength.or(s.enhancement_strength);
        s.blink_threshold = o.blink_threshold.or(s.blink_threshold);
        s.mask_dilation = o.mask_dilation.or(s.mask_dilation);

        self.overlay.enabled = other.overlay.enabled.or(self.overlay.enabled);
        self.overlay.font = other.overlay.font.or_else(|| self.overlay.font.take());

        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

fn check_range(field: &str, value: Option<f32>, (min, max): (f32, f32)) -> Result<(), String> {
    match value {
        Some(v) if !(min..=max).contains(&v) => {
            Err(format!("{field} must be {min:.1}-{max:.1}, got {v}"))
        }
        _ => Ok(()),
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("eyestab").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.eyestab.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".eyestab.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
