//! Stabilize command - stabilize the eye region across a frame sequence.

use std::fmt;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ab_glyph::FontArc;
use anyhow::{Context, Result};
use clap::Args;
use eyestab_adapters::{FsFrameSource, FsFrameWriter, JsonLandmarkDetector};
use eyestab_core::stabilizer::settings::{
    BLINK_THRESHOLD_RANGE, DEFAULT_MASK_DILATION, ENHANCEMENT_RANGE, MAX_MASK_DILATION,
    SMOOTHING_RANGE,
};
use eyestab_core::{
    collect_sequence, ConfigError, EyeStabilizer, LandmarkDetector, OverlayStyle,
    Population, ReportOutput, StabilizerSettings, SuppressionMode,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Preset selection: a population preset, or classic mode without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetChoice {
    /// Fixed parameters, rolling-mean blink baseline.
    Classic,
    /// A population preset.
    Population(Population),
}

impl PresetChoice {
    const CLASSIC_ID: &'static str = "classic";

    /// The population this choice selects, if any.
    #[must_use]
    pub const fn population(self) -> Option<Population> {
        match self {
            Self::Classic => None,
            Self::Population(p) => Some(p),
        }
    }
}

impl FromStr for PresetChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::CLASSIC_ID {
            return Ok(Self::Classic);
        }
        s.parse().map(Self::Population)
    }
}

impl fmt::Display for PresetChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => f.write_str(Self::CLASSIC_ID),
            Self::Population(p) => write!(f, "{p}"),
        }
    }
}

fn parse_preset(s: &str) -> Result<PresetChoice, String> {
    s.parse().map_err(|e: ConfigError| {
        let ids: Vec<&str> = Population::ALL.iter().map(|p| p.id()).collect();
        format!("{e} (expected classic, {})", ids.join(", "))
    })
}

fn parse_suppression(s: &str) -> Result<SuppressionMode, String> {
    s.parse().map_err(|e: ConfigError| e.to_string())
}

fn parse_in_range(s: &str, (min, max): (f32, f32)) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in {min:.1}..={max:.1}"))
    }
}

fn parse_smoothing(s: &str) -> Result<f32, String> {
    parse_in_range(s, SMOOTHING_RANGE)
}

fn parse_enhancement(s: &str) -> Result<f32, String> {
    parse_in_range(s, ENHANCEMENT_RANGE)
}

fn parse_blink_threshold(s: &str) -> Result<f32, String> {
    parse_in_range(s, BLINK_THRESHOLD_RANGE)
}

fn parse_dilation(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid pixel count"))?;
    if value <= MAX_MASK_DILATION {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..={MAX_MASK_DILATION}"))
    }
}

/// Shared arguments for stabilizing a frame sequence.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct StabilizeArgs {
    /// Frame files or directories of frames, in playback order
    pub paths: Vec<PathBuf>,

    /// Per-frame face landmarks (JSON) from an external detector
    #[arg(long, value_name = "FILE")]
    pub landmarks: Option<PathBuf>,

    /// Write stabilized frames, masks and debug frames to this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Population preset id, or `classic`
    #[arg(long, value_name = "ID", value_parser = parse_preset)]
    pub preset: Option<PresetChoice>,

    /// Blink suppression mode (off, light, moderate, aggressive)
    #[arg(long, value_name = "MODE", value_parser = parse_suppression)]
    pub suppression: Option<SuppressionMode>,

    /// Disable landmark smoothing
    #[arg(long)]
    pub no_smoothing: bool,

    /// Disable blink detection
    #[arg(long)]
    pub no_blink: bool,

    /// Disable eye enhancement
    #[arg(long)]
    pub no_enhancement: bool,

    /// Disable the debug overlay
    #[arg(long)]
    pub no_debug: bool,

    /// Smoothing strength (0.0-1.0), overrides the preset
    #[arg(long, value_name = "F", value_parser = parse_smoothing)]
    pub smoothing: Option<f32>,

    /// Enhancement strength (1.0-2.0), overrides the preset
    #[arg(long, value_name = "F", value_parser = parse_enhancement)]
    pub enhancement: Option<f32>,

    /// Relative blink threshold (0.1-0.5), overrides the preset
    #[arg(long, value_name = "F", value_parser = parse_blink_threshold)]
    pub blink_threshold: Option<f32>,

    /// Eye mask dilation radius in pixels (0-50)
    #[arg(long, value_name = "N", value_parser = parse_dilation)]
    pub dilation: Option<u32>,

    /// Font for overlay labels (TTF/OTF)
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl StabilizeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in [`StabilizerSettings::default`])
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    ///
    /// For boolean flags: CLI `--no-*` always wins. Config can enable/disable
    /// only when CLI flag wasn't explicitly set.
    ///
    /// # Errors
    ///
    /// Returns an error if the config names an unknown preset or
    /// suppression mode.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Result<Self> {
        let s = &config.stabilizer;

        if args.preset.is_none() {
            args.preset = s
                .preset
                .as_deref()
                .map(str::parse)
                .transpose()
                .context("Invalid stabilizer.preset in config")?;
        }
        if args.suppression.is_none() {
            args.suppression = s
                .suppression
                .as_deref()
                .map(str::parse)
                .transpose()
                .context("Invalid stabilizer.suppression in config")?;
        }

        if !args.no_smoothing {
            args.no_smoothing = s.smoothing.is_some_and(|enabled| !enabled);
        }
        if !args.no_blink {
            args.no_blink = s.blink_detection.is_some_and(|enabled| !enabled);
        }
        if !args.no_enhancement {
            args.no_enhancement = s.enhancement.is_some_and(|enabled| !enabled);
        }
        if !args.no_debug {
            args.no_debug = config.overlay.enabled.is_some_and(|enabled| !enabled);
        }

        args.smoothing = args.smoothing.or(s.smoothing_strength);
        args.enhancement = args.enhancement.or(s.enhancement_strength);
        args.blink_threshold = args.blink_threshold.or(s.blink_threshold);
        args.dilation = args.dilation.or(s.mask_dilation);

        if args.font.is_none() {
            args.font.clone_from(&config.overlay.font);
        }
        if args.output.is_none() {
            args.output.clone_from(&config.output.dir);
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        Ok(args)
    }

    /// Builds stabilizer settings from the merged arguments.
    #[must_use]
    pub fn settings(&self) -> StabilizerSettings {
        let defaults = StabilizerSettings::default();
        StabilizerSettings {
            population: self
                .preset
                .map_or(defaults.population, PresetChoice::population),
            suppression: self.suppression.unwrap_or(defaults.suppression),
            smoothing: !self.no_smoothing,
            blink_detection: !self.no_blink,
            enhancement: !self.no_enhancement,
            debug_overlay: !self.no_debug,
            smoothing_strength: self.smoothing,
            enhancement_strength: self.enhancement,
            blink_threshold: self.blink_threshold,
            mask_dilation: self.dilation.unwrap_or(DEFAULT_MASK_DILATION),
        }
    }
}

/// Result of running the stabilize command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct StabilizeResult {
    /// Number of frames processed.
    pub frames: usize,
    /// Frames in which a face was found.
    pub faces_detected: usize,
    /// Frames reported as blinking.
    pub blink_frames: usize,
    /// Files written to the output directory.
    pub written: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the stabilize command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &StabilizeArgs) -> Result<StabilizeResult> {
    info!("Running stabilize command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let mut stabilizer = EyeStabilizer::new(args.settings())?;
    if let Some(ref font) = args.font {
        stabilizer = stabilizer.with_overlay(OverlayStyle::new().with_font(load_font(font)?));
    }

    let detector = args
        .landmarks
        .as_deref()
        .map(JsonLandmarkDetector::from_path)
        .transpose()?;

    let source = FsFrameSource::new(args.paths.clone());
    let (paths, frames) = collect_sequence(&source)?;
    debug!("Loaded {} frames", paths.len());

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(Some(frames.len() as u64), args.quiet, show_progress);

    let output = stabilizer.stabilize_with(
        &frames,
        detector.as_ref().map(|d| d as &dyn LandmarkDetector),
        &progress_bar,
        None,
    )?;

    let written = match args.output {
        Some(ref dir) => FsFrameWriter::new(dir)
            .with_masks(true)
            .with_debug(!args.no_debug)
            .write(&output)?,
        None => 0,
    };

    let report = output.to_report(iso_timestamp());
    let out = JsonOutput::stdout(args.pretty);
    out.write(&report)?;
    out.flush()?;

    // Without landmarks every frame is faceless by construction
    let exit_code = if detector.is_some() && !output.is_empty() && report.no_face_detected() {
        ExitCode::NoFace
    } else {
        ExitCode::Success
    };

    Ok(StabilizeResult {
        frames: report.frame_count,
        faces_detected: report.faces_detected,
        blink_frames: report.blink_frames,
        written,
        exit_code,
    })
}

/// Load an overlay font from disk.
fn load_font(path: &Path) -> Result<FontArc> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read font: {}", path.display()))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| anyhow::anyhow!("Invalid font {}: {e}", path.display()))
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_choice_parsing() {
        assert_eq!("classic".parse::<PresetChoice>(), Ok(PresetChoice::Classic));
        assert_eq!(
            "african".parse::<PresetChoice>(),
            Ok(PresetChoice::Population(Population::African))
        );
        assert!(parse_preset("martian").is_err_and(|e| e.contains("expected classic, auto")));
    }

    #[test]
    fn test_parse_in_range() {
        assert_eq!(parse_smoothing("0.5"), Ok(0.5));
        assert_eq!(parse_enhancement("2.5"), Err("2.5 is not in 1.0..=2.0".to_string()));
        assert!(parse_blink_threshold("abc").is_err());
        assert_eq!(parse_dilation("50"), Ok(50));
        assert!(parse_dilation("51").is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = StabilizeArgs::default().settings();
        assert_eq!(settings, StabilizerSettings::default());
    }

    #[test]
    fn test_classic_preset_clears_population() {
        let args = StabilizeArgs {
            preset: Some(PresetChoice::Classic),
            ..StabilizeArgs::default()
        };
        assert_eq!(args.settings().population, None);
    }

    #[test]
    fn test_cli_flags_beat_config() {
        let config: AppConfig = toml::from_str(
            r"
[stabilizer]
preset = 'latino'
suppression = 'light'
smoothing = false
smoothing_strength = 0.2

[output]
pretty = true
",
        )
        .unwrap();
        let args = StabilizeArgs {
            preset: Some(PresetChoice::Population(Population::African)),
            smoothing: Some(0.9),
            ..StabilizeArgs::default()
        };

        let merged = StabilizeArgs::with_config(args, &config).unwrap();
        let settings = merged.settings();
        assert_eq!(settings.population, Some(Population::African));
        assert_eq!(settings.suppression, SuppressionMode::Light);
        assert!(!settings.smoothing);
        assert_eq!(settings.smoothing_strength, Some(0.9));
        assert!(merged.pretty);
    }

    #[test]
    fn test_config_cannot_reenable_disabled_flag() {
        let config: AppConfig =
            toml::from_str("[overlay]\nenabled = true\n").unwrap();
        let args = StabilizeArgs {
            no_debug: true,
            ..StabilizeArgs::default()
        };
        let merged = StabilizeArgs::with_config(args, &config).unwrap();
        assert!(merged.no_debug);
    }

    #[test]
    fn test_bad_config_preset_is_an_error() {
        let config: AppConfig =
            toml::from_str("[stabilizer]\npreset = 'martian'\n").unwrap();
        let err = StabilizeArgs::with_config(StabilizeArgs::default(), &config)
            .err()
            .unwrap();
        let err = format!("{err:#}");
        assert!(err.contains("stabilizer.preset"), "{err}");
    }
}
