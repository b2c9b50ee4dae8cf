//! Per-frame stabilization over a sequence.
//!
//! For every frame, in order:
//!
//! 1. detect landmarks (on a contrast-boosted copy when the preset asks)
//! 2. smooth eye contours and irises through the tracker
//! 3. measure EAR and classify blinks
//! 4. rasterize the eye mask and blend the enhanced frame through it
//! 5. draw the debug overlay
//!
//! Frames without a face pass through untouched with an empty mask. When no
//! detector is usable, every frame gets full-frame sharpening instead.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbImage;
use tracing::{debug, info, warn};

use super::blink::BlinkDetector;
use super::ear::calculate_ear;
use super::settings::{ResolvedParams, StabilizerSettings};
use super::tracker::LandmarkTracker;
use crate::domain::{
    ConfigError, EyeLandmarks, Frame, FrameReport, FrameSequence, Mask, Preset, Region,
    SequenceReport, Side, StabilizeError, SuppressionMode,
};
use crate::imaging::{
    adjust_contrast, adjust_sharpness, draw_overlay, enhance_eyes, eye_mask, to_frame, to_mask,
    to_rgb8, OverlayStyle,
};
use crate::ports::{LandmarkDetector, NoopProgress, ProgressEvent, ProgressSink};

/// Frames between progress log lines.
const LOG_INTERVAL: usize = 10;

/// Stabilizes eye regions across frame sequences.
///
/// Holds only immutable configuration. All tracking state lives for a single
/// call, so one stabilizer can serve concurrent sequences.
#[derive(Debug, Clone)]
pub struct EyeStabilizer {
    settings: StabilizerSettings,
    params: ResolvedParams,
    overlay: OverlayStyle,
}

impl EyeStabilizer {
    /// Creates a stabilizer, resolving presets and validating overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any parameter is out of range.
    pub fn new(settings: StabilizerSettings) -> Result<Self, ConfigError> {
        let params = settings.resolve()?;
        Ok(Self {
            settings,
            params,
            overlay: OverlayStyle::new(),
        })
    }

    /// Sets how overlay text is rendered on debug frames.
    #[must_use]
    pub fn with_overlay(mut self, overlay: OverlayStyle) -> Self {
        self.overlay = overlay;
        self
    }

    /// Settings this stabilizer was built from.
    #[must_use]
    pub const fn settings(&self) -> &StabilizerSettings {
        &self.settings
    }

    /// Parameters resolved from the settings.
    #[must_use]
    pub const fn params(&self) -> &ResolvedParams {
        &self.params
    }

    /// Stabilizes a sequence.
    ///
    /// `detector` may be `None`, in which case the fallback path runs.
    #[must_use]
    pub fn stabilize(
        &self,
        frames: &FrameSequence,
        detector: Option<&dyn LandmarkDetector>,
    ) -> StabilizationOutput {
        self.run(frames, detector, &NoopProgress, None).0
    }

    /// Stabilizes a sequence, reporting progress and honouring cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`StabilizeError::Cancelled`] if `cancel` is set before all
    /// frames are processed.
    pub fn stabilize_with(
        &self,
        frames: &FrameSequence,
        detector: Option<&dyn LandmarkDetector>,
        progress: &dyn ProgressSink,
        cancel: Option<&AtomicBool>,
    ) -> Result<StabilizationOutput, StabilizeError> {
        let (output, cancelled) = self.run(frames, detector, progress, cancel);
        if cancelled {
            return Err(StabilizeError::Cancelled {
                processed: output.frames.len(),
            });
        }
        Ok(output)
    }

    fn run(
        &self,
        frames: &FrameSequence,
        detector: Option<&dyn LandmarkDetector>,
        progress: &dyn ProgressSink,
        cancel: Option<&AtomicBool>,
    ) -> (StabilizationOutput, bool) {
        let total = frames.len();
        self.log_start(total);

        let detector = match detector {
            None => {
                warn!("No landmark detector configured; falling back to full-frame enhancement");
                None
            }
            Some(d) => match d.probe() {
                Ok(()) => {
                    debug!("Using landmark detector '{}'", d.name());
                    Some(d)
                }
                Err(e) => {
                    warn!("{e}; falling back to full-frame enhancement");
                    None
                }
            },
        };

        let mut state = SequenceState::new(&self.settings, &self.params, &self.overlay, detector);
        let mut output = StabilizationOutput::new(&self.params, frames.dimensions(), detector.is_some());
        progress.on_event(ProgressEvent::Started { total });

        let mut cancelled = false;
        for (index, frame) in frames.iter().enumerate() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                warn!("Stabilization cancelled after {index} frame(s)");
                cancelled = true;
                break;
            }

            let calibrating = state.blink.is_calibrating();
            let processed = state.process(index, frame);

            if calibrating {
                if let Some(baseline) = state.blink.calibrated_baseline() {
                    progress.on_event(ProgressEvent::Calibrated { index, baseline });
                }
            }
            progress.on_event(ProgressEvent::FrameCompleted {
                index,
                face_detected: processed.report.face_detected,
                blinking: processed.report.blinking,
            });
            output.push(processed);

            if (index + 1) % LOG_INTERVAL == 0 {
                info!("Processed {}/{} frames", index + 1, total);
            }
        }

        output.calibrated_baseline = state.blink.calibrated_baseline();
        output.summary = self.params.summary(output.calibrated_baseline);
        if let Some(summary) = &output.summary {
            info!("Completed: {summary}");
        }

        progress.on_event(ProgressEvent::Finished {
            frames: output.frames.len(),
            faces_detected: output.faces_detected(),
        });

        (output, cancelled)
    }

    fn log_start(&self, total: usize) {
        let p = &self.params;
        info!("Processing {total} frames");
        match p.preset {
            Some(preset) => info!("Preset: {}", preset.name),
            None => info!("Preset: none (classic mode)"),
        }
        info!(
            "Smoothing: {:.2}, enhancement: {:.2}, blink threshold: {:.2}",
            p.smoothing_strength, p.enhancement_strength, p.blink_threshold
        );
        info!(
            "Blink suppression: {} (min {} frames)",
            p.suppression_mode, p.suppression.min_run
        );
    }
}

/// Everything produced for one frame.
struct ProcessedFrame {
    frame: Frame,
    mask: Mask,
    debug: Frame,
    report: FrameReport,
}

/// Mutable state for a single sequence run.
struct SequenceState<'a> {
    settings: &'a StabilizerSettings,
    params: &'a ResolvedParams,
    overlay: &'a OverlayStyle,
    detector: Option<&'a dyn LandmarkDetector>,
    tracker: LandmarkTracker,
    blink: BlinkDetector,
}

impl<'a> SequenceState<'a> {
    fn new(
        settings: &'a StabilizerSettings,
        params: &'a ResolvedParams,
        overlay: &'a OverlayStyle,
        detector: Option<&'a dyn LandmarkDetector>,
    ) -> Self {
        Self {
            settings,
            params,
            overlay,
            detector,
            tracker: LandmarkTracker::new(),
            blink: BlinkDetector::new(params.blink_threshold, params.baseline)
                .with_suppression(params.suppression),
        }
    }

    fn process(&mut self, index: usize, frame: &Frame) -> ProcessedFrame {
        let Some(detector) = self.detector else {
            return self.fallback(index, frame);
        };

        let rgb = to_rgb8(frame);
        let detector_input = match self.params.contrast_boost {
            Some(factor) => Cow::Owned(adjust_contrast(&rgb, factor)),
            None => Cow::Borrowed(&rgb),
        };

        let face = match detector.detect(index, &detector_input) {
            Ok(face) => face,
            Err(e) => {
                warn!(frame = index, "{e}");
                None
            }
        };
        let Some(face) = face else {
            debug!(frame = index, "No face detected");
            return passthrough(index, frame);
        };

        let (width, height) = rgb.dimensions();
        let mut eyes = face.eyes(width, height);

        if self.settings.smoothing {
            self.smooth(&mut eyes);
        }

        let mut report = FrameReport {
            index,
            face_detected: true,
            ..FrameReport::default()
        };
        if self.settings.blink_detection {
            let left = calculate_ear(&eyes.left_contour);
            let right = calculate_ear(&eyes.right_contour);
            let blinking = self.blink.detect(left, right);
            report.left_ear = Some(left);
            report.right_ear = Some(right);
            report.display_ear = Some(self.blink.smooth_ear((left + right) / 2.0, blinking));
            report.blinking = blinking;
            debug!(frame = index, left, right, blinking, "Eye aspect ratio");
        }

        let mask = eye_mask(
            width,
            height,
            &[eyes.left_contour.as_slice(), eyes.right_contour.as_slice()],
            self.params.mask_dilation,
        );

        let stabilized = if self.settings.enhancement {
            to_frame(&enhance_eyes(
                &rgb,
                &mask,
                self.params.enhancement_strength,
                self.params.contrast_boost.is_some(),
            ))
        } else {
            frame.clone()
        };

        let debug_frame = if self.settings.debug_overlay {
            let mut canvas: RgbImage = rgb;
            let label = self.params.preset.map(|p| p.name);
            draw_overlay(&mut canvas, &eyes, report.blinking, label, self.overlay);
            to_frame(&canvas)
        } else {
            frame.clone()
        };

        ProcessedFrame {
            frame: stabilized,
            mask: to_mask(&mask),
            debug: debug_frame,
            report,
        }
    }

    fn smooth(&mut self, eyes: &mut EyeLandmarks) {
        let contour_strength = self.params.contour_strength();
        let iris_strength = self.params.iris_strength();

        for side in [Side::Left, Side::Right] {
            for (region, strength) in [(Region::Contour, contour_strength), (Region::Iris, iris_strength)] {
                let points = eyes.region_mut(side, region);
                *points = self.tracker.smooth(side, region, points, strength);
            }
        }
    }

    fn fallback(&self, index: usize, frame: &Frame) -> ProcessedFrame {
        if !self.settings.enhancement {
            return passthrough(index, frame);
        }
        let sharpened = adjust_sharpness(&to_rgb8(frame), self.params.enhancement_strength);
        ProcessedFrame {
            frame: to_frame(&sharpened),
            ..passthrough(index, frame)
        }
    }
}

fn passthrough(index: usize, frame: &Frame) -> ProcessedFrame {
    let (width, height) = frame.dimensions();
    ProcessedFrame {
        frame: frame.clone(),
        mask: Mask::new(width, height),
        debug: frame.clone(),
        report: FrameReport {
            index,
            ..FrameReport::default()
        },
    }
}

/// Result of stabilizing a sequence.
#[derive(Debug, Clone)]
pub struct StabilizationOutput {
    /// Stabilized frames, one per input frame.
    pub frames: Vec<Frame>,
    /// Eye masks, one per input frame.
    pub masks: Vec<Mask>,
    /// Debug visualizations, one per input frame.
    pub debug_frames: Vec<Frame>,
    /// Per-frame detail.
    pub reports: Vec<FrameReport>,
    /// One-line summary in preset mode.
    pub summary: Option<String>,
    /// Baseline learned by auto-calibration.
    pub calibrated_baseline: Option<f32>,
    /// Whether a landmark detector was usable.
    pub detector_available: bool,
    /// Preset in effect.
    pub preset: Option<&'static Preset>,
    /// Suppression mode in effect.
    pub suppression: SuppressionMode,
    /// Shared frame dimensions.
    pub dimensions: Option<(u32, u32)>,
}

impl StabilizationOutput {
    fn new(params: &ResolvedParams, dimensions: Option<(u32, u32)>, detector_available: bool) -> Self {
        Self {
            frames: Vec::new(),
            masks: Vec::new(),
            debug_frames: Vec::new(),
            reports: Vec::new(),
            summary: None,
            calibrated_baseline: None,
            detector_available,
            preset: params.preset,
            suppression: params.suppression_mode,
            dimensions,
        }
    }

    fn push(&mut self, processed: ProcessedFrame) {
        self.frames.push(processed.frame);
        self.masks.push(processed.mask);
        self.debug_frames.push(processed.debug);
        self.reports.push(processed.report);
    }

    /// Number of frames processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if no frames were processed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in which a face was found.
    #[must_use]
    pub fn faces_detected(&self) -> usize {
        self.reports.iter().filter(|r| r.face_detected).count()
    }

    /// Frames reported as blinking.
    #[must_use]
    pub fn blink_frames(&self) -> usize {
        self.reports.iter().filter(|r| r.blinking).count()
    }

    /// Builds the serializable report for this run.
    #[must_use]
    pub fn to_report(&self, timestamp: impl Into<String>) -> SequenceReport {
        let (width, height) = self.dimensions.unwrap_or_default();
        SequenceReport {
            timestamp: timestamp.into(),
            frame_count: self.frames.len(),
            width,
            height,
            preset: self.preset.map(|p| p.population),
            preset_name: self.preset.map(|p| p.name.to_string()),
            suppression: self.suppression,
            summary: self.summary.clone(),
            calibrated_baseline: self.calibrated_baseline,
            detector_available: self.detector_available,
            faces_detected: self.faces_detected(),
            blink_frames: self.blink_frames(),
            frames: self.reports.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use crate::domain::{DetectorError, FaceLandmarks, Point, MESH_LANDMARK_COUNT};
    use image::Rgb;
    use std::sync::Mutex;

    /// Returns the same face on every frame.
    struct FixedFace(FaceLandmarks);

    impl LandmarkDetector for FixedFace {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _index: usize, _frame: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError> {
            Ok(Some(self.0.clone()))
        }
    }

    struct Unavailable;

    impl LandmarkDetector for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn probe(&self) -> Result<(), DetectorError> {
            Err(DetectorError::Unavailable("no model".into()))
        }

        fn detect(&self, _index: usize, _frame: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError> {
            Err(DetectorError::Failed("should not be called".into()))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<ProgressEvent>>);

    impl ProgressSink for Recorder {
        fn on_event(&self, event: ProgressEvent) {
            self.0.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(event);
        }
    }

    fn face() -> FaceLandmarks {
        let mut points = vec![Point::new(0.5, 0.5); MESH_LANDMARK_COUNT];
        let contour = [(0.2, 0.5), (0.25, 0.45), (0.3, 0.45), (0.35, 0.5), (0.3, 0.55), (0.25, 0.55)];
        for (slot, &(x, y)) in crate::domain::LEFT_EYE_CONTOUR.iter().zip(&contour) {
            points[*slot] = Point::new(x, y);
        }
        for (slot, &(x, y)) in crate::domain::RIGHT_EYE_CONTOUR.iter().zip(&contour) {
            points[*slot] = Point::new(x + 0.4, y);
        }
        match FaceLandmarks::new(points) {
            Ok(face) => face,
            Err(e) => panic!("valid face: {e}"),
        }
    }

    fn sequence(n: usize) -> FrameSequence {
        let frames = (0..n)
            .map(|i| Frame::from_fn(40, 20, |x, y| Rgb([(x as f32) / 40.0, (y as f32) / 20.0, (i as f32) / 10.0])))
            .collect();
        match FrameSequence::new(frames) {
            Ok(seq) => seq,
            Err(e) => panic!("valid sequence: {e}"),
        }
    }

    fn stabilizer(settings: StabilizerSettings) -> EyeStabilizer {
        match EyeStabilizer::new(settings) {
            Ok(s) => s,
            Err(e) => panic!("valid settings: {e}"),
        }
    }

    #[test]
    fn test_empty_sequence() {
        let out = stabilizer(StabilizerSettings::default()).stabilize(&FrameSequence::default(), None);
        assert!(out.is_empty());
        assert_eq!(out.to_report("t").frame_count, 0);
    }

    #[test]
    fn test_no_detector_zero_masks() {
        let seq = sequence(3);
        let out = stabilizer(StabilizerSettings::default()).stabilize(&seq, None);
        assert_eq!(out.len(), 3);
        assert!(!out.detector_available);
        assert!(out.masks.iter().all(|m| m.pixels().all(|p| p.0[0].abs() < f32::EPSILON)));
        assert_eq!(out.debug_frames[1], seq.frames()[1]);
        assert_eq!(out.faces_detected(), 0);
    }

    #[test]
    fn test_unavailable_detector_falls_back() {
        let seq = sequence(2);
        let settings = StabilizerSettings::default();
        let settings = StabilizerSettings { enhancement: false, ..settings };
        let out = stabilizer(settings).stabilize(&seq, Some(&Unavailable));
        assert!(!out.detector_available);
        assert_eq!(out.frames[0], seq.frames()[0]);
    }

    #[test]
    fn test_face_produces_mask_and_reports() {
        let seq = sequence(6);
        let detector = FixedFace(face());
        let out = stabilizer(StabilizerSettings::classic()).stabilize(&seq, Some(&detector));

        assert_eq!(out.faces_detected(), 6);
        assert!(out.reports.iter().all(|r| r.left_ear.is_some() && r.display_ear.is_some()));
        assert!(out.masks.iter().all(|m| m.pixels().any(|p| p.0[0] > 0.5)));
        assert_eq!(out.summary, None);
    }

    #[test]
    fn test_toggles_disable_stages() {
        let seq = sequence(2);
        let detector = FixedFace(face());
        let settings = StabilizerSettings {
            blink_detection: false,
            enhancement: false,
            debug_overlay: false,
            ..StabilizerSettings::default()
        };
        let out = stabilizer(settings).stabilize(&seq, Some(&detector));

        assert_eq!(out.frames, seq.frames());
        assert_eq!(out.debug_frames, seq.frames());
        assert!(out.reports.iter().all(|r| r.left_ear.is_none() && !r.blinking));
    }

    #[test]
    fn test_summary_in_preset_mode() {
        let seq = sequence(2);
        let settings = StabilizerSettings::default().with_population(crate::domain::Population::Latino);
        let out = stabilizer(settings).stabilize(&seq, Some(&FixedFace(face())));
        assert_eq!(
            out.summary.as_deref(),
            Some("Latino / Hispanic: Balanced settings for diverse Latino features")
        );
    }

    #[test]
    fn test_progress_events() {
        let seq = sequence(3);
        let recorder = Recorder::default();
        let result = stabilizer(StabilizerSettings::default()).stabilize_with(&seq, None, &recorder, None);
        assert!(result.is_ok());

        let events = recorder.0.into_inner().unwrap_or_else(std::sync::PoisonError::into_inner);
        assert_eq!(events.first(), Some(&ProgressEvent::Started { total: 3 }));
        assert_eq!(
            events.last(),
            Some(&ProgressEvent::Finished {
                frames: 3,
                faces_detected: 0
            })
        );
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_cancellation() {
        let seq = sequence(3);
        let flag = AtomicBool::new(true);
        let result = stabilizer(StabilizerSettings::default()).stabilize_with(&seq, None, &NoopProgress, Some(&flag));
        assert_eq!(result.err(), Some(StabilizeError::Cancelled { processed: 0 }));
    }
}
