//! Per-frame and per-sequence reports.

use serde::{Deserialize, Serialize};

use super::{Population, SuppressionMode};

/// What happened to a single frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameReport {
    /// Position in the sequence (0-based).
    pub index: usize,
    /// Whether the detector found a face.
    pub face_detected: bool,
    /// Left eye aspect ratio, when blink detection ran.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub left_ear: Option<f32>,
    /// Right eye aspect ratio, when blink detection ran.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub right_ear: Option<f32>,
    /// Average EAR after blink smoothing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_ear: Option<f32>,
    /// Whether a blink was reported for this frame.
    pub blinking: bool,
}

/// Serializable summary of a whole stabilization run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequenceReport {
    /// When the run finished (RFC 3339).
    pub timestamp: String,
    /// Number of frames processed.
    pub frame_count: usize,
    /// Frame width in pixels (0 for an empty sequence).
    pub width: u32,
    /// Frame height in pixels (0 for an empty sequence).
    pub height: u32,
    /// Population preset, absent in classic mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preset: Option<Population>,
    /// Human-readable preset name.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub preset_name: Option<String>,
    /// Blink suppression mode in effect.
    pub suppression: SuppressionMode,
    /// One-line summary, present in preset mode.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<String>,
    /// Baseline EAR learned by auto-calibration.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub calibrated_baseline: Option<f32>,
    /// Whether a landmark detector was usable for this run.
    pub detector_available: bool,
    /// Frames in which a face was found.
    pub faces_detected: usize,
    /// Frames reported as blinking.
    pub blink_frames: usize,
    /// Per-frame detail.
    pub frames: Vec<FrameReport>,
}

impl SequenceReport {
    /// Returns true if no frame contained a face.
    #[must_use]
    pub fn no_face_detected(&self) -> bool {
        self.faces_detected == 0
    }
}
