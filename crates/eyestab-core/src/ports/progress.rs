//! Progress reporting port for UI integration.

/// Events emitted while a sequence is stabilized.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// Processing started.
    Started {
        /// Number of frames in the sequence.
        total: usize,
    },
    /// A frame has been processed.
    FrameCompleted {
        /// Frame index (0-based).
        index: usize,
        /// Whether a face was found.
        face_detected: bool,
        /// Whether a blink was reported.
        blinking: bool,
    },
    /// Auto-calibration settled on a baseline.
    Calibrated {
        /// Frame on which calibration completed.
        index: usize,
        /// Learned open-eye EAR.
        baseline: f32,
    },
    /// All frames have been processed.
    Finished {
        /// Frames processed.
        frames: usize,
        /// Frames in which a face was found.
        faces_detected: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
