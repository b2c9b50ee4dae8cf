//! Mock implementations of core port traits.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use eyestab_core::domain::{DetectorError, FaceLandmarks, LoadedFrame, SequenceReport};
use eyestab_core::ports::{FrameSource, LandmarkDetector, ProgressEvent, ProgressSink, ReportOutput};
use image::RgbImage;

/// Mock implementation of `FrameSource` for testing.
///
/// Yields pre-built frames and tracks iteration for assertions.
pub struct MockFrameSource {
    frames: Vec<LoadedFrame>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockFrameSource {
    /// Creates a new mock source with the given frames.
    #[must_use]
    pub fn new(frames: Vec<LoadedFrame>) -> Self {
        Self {
            frames,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameSource for MockFrameSource {
    fn frames(&self) -> Box<dyn Iterator<Item = anyhow::Result<LoadedFrame>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(self.frames.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}

/// Mock implementation of `LandmarkDetector` for testing.
///
/// Replays a per-frame script and records which frames were queried.
pub struct MockLandmarkDetector {
    script: Vec<Option<FaceLandmarks>>,
    repeat_last: bool,
    unavailable: bool,
    failing: HashSet<usize>,
    calls: Arc<Mutex<Vec<usize>>>,
}

impl MockLandmarkDetector {
    /// Returns `faces[i]` for frame `i`, and no face past the end.
    #[must_use]
    pub fn scripted(faces: Vec<Option<FaceLandmarks>>) -> Self {
        Self {
            script: faces,
            repeat_last: false,
            unavailable: false,
            failing: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the same face for every frame.
    #[must_use]
    pub fn always(face: FaceLandmarks) -> Self {
        Self {
            repeat_last: true,
            ..Self::scripted(vec![Some(face)])
        }
    }

    /// Never finds a face.
    #[must_use]
    pub fn never() -> Self {
        Self::scripted(vec![])
    }

    /// Fails the availability probe.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::never()
        }
    }

    /// Makes detection fail on the given frame.
    #[must_use]
    pub fn failing_on(mut self, index: usize) -> Self {
        self.failing.insert(index);
        self
    }

    /// Frame indices passed to `detect`, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LandmarkDetector for MockLandmarkDetector {
    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self) -> Result<(), DetectorError> {
        if self.unavailable {
            return Err(DetectorError::Unavailable("mock detector disabled".into()));
        }
        Ok(())
    }

    fn detect(&self, index: usize, _frame: &RgbImage) -> Result<Option<FaceLandmarks>, DetectorError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(index);

        if self.failing.contains(&index) {
            return Err(DetectorError::Failed(format!("mock failure on frame {index}")));
        }

        let entry = if self.repeat_last {
            self.script.last()
        } else {
            self.script.get(index)
        };
        Ok(entry.cloned().flatten())
    }
}

/// Mock implementation of `ReportOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockReportOutput {
    reports: Arc<Mutex<Vec<SequenceReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockReportOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<SequenceReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockReportOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportOutput for MockReportOutput {
    fn write(&self, report: &SequenceReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `FrameCompleted` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::FrameCompleted { .. }))
            .count()
    }

    /// Returns the frame and baseline of the `Calibrated` event, if any.
    #[must_use]
    pub fn calibration(&self) -> Option<(usize, f32)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Calibrated { index, baseline } => Some((*index, *baseline)),
            _ => None,
        })
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                frames,
                faces_detected,
            } => Some((*frames, *faces_detected)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
