//! Tests for the port seams: frame sources, report outputs and progress.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use eyestab_core::{
    collect_sequence, EyeStabilizer, FrameError, ProgressEvent, ReportOutput, Side,
    StabilizerSettings,
};
use eyestab_test_support::{
    FaceLandmarksBuilder, MockFrameSource, MockLandmarkDetector, MockProgressSink,
    MockReportOutput, SyntheticFrameBuilder,
};

#[test]
fn test_collect_sequence_keeps_order_and_paths() {
    let source = MockFrameSource::new(vec![
        SyntheticFrameBuilder::loaded("a", SyntheticFrameBuilder::gradient(8, 4)),
        SyntheticFrameBuilder::loaded("b", SyntheticFrameBuilder::noise(8, 4, 1)),
    ]);

    let (paths, sequence) = collect_sequence(&source).unwrap();
    assert_eq!(paths, ["synthetic://a", "synthetic://b"]);
    assert_eq!(sequence.len(), 2);
    assert_eq!(sequence.frames()[0], SyntheticFrameBuilder::gradient(8, 4));
    assert_eq!(source.iteration_count(), 1);
}

#[test]
fn test_collect_sequence_rejects_mixed_sizes() {
    let source = MockFrameSource::new(vec![
        SyntheticFrameBuilder::loaded("a", SyntheticFrameBuilder::uniform(8, 4, [0.2; 3])),
        SyntheticFrameBuilder::loaded("b", SyntheticFrameBuilder::uniform(4, 8, [0.2; 3])),
    ]);

    let err = collect_sequence(&source).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FrameError>(),
        Some(FrameError::DimensionMismatch { index: 1, .. })
    ));
}

#[test]
fn test_empty_source_yields_empty_report() {
    let (_, sequence) = collect_sequence(&MockFrameSource::empty()).unwrap();
    let output = EyeStabilizer::new(StabilizerSettings::default())
        .unwrap()
        .stabilize(&sequence, Some(&MockLandmarkDetector::never()));

    let report = output.to_report("2026-01-01T00:00:00Z");
    assert_eq!(report.frame_count, 0);
    assert_eq!((report.width, report.height), (0, 0));
    assert!(report.no_face_detected());
}

#[test]
fn test_report_output_receives_report() {
    let frames = SyntheticFrameBuilder::gray_sequence(2, 64, 64);
    let face = FaceLandmarksBuilder::new(64, 64).build().unwrap();
    let output = EyeStabilizer::new(StabilizerSettings::classic())
        .unwrap()
        .stabilize(&frames, Some(&MockLandmarkDetector::always(face)));

    let sink = MockReportOutput::new();
    sink.write(&output.to_report("2026-01-01T00:00:00Z")).unwrap();
    sink.flush().unwrap();

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].faces_detected, 2);
    assert_eq!(reports[0].preset, None);
    assert_eq!(reports[0].summary, None);
    assert_eq!(sink.flush_count(), 1);
}

#[test]
fn test_progress_event_order() {
    let frames = SyntheticFrameBuilder::gray_sequence(3, 64, 64);
    let builder = FaceLandmarksBuilder::new(64, 64).with_eye_ear(Side::Right, 0.25);
    assert_eq!(builder.points().len(), eyestab_core::MESH_LANDMARK_COUNT);
    let detector = MockLandmarkDetector::scripted(vec![None, Some(builder.build().unwrap())]);
    let progress = MockProgressSink::new();

    EyeStabilizer::new(StabilizerSettings::default())
        .unwrap()
        .stabilize_with(&frames, Some(&detector), &progress, None)
        .unwrap();

    let events = progress.events();
    assert_eq!(events.first(), Some(&ProgressEvent::Started { total: 3 }));
    assert_eq!(progress.completed_count(), 3);
    assert!(matches!(
        events[2],
        ProgressEvent::FrameCompleted {
            index: 1,
            face_detected: true,
            ..
        }
    ));
    assert_eq!(progress.finished_counts(), Some((3, 1)));
}
