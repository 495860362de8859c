//! Integration tests for the inspection session.
//!
//! Tests cover:
//! - Comparing before a reference is set fails with NoReference
//! - Detector and image errors surface as distinct variants
//! - Full detect / compare / render round through `inspect`

mod common;

use common::*;

#[test]
fn compare_without_reference_fails() {
    let session = InspectionSession::new(FixedDetections::default());
    let err = session
        .compare_against_reference(&DetectionSet::default())
        .unwrap_err();
    assert!(matches!(err, InspectError::NoReference));
}

#[test]
fn empty_reference_is_not_an_error() {
    let mut session = InspectionSession::new(FixedDetections::default());
    session.set_reference(DetectionSet::default());

    let result = session
        .compare_against_reference(&detections(&[("R1", 0, 0)]))
        .unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].status, Status::Extra);
    assert!(result.missing.is_empty());
}

#[test]
fn inspect_without_reference_skips_detector() {
    let session = InspectionSession::new(CountingDetector::new(DetectionSet::default()));
    let err = session.inspect(&board_image(50, 50)).unwrap_err();
    assert!(matches!(err, InspectError::NoReference));
    assert_eq!(session.detector().calls(), 0);
}

#[test]
fn clearing_reference_restores_error_state() {
    let mut session = InspectionSession::new(FixedDetections::default());
    session.set_reference(detections(&[("R1", 0, 0)]));
    assert!(session.reference().is_some());

    session.clear_reference();
    assert!(session.reference().is_none());
    assert!(matches!(
        session.compare_against_reference(&DetectionSet::default()),
        Err(InspectError::NoReference)
    ));
}

#[test]
fn detector_failure_is_propagated() {
    let mut session = InspectionSession::new(FailingDetector::default());
    let err = session.load_reference(&board_image(40, 40)).unwrap_err();
    assert_eq!(err.to_string(), "model weights not found");

    match err {
        InspectError::DetectionSource(source) => {
            assert_eq!(source.to_string(), "model weights not found");
        }
        other => panic!("expected DetectionSource, got {other:?}"),
    }
    assert!(session.reference().is_none());
}

#[test]
fn empty_image_is_rejected_before_detection() {
    let mut session = InspectionSession::new(CountingDetector::new(DetectionSet::default()));
    let err = session
        .load_reference(&image::DynamicImage::new_rgb8(0, 10))
        .unwrap_err();
    assert!(matches!(err, InspectError::InvalidImage { .. }));
    assert_eq!(session.detector().calls(), 0);
}

#[test]
fn load_reference_stores_detector_output() {
    let reference = detections(&[("R1", 10, 10), ("C1", 50, 10)]);
    let mut session = InspectionSession::new(FixedDetections::new(reference.clone()));

    let snapshot = session.load_reference(&board_image(100, 100)).unwrap();
    assert_eq!(snapshot.detections(), &reference);
}

#[test]
fn inspect_classifies_and_annotates() {
    let reference = detections(&[("R1", 10, 40), ("C1", 60, 40), ("C1", 100, 40)]);
    let test = detections(&[("R1", 10, 40), ("C2", 60, 40)]);

    let mut session = InspectionSession::new(FixedDetections::new(test.clone()));
    session.set_reference(reference);

    let image = board_image(200, 150);
    let inspection = session.inspect(&image).unwrap();

    assert_eq!(inspection.detections, test);
    let statuses: Vec<_> = inspection
        .result
        .entries
        .iter()
        .map(|e| (e.label.as_str(), e.status))
        .collect();
    assert_eq!(statuses, vec![("R1", Status::Correct), ("C2", Status::Extra)]);
    let missing: Vec<_> = inspection.result.missing.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(missing, vec!["C1"]);

    let palette = session.annotator().palette();
    assert_eq!(inspection.annotated.dimensions(), (200, 150));
    assert_eq!(*inspection.annotated.get_pixel(10, 40), palette.correct);
    assert_eq!(*inspection.annotated.get_pixel(60, 40), palette.extra);
}

#[test]
fn overlap_policy_applies_through_session() {
    let reference = detections(&[("U1", 10, 10)]);
    let test = detections(&[("U1", 150, 100)]);

    let mut session = InspectionSession::new(FixedDetections::default())
        .with_policy(MatchPolicy::LabelAndOverlap { min_iou: 0.5 });
    session.set_reference(reference);

    let result = session.compare_against_reference(&test).unwrap();
    assert_eq!(result.entries[0].status, Status::Extra);
    assert_eq!(result.missing.len(), 1);
}

#[test]
fn repeated_calls_do_not_accumulate_state() {
    let mut session = InspectionSession::new(FixedDetections::new(detections(&[("R1", 0, 0)])));
    session.set_reference(detections(&[("R1", 0, 0), ("C1", 30, 0)]));

    let image = board_image(64, 64);
    let first = session.inspect(&image).unwrap();
    for _ in 0..5 {
        let again = session.inspect(&image).unwrap();
        assert_eq!(again.result, first.result);
        assert_eq!(again.annotated, first.annotated);
    }
}

#[test]
fn compare_and_render_run_concurrently() {
    let reference = detections(&[("R1", 0, 0), ("C1", 30, 0)]);
    let image = board_image(80, 80);
    let annotator = pcbinspect::Annotator::new();

    let expected = pcbinspect::compare(&reference, &detections(&[("R1", 0, 0)]));
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let result = pcbinspect::compare(&reference, &detections(&[("R1", 0, 0)]));
                    let annotated = annotator.render(&image, &result).unwrap();
                    (result, annotated)
                })
            })
            .collect();
        let outputs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for (result, annotated) in &outputs {
            assert_eq!(result, &expected);
            assert_eq!(annotated, &outputs[0].1);
        }
    });
}
