use ringgauge::{Calibration, CalibrationError, CalibrationMode, Detection};

fn ok_seal(size: f32) -> Detection {
    Detection::from_center(0.5, 0.5, size, size, 2, 0.9)
}

fn calibrated(reference_mm: f32, reference: &Detection) -> Calibration {
    let mut cal = Calibration::new();
    cal.set_reference_size(reference_mm).unwrap();
    cal.start_calibration().unwrap();
    cal.select_reference(reference).unwrap();
    cal.complete_calibration().unwrap();
    cal
}

#[test]
fn ten_millimeter_reference_gives_6_4_pixels_per_mm() {
    let cal = calibrated(10.0, &ok_seal(0.1));
    let ppm = cal.pixels_per_mm().unwrap();
    assert!((ppm - 6.4).abs() < 1e-4);

    let size = cal.physical_size(&ok_seal(0.1)).unwrap();
    assert!((size - 10.0).abs() < 1e-4);

    let double = cal.physical_size(&ok_seal(0.2)).unwrap();
    assert!((double - 20.0).abs() < 1e-3);
}

#[test]
fn reset_from_calibrated_clears_measurements() {
    let mut cal = calibrated(10.0, &ok_seal(0.1));
    cal.reset();
    assert_eq!(cal.mode(), CalibrationMode::Uncalibrated);
    assert!(cal.pixels_per_mm().is_none());
    assert!(cal.physical_size(&ok_seal(0.1)).is_none());
    assert_eq!(cal.reference_size_mm(), Some(10.0));
}

#[test]
fn reset_is_safe_from_every_mode() {
    let mut cal = Calibration::new();
    cal.reset();
    assert_eq!(cal.mode(), CalibrationMode::Uncalibrated);

    cal.set_reference_size(4.0).unwrap();
    cal.start_calibration().unwrap();
    cal.select_reference(&ok_seal(0.1)).unwrap();
    cal.reset();
    assert_eq!(cal.mode(), CalibrationMode::Uncalibrated);
    assert!(cal.selected_reference().is_none());
}

#[test]
fn start_requires_reference_size() {
    let mut cal = Calibration::new();
    assert_eq!(
        cal.start_calibration().unwrap_err(),
        CalibrationError::MissingReferenceSize
    );
    assert_eq!(cal.mode(), CalibrationMode::Uncalibrated);

    assert!(cal.set_reference_size(-1.0).is_err());
    assert_eq!(
        cal.start_calibration().unwrap_err(),
        CalibrationError::MissingReferenceSize
    );
}

#[test]
fn start_twice_is_rejected() {
    let mut cal = Calibration::new();
    cal.set_reference_size(10.0).unwrap();
    cal.start_calibration().unwrap();
    cal.select_reference(&ok_seal(0.1)).unwrap();
    let before = cal.clone();

    assert!(matches!(
        cal.start_calibration(),
        Err(CalibrationError::InvalidState { .. })
    ));
    assert_eq!(cal, before);
}

#[test]
fn complete_without_selection_is_incomplete() {
    let mut cal = Calibration::new();
    assert_eq!(
        cal.complete_calibration().unwrap_err(),
        CalibrationError::IncompleteSelection
    );

    cal.set_reference_size(10.0).unwrap();
    cal.start_calibration().unwrap();
    assert_eq!(
        cal.complete_calibration().unwrap_err(),
        CalibrationError::IncompleteSelection
    );
    assert_eq!(cal.mode(), CalibrationMode::AwaitingReference);
}

#[test]
fn selection_is_a_value_snapshot() {
    let mut cal = Calibration::new();
    cal.set_reference_size(10.0).unwrap();
    cal.start_calibration().unwrap();

    let mut frame = vec![ok_seal(0.1), ok_seal(0.3)];
    cal.select_reference(&frame[0]).unwrap();
    assert!(cal.is_reference(&ok_seal(0.1)));
    assert!(!cal.is_reference(&frame[1]));

    // Next frame replaces the detections; the snapshot is unaffected.
    frame.clear();
    frame.push(ok_seal(0.5));
    assert_eq!(cal.selected_reference(), Some(&ok_seal(0.1)));

    let ppm = cal.complete_calibration().unwrap();
    assert!((ppm - 6.4).abs() < 1e-4);
}

#[test]
fn reselecting_replaces_reference() {
    let mut cal = Calibration::new();
    cal.set_reference_size(10.0).unwrap();
    cal.start_calibration().unwrap();
    cal.select_reference(&ok_seal(0.1)).unwrap();
    cal.select_reference(&ok_seal(0.2)).unwrap();
    let ppm = cal.complete_calibration().unwrap();
    assert!((ppm - 12.8).abs() < 1e-3);
}

#[test]
fn recalibration_from_calibrated_uses_new_size() {
    let mut cal = calibrated(10.0, &ok_seal(0.1));
    cal.set_reference_size(20.0).unwrap();
    // The factor is untouched until the next completion.
    assert!((cal.pixels_per_mm().unwrap() - 6.4).abs() < 1e-4);

    cal.start_calibration().unwrap();
    assert_eq!(cal.mode(), CalibrationMode::AwaitingReference);
    assert!(cal.pixels_per_mm().is_none());
    cal.select_reference(&ok_seal(0.1)).unwrap();
    let ppm = cal.complete_calibration().unwrap();
    assert!((ppm - 3.2).abs() < 1e-4);
}

#[test]
fn select_after_completion_is_invalid_state() {
    let mut cal = calibrated(10.0, &ok_seal(0.1));
    let err = cal.select_reference(&ok_seal(0.2)).unwrap_err();
    assert_eq!(
        err,
        CalibrationError::InvalidState {
            op: "select a reference",
            mode: "calibrated",
        }
    );
    assert!((cal.pixels_per_mm().unwrap() - 6.4).abs() < 1e-4);
}
