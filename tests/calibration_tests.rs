//! Integration tests for calibration state, persistence and round trips

use body_measure::calibration::{shared_store, CalibrationEngine, CalibrationSource, PixelPoint};
use body_measure::constants::{PRESET_PIXELS_PER_CM, PRESET_PIXEL_SPAN, PRESET_SPAN_CM};
use body_measure::store::CalibrationStore;
use tempfile::TempDir;

fn engine_in(dir: &TempDir) -> CalibrationEngine {
    let store = shared_store(CalibrationStore::new(dir.path().join("calibration.json")));
    CalibrationEngine::new(store, PRESET_PIXELS_PER_CM)
}

#[test]
fn test_initializes_to_preset_when_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_in(&dir);

    assert_eq!(engine.source(), CalibrationSource::Preset);
    let scale = engine.scale().unwrap();
    assert!((scale - PRESET_PIXEL_SPAN / PRESET_SPAN_CM).abs() < 1e-12);

    // 650 px should read as 96 cm under the preset
    let cm = engine.pixels_to_cm(650.0, None).unwrap();
    assert!((cm - 96.0).abs() < 1e-9);
}

#[test]
fn test_manual_calibration_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);

    // A 30 cm ruler spanning a diagonal in the frame
    let p1 = PixelPoint::new(100.0, 100.0);
    let p2 = PixelPoint::new(280.0, 340.0);
    engine.calibrate_manual(&[p1, p2], 30.0).unwrap();

    // Pixel distance between the same two points converts back to 30 cm
    let pixel_distance = ((280.0f64 - 100.0).powi(2) + (340.0f64 - 100.0).powi(2)).sqrt();
    let cm = engine.pixels_to_cm(pixel_distance, None).unwrap();
    assert!((cm - 30.0).abs() < 1e-9);
}

#[test]
fn test_calibration_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_in(&dir);
        engine.set_scale(11.5).unwrap();
    }

    // A new engine over the same store picks up the saved value
    let engine = engine_in(&dir);
    assert_eq!(engine.scale(), Some(11.5));
    assert_eq!(engine.source(), CalibrationSource::Manual);
}

#[test]
fn test_rejected_calibration_retains_prior_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_scale(9.0).unwrap();

    // One point: rejected
    assert!(engine.calibrate_manual(&[PixelPoint::new(0.0, 0.0)], 10.0).is_err());
    // Three points: rejected
    let three = [
        PixelPoint::new(0.0, 0.0),
        PixelPoint::new(1.0, 0.0),
        PixelPoint::new(2.0, 0.0),
    ];
    assert!(engine.calibrate_manual(&three, 10.0).is_err());
    // Zero-length reference: rejected
    let two = [PixelPoint::new(0.0, 0.0), PixelPoint::new(50.0, 0.0)];
    assert!(engine.calibrate_manual(&two, 0.0).is_err());

    assert_eq!(engine.scale(), Some(9.0));
    assert_eq!(engine.source(), CalibrationSource::Manual);

    // The persisted record is also unchanged
    let reborn = engine_in(&dir);
    assert_eq!(reborn.scale(), Some(9.0));
}

#[test]
fn test_reset_then_restart_falls_back_to_preset() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut engine = engine_in(&dir);
        engine.set_scale(9.0).unwrap();
        engine.reset().unwrap();
        assert_eq!(engine.scale(), None);
    }

    let engine = engine_in(&dir);
    assert_eq!(engine.source(), CalibrationSource::Preset);
}

#[test]
fn test_multiplier_compounds_on_active_scale() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);
    engine.set_scale(10.0).unwrap();

    engine.set_multiplier(1.2).unwrap();
    assert!((engine.scale().unwrap() - 12.0).abs() < 1e-9);

    // Provenance is kept
    assert_eq!(engine.source(), CalibrationSource::Manual);
}

#[test]
fn test_unavailable_without_any_scale() {
    let dir = tempfile::tempdir().unwrap();
    let mut engine = engine_in(&dir);
    engine.reset().unwrap();

    // No persisted, preset or automatic scale: unavailable, not zero
    assert_eq!(engine.pixels_to_cm(100.0, None), None);
    assert_eq!(engine.pixels_to_cm(100.0, Some(0.0)), None);
    assert_eq!(engine.pixels_to_cm(100.0, Some(-1.0)), None);
}
