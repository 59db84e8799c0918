use aesthete_core::calibration::{calibrate, ConfidenceGate, BODY_CALIBRATION, FACE_CALIBRATION};
use aesthete_core::classifier::REASON_THREE_QUARTER;
use aesthete_core::pillar::WEIGHT_SUM_EPSILON;
use aesthete_core::types::{DetectedView, PhotoSignals, PoseEstimate, QualityMetrics, SubjectMetrics, View};
use aesthete_core::{analyze_report, fixtures, validate_photo, CacheKey, EngineConfig, EngineError, SCHEMA_VERSION};
use assert_matches::assert_matches;
use serde_json::json;

fn config() -> EngineConfig {
    EngineConfig::standard().unwrap()
}

fn pristine_face(yaw: f64) -> PhotoSignals {
    PhotoSignals {
        pose: PoseEstimate::new(yaw, 0.0, 0.0),
        quality: QualityMetrics::pristine(),
        subject: SubjectMetrics::default(),
    }
}

// -- validation ---------------------------------------------------------------

#[test]
fn straight_on_pristine_face_is_valid() {
    let v = validate_photo(&pristine_face(0.0), View::FaceFront, &config());
    assert!(v.is_valid);
    assert_eq!(v.detected_view, DetectedView::FaceFront);
    assert_eq!(v.quality_score, 1.0);
    assert!(v.issues.is_empty());
}

#[test]
fn three_quarter_face_is_rejected() {
    let v = validate_photo(&pristine_face(45.0), View::FaceFront, &config());
    assert!(!v.is_valid);
    assert_eq!(v.detected_view, DetectedView::Rejected);
    assert_eq!(v.rejection_reason.as_deref(), Some(REASON_THREE_QUARTER));
}

#[test]
fn rejected_photo_surfaces_as_validation_error() {
    let mut report = fixtures::face_report(false);
    if let aesthete_core::MeasurementReport::Face(m) = &mut report {
        m.front.pose.yaw = 45.0;
    }
    let err = analyze_report(&report, &config()).unwrap_err();
    assert!(!err.is_retryable());
    assert_matches!(err, EngineError::ValidationRejected(v) if v.detected_view == DetectedView::Rejected);
}

// -- scoring ------------------------------------------------------------------

#[test]
fn every_weight_table_is_normalized() {
    let config = config();
    for has_side in [true, false] {
        assert!((config.face().table_for(has_side).total() - 1.0).abs() < WEIGHT_SUM_EPSILON);
    }
    for has_posture in [true, false] {
        assert!((config.body().table_for(has_posture).total() - 1.0).abs() < WEIGHT_SUM_EPSILON);
    }
}

#[test]
fn low_confidence_clamps_extremes() {
    let gate = ConfidenceGate::default();
    for params in [FACE_CALIBRATION, BODY_CALIBRATION] {
        assert_eq!(calibrate(0.0, 0.5, &params, &gate).score10, 2.0);
        assert_eq!(calibrate(1.0, 0.5, &params, &gate).score10, 8.0);
    }
}

#[test]
fn analysis_is_reproducible() {
    let config = config();
    for report in [fixtures::face_report(true), fixtures::body_report(true)] {
        let first = analyze_report(&report, &config).unwrap();
        let second = analyze_report(&report, &config).unwrap();
        assert_eq!(first, second);
    }
}

// -- cache keys ---------------------------------------------------------------

#[test]
fn reordered_options_share_hash_and_seed() {
    let photo = b"same image bytes";
    let a = CacheKey::derive(photo, &json!({"locale": "en", "variations": 4}), SCHEMA_VERSION).unwrap();
    let b = CacheKey::derive(photo, &json!({"variations": 4, "locale": "en"}), SCHEMA_VERSION).unwrap();
    assert_eq!(a.content_hash, b.content_hash);
    assert_eq!(a.options_digest, b.options_digest);
    assert_eq!(a.seed(), b.seed());
}
