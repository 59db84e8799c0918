//! Sample measurement reports for tests and local runs.

use crate::measurements::{
    BodyMeasurements, BodyRatios, CompositionSeverities, FaceMeasurements, FacialThirds, FeatureSeverities,
    HarmonyRatios, Measurement, MeasurementReport, PostureAngles, PresentationSeverities, ProfileRatios,
    SymmetryRatios, VerticalLineRatios,
};
use crate::types::{PhotoSignals, PoseEstimate, QualityMetrics, SubjectMetrics};

fn m(value: f64) -> Measurement {
    Measurement::exact(value)
}

fn photo(yaw: f64, subject: SubjectMetrics) -> PhotoSignals {
    PhotoSignals {
        pose: PoseEstimate::new(yaw, 0.0, 0.0),
        quality: QualityMetrics::pristine(),
        subject,
    }
}

fn body_photo(rotation: f64, face_visible: bool) -> PhotoSignals {
    photo(
        0.0,
        SubjectMetrics {
            shoulder_rotation: rotation,
            hip_rotation: rotation,
            face_visible,
            ..SubjectMetrics::default()
        },
    )
}

/// A typical face, optionally with a side photo and profile ratios.
pub fn face_report(with_side: bool) -> MeasurementReport {
    MeasurementReport::Face(FaceMeasurements {
        front: photo(2.0, SubjectMetrics::default()),
        side: with_side.then(|| photo(75.0, SubjectMetrics::default())),
        harmony: HarmonyRatios {
            facial_index: m(1.30),
            eye_spacing: m(1.05),
            mouth_to_nose: m(1.50),
            jaw_to_cheek: m(0.88),
        },
        profile: with_side.then(|| ProfileRatios {
            nasolabial_ratio: m(0.96),
            chin_projection: Measurement::with_confidence(1.04, 0.9),
        }),
        symmetry: SymmetryRatios {
            eye_width: m(0.98),
            brow_height: m(1.02),
            mouth_corner: m(0.97),
            cheek_width: m(1.01),
        },
        thirds: FacialThirds {
            upper: m(6.0),
            middle: m(6.2),
            lower: m(6.5),
        },
        features: FeatureSeverities {
            skin_texture: Measurement::with_confidence(0.2, 0.9),
            under_eye: m(0.3),
            jawline_softness: m(0.25),
        },
        presentation: PresentationSeverities {
            grooming: m(0.1),
            lighting: m(0.2),
            expression_tension: m(0.15),
        },
    })
}

/// Every face ratio at its ideal and every severity at zero.
pub fn ideal_face() -> FaceMeasurements {
    FaceMeasurements {
        front: photo(0.0, SubjectMetrics::default()),
        side: None,
        harmony: HarmonyRatios {
            facial_index: m(1.35),
            eye_spacing: m(1.0),
            mouth_to_nose: m(1.55),
            jaw_to_cheek: m(0.85),
        },
        profile: None,
        symmetry: SymmetryRatios {
            eye_width: m(1.0),
            brow_height: m(1.0),
            mouth_corner: m(1.0),
            cheek_width: m(1.0),
        },
        thirds: FacialThirds {
            upper: m(6.0),
            middle: m(6.0),
            lower: m(6.0),
        },
        features: FeatureSeverities {
            skin_texture: m(0.0),
            under_eye: m(0.0),
            jawline_softness: m(0.0),
        },
        presentation: PresentationSeverities {
            grooming: m(0.0),
            lighting: m(0.0),
            expression_tension: m(0.0),
        },
    }
}

/// A typical body; `full` adds side and back photos and posture angles.
pub fn body_report(full: bool) -> MeasurementReport {
    MeasurementReport::Body(BodyMeasurements {
        front: body_photo(5.0, true),
        side: full.then(|| body_photo(85.0, true)),
        back: full.then(|| body_photo(90.0, false)),
        proportions: BodyRatios {
            shoulder_to_waist: m(1.40),
            waist_to_hip: m(0.78),
            leg_to_torso: m(1.20),
        },
        vertical_line: VerticalLineRatios {
            leg_to_height: m(0.46),
            head_to_height: Measurement::with_confidence(0.135, 0.9),
        },
        posture: full.then(|| PostureAngles {
            forward_head: m(8.0),
            shoulder_tilt: m(2.0),
            pelvic_tilt: m(5.0),
        }),
        composition: CompositionSeverities {
            midsection_softness: m(0.3),
            muscle_definition_deficit: m(0.35),
            limb_softness: m(0.25),
        },
    })
}
