//! Measurement boundary: the provider's JSON payload, parsed into a closed
//! tagged type.
//!
//! The provider sends `{"domain": "face" | "body", ...}`. Anything that does
//! not parse, or parses into out-of-domain values, is an upstream failure;
//! nothing is silently defaulted into a score.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::threshold_validation::{validate_positive, validate_unit_range};
use crate::types::{PhotoSignals, View};

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// One measured value with the provider's confidence in it.
///
/// Accepts either a bare number (full confidence) or
/// `{"value": .., "confidence": ..}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMeasurement")]
pub struct Measurement {
    pub value: f64,
    pub confidence: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMeasurement {
    Bare(f64),
    Detailed {
        value: f64,
        #[serde(default = "full_confidence")]
        confidence: f64,
    },
}

fn full_confidence() -> f64 {
    1.0
}

impl From<RawMeasurement> for Measurement {
    fn from(raw: RawMeasurement) -> Self {
        match raw {
            RawMeasurement::Bare(value) => Self::exact(value),
            RawMeasurement::Detailed { value, confidence } => Self { value, confidence },
        }
    }
}

impl Measurement {
    /// A measurement with full confidence.
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            confidence: 1.0,
        }
    }

    pub fn with_confidence(value: f64, confidence: f64) -> Self {
        Self { value, confidence }
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        Self::exact(value)
    }
}

// ---------------------------------------------------------------------------
// Face measurements
// ---------------------------------------------------------------------------

/// Frontal proportion ratios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarmonyRatios {
    /// Face height / face width.
    pub facial_index: Measurement,
    /// Intercanthal distance / eye width.
    pub eye_spacing: Measurement,
    /// Mouth width / nose width.
    pub mouth_to_nose: Measurement,
    /// Jaw width / cheekbone width.
    pub jaw_to_cheek: Measurement,
}

/// Profile ratios, available only with a side photo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileRatios {
    pub nasolabial_ratio: Measurement,
    pub chin_projection: Measurement,
}

/// Left / right ratios; 1.0 is perfectly symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SymmetryRatios {
    pub eye_width: Measurement,
    pub brow_height: Measurement,
    pub mouth_corner: Measurement,
    pub cheek_width: Measurement,
}

/// Vertical thirds of the face, in any consistent length unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacialThirds {
    pub upper: Measurement,
    pub middle: Measurement,
    pub lower: Measurement,
}

/// Feature severities in `[0, 1]`, 0 = none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSeverities {
    pub skin_texture: Measurement,
    pub under_eye: Measurement,
    pub jawline_softness: Measurement,
}

/// Presentation severities in `[0, 1]`, 0 = none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresentationSeverities {
    pub grooming: Measurement,
    pub lighting: Measurement,
    pub expression_tension: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMeasurements {
    pub front: PhotoSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<PhotoSignals>,
    pub harmony: HarmonyRatios,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileRatios>,
    pub symmetry: SymmetryRatios,
    pub thirds: FacialThirds,
    pub features: FeatureSeverities,
    pub presentation: PresentationSeverities,
}

// ---------------------------------------------------------------------------
// Body measurements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyRatios {
    pub shoulder_to_waist: Measurement,
    pub waist_to_hip: Measurement,
    pub leg_to_torso: Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerticalLineRatios {
    pub leg_to_height: Measurement,
    pub head_to_height: Measurement,
}

/// Postural deviations in degrees from neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureAngles {
    pub forward_head: Measurement,
    pub shoulder_tilt: Measurement,
    pub pelvic_tilt: Measurement,
}

/// Composition severities in `[0, 1]`, 0 = none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionSeverities {
    pub midsection_softness: Measurement,
    pub muscle_definition_deficit: Measurement,
    pub limb_softness: Measurement,
}

impl CompositionSeverities {
    pub fn mean(&self) -> f64 {
        (self.midsection_softness.value + self.muscle_definition_deficit.value + self.limb_softness.value) / 3.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub front: PhotoSignals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<PhotoSignals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<PhotoSignals>,
    pub proportions: BodyRatios,
    pub vertical_line: VerticalLineRatios,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture: Option<PostureAngles>,
    pub composition: CompositionSeverities,
}

// ---------------------------------------------------------------------------
// MeasurementReport
// ---------------------------------------------------------------------------

/// Everything the provider extracted for one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum MeasurementReport {
    Face(FaceMeasurements),
    Body(BodyMeasurements),
}

impl MeasurementReport {
    /// Every submitted photo paired with the view it must show.
    pub fn photos(&self) -> Vec<(View, &PhotoSignals)> {
        match self {
            Self::Face(m) => {
                let mut photos = vec![(View::FaceFront, &m.front)];
                if let Some(side) = &m.side {
                    photos.push((View::FaceSide, side));
                }
                photos
            }
            Self::Body(m) => {
                let mut photos = vec![(View::BodyFront, &m.front)];
                if let Some(side) = &m.side {
                    photos.push((View::BodySide, side));
                }
                if let Some(back) = &m.back {
                    photos.push((View::BodyBack, back));
                }
                photos
            }
        }
    }

    /// Check every value is inside its domain.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::Face(m) => check_face(m),
            Self::Body(m) => check_body(m),
        }
    }
}

/// Parse the provider's raw JSON into a checked [`MeasurementReport`].
pub fn parse_report(json: &str) -> Result<MeasurementReport, EngineError> {
    let report: MeasurementReport = serde_json::from_str(json).map_err(|e| {
        EngineError::UpstreamComputationFailure(format!("unparseable measurement payload: {e}"))
    })?;
    report.check().map_err(|e| {
        EngineError::UpstreamComputationFailure(format!("invalid measurement payload: {e}"))
    })?;
    Ok(report)
}

fn check_confidence(m: &Measurement, name: &str) -> Result<(), String> {
    validate_unit_range(m.confidence, &format!("{name}.confidence"))
}

fn check_ratio(m: &Measurement, name: &str) -> Result<(), String> {
    validate_positive(m.value, name)?;
    check_confidence(m, name)
}

fn check_severity(m: &Measurement, name: &str) -> Result<(), String> {
    validate_unit_range(m.value, name)?;
    check_confidence(m, name)
}

fn check_angle(m: &Measurement, name: &str) -> Result<(), String> {
    check_finite(m.value, name)?;
    check_confidence(m, name)
}

fn check_finite(value: f64, name: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{name} must be finite, got {value}"));
    }
    Ok(())
}

/// Pose, quality, and subject signals of one photo.
fn check_signals(s: &PhotoSignals, photo: &str) -> Result<(), String> {
    let p = &s.pose;
    check_finite(p.yaw, &format!("{photo}.pose.yaw"))?;
    check_finite(p.pitch, &format!("{photo}.pose.pitch"))?;
    check_finite(p.roll, &format!("{photo}.pose.roll"))?;
    validate_unit_range(p.confidence, &format!("{photo}.pose.confidence"))?;

    let q = &s.quality;
    validate_unit_range(q.blur, &format!("{photo}.quality.blur"))?;
    validate_unit_range(q.brightness, &format!("{photo}.quality.brightness"))?;
    validate_unit_range(q.filter_score, &format!("{photo}.quality.filter_score"))?;

    let subject = &s.subject;
    validate_unit_range(subject.occlusion, &format!("{photo}.subject.occlusion"))?;
    check_finite(subject.shoulder_rotation, &format!("{photo}.subject.shoulder_rotation"))?;
    check_finite(subject.hip_rotation, &format!("{photo}.subject.hip_rotation"))
}

fn check_face(m: &FaceMeasurements) -> Result<(), String> {
    check_signals(&m.front, "front")?;
    if let Some(side) = &m.side {
        check_signals(side, "side")?;
    }
    match (&m.side, &m.profile) {
        (Some(_), None) => return Err("side photo supplied without profile ratios".into()),
        (None, Some(_)) => return Err("profile ratios supplied without a side photo".into()),
        _ => {}
    }
    let h = &m.harmony;
    check_ratio(&h.facial_index, "harmony.facial_index")?;
    check_ratio(&h.eye_spacing, "harmony.eye_spacing")?;
    check_ratio(&h.mouth_to_nose, "harmony.mouth_to_nose")?;
    check_ratio(&h.jaw_to_cheek, "harmony.jaw_to_cheek")?;
    if let Some(p) = &m.profile {
        check_ratio(&p.nasolabial_ratio, "profile.nasolabial_ratio")?;
        check_ratio(&p.chin_projection, "profile.chin_projection")?;
    }
    let s = &m.symmetry;
    check_ratio(&s.eye_width, "symmetry.eye_width")?;
    check_ratio(&s.brow_height, "symmetry.brow_height")?;
    check_ratio(&s.mouth_corner, "symmetry.mouth_corner")?;
    check_ratio(&s.cheek_width, "symmetry.cheek_width")?;
    check_ratio(&m.thirds.upper, "thirds.upper")?;
    check_ratio(&m.thirds.middle, "thirds.middle")?;
    check_ratio(&m.thirds.lower, "thirds.lower")?;
    let f = &m.features;
    check_severity(&f.skin_texture, "features.skin_texture")?;
    check_severity(&f.under_eye, "features.under_eye")?;
    check_severity(&f.jawline_softness, "features.jawline_softness")?;
    let p = &m.presentation;
    check_severity(&p.grooming, "presentation.grooming")?;
    check_severity(&p.lighting, "presentation.lighting")?;
    check_severity(&p.expression_tension, "presentation.expression_tension")
}

fn check_body(m: &BodyMeasurements) -> Result<(), String> {
    check_signals(&m.front, "front")?;
    if let Some(side) = &m.side {
        check_signals(side, "side")?;
    }
    if let Some(back) = &m.back {
        check_signals(back, "back")?;
    }
    let r = &m.proportions;
    check_ratio(&r.shoulder_to_waist, "proportions.shoulder_to_waist")?;
    check_ratio(&r.waist_to_hip, "proportions.waist_to_hip")?;
    check_ratio(&r.leg_to_torso, "proportions.leg_to_torso")?;
    check_ratio(&m.vertical_line.leg_to_height, "vertical_line.leg_to_height")?;
    check_ratio(&m.vertical_line.head_to_height, "vertical_line.head_to_height")?;
    if let Some(p) = &m.posture {
        check_angle(&p.forward_head, "posture.forward_head")?;
        check_angle(&p.shoulder_tilt, "posture.shoulder_tilt")?;
        check_angle(&p.pelvic_tilt, "posture.pelvic_tilt")?;
    }
    let c = &m.composition;
    check_severity(&c.midsection_softness, "composition.midsection_softness")?;
    check_severity(&c.muscle_definition_deficit, "composition.muscle_definition_deficit")?;
    check_severity(&c.limb_softness, "composition.limb_softness")
}
