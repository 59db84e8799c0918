//! Face scoring: harmony, symmetry, thirds, feature, and presentation.
//!
//! The weight table is chosen by whether a side photo (and with it the
//! profile ratios) is present; the caller never picks it.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationParams, ConfidenceGate, FACE_CALIBRATION};
use crate::error::EngineError;
use crate::measurements::{FaceMeasurements, Measurement};
use crate::overall::{overall_score, OverallScore};
use crate::pillar::{aggregate, Pillar, PillarInput, PillarScore, SubScore, WeightTable};
use crate::ratio::{RatioSignal, RatioSpec, FACE_TIERS};

pub const FACE_WEIGHTS_WITH_SIDE: &[(Pillar, f64)] = &[
    (Pillar::Harmony, 0.25),
    (Pillar::Symmetry, 0.20),
    (Pillar::Thirds, 0.15),
    (Pillar::Feature, 0.25),
    (Pillar::Presentation, 0.15),
];

pub const FACE_WEIGHTS_FRONT_ONLY: &[(Pillar, f64)] = &[
    (Pillar::Harmony, 0.20),
    (Pillar::Symmetry, 0.25),
    (Pillar::Thirds, 0.20),
    (Pillar::Feature, 0.20),
    (Pillar::Presentation, 0.15),
];

/// Share of each pillar's shortfall a person can realistically recover.
pub const FACE_IMPROVABILITY: &[(Pillar, f64)] = &[(Pillar::Presentation, 0.6), (Pillar::Feature, 0.3)];

/// Ideal values and tolerances for every face ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRatioSpecs {
    pub facial_index: RatioSpec,
    pub eye_spacing: RatioSpec,
    pub mouth_to_nose: RatioSpec,
    pub jaw_to_cheek: RatioSpec,
    pub nasolabial_ratio: RatioSpec,
    pub chin_projection: RatioSpec,
    /// Shared by every left/right pair.
    pub symmetry: RatioSpec,
    /// Shared by both thirds ratios.
    pub thirds: RatioSpec,
}

impl FaceRatioSpecs {
    pub fn standard() -> Result<Self, EngineError> {
        Ok(Self {
            facial_index: RatioSpec::new(1.35, 0.15, FACE_TIERS)?,
            eye_spacing: RatioSpec::new(1.0, 0.15, FACE_TIERS)?,
            mouth_to_nose: RatioSpec::new(1.55, 0.15, FACE_TIERS)?,
            jaw_to_cheek: RatioSpec::new(0.85, 0.15, FACE_TIERS)?,
            nasolabial_ratio: RatioSpec::new(1.0, 0.15, FACE_TIERS)?,
            chin_projection: RatioSpec::new(1.0, 0.15, FACE_TIERS)?,
            symmetry: RatioSpec::new(1.0, 0.08, FACE_TIERS)?,
            thirds: RatioSpec::new(1.0, 0.15, FACE_TIERS)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FaceScoringConfig {
    pub specs: FaceRatioSpecs,
    with_side: WeightTable,
    front_only: WeightTable,
    pub calibration: CalibrationParams,
    pub improvability: Vec<(Pillar, f64)>,
}

impl FaceScoringConfig {
    pub fn new(
        specs: FaceRatioSpecs,
        with_side: &[(Pillar, f64)],
        front_only: &[(Pillar, f64)],
        calibration: CalibrationParams,
        improvability: &[(Pillar, f64)],
    ) -> Result<Self, EngineError> {
        calibration.validate()?;
        Ok(Self {
            specs,
            with_side: WeightTable::new(with_side)?,
            front_only: WeightTable::new(front_only)?,
            calibration,
            improvability: improvability.to_vec(),
        })
    }

    pub fn standard() -> Result<Self, EngineError> {
        Self::new(
            FaceRatioSpecs::standard()?,
            FACE_WEIGHTS_WITH_SIDE,
            FACE_WEIGHTS_FRONT_ONLY,
            FACE_CALIBRATION,
            FACE_IMPROVABILITY,
        )
    }

    /// The weight table for the available inputs.
    pub fn table_for(&self, has_side_photo: bool) -> &WeightTable {
        if has_side_photo {
            &self.with_side
        } else {
            &self.front_only
        }
    }
}

/// Full face result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceAnalysis {
    pub has_side_photo: bool,
    pub pillars: Vec<PillarScore>,
    pub ratios: Vec<RatioSignal>,
    pub overall: OverallScore,
}

/// Divide two lengths into a ratio measurement, keeping the weaker confidence.
fn length_ratio(numerator: Measurement, denominator: Measurement) -> Measurement {
    Measurement::with_confidence(
        numerator.value / denominator.value,
        numerator.confidence.min(denominator.confidence),
    )
}

fn severity(name: &str, m: Measurement) -> SubScore {
    SubScore::from_severity(name, m.value, m.confidence)
}

/// Score a face from checked measurements.
///
/// `quality_factor` is the mean quality score of the validated photos.
pub fn score_face(
    m: &FaceMeasurements,
    quality_factor: f64,
    config: &FaceScoringConfig,
    gate: &ConfidenceGate,
) -> Result<FaceAnalysis, EngineError> {
    let specs = &config.specs;
    let has_side_photo = m.side.is_some() && m.profile.is_some();

    let mut harmony = vec![
        specs.facial_index.evaluate("facial_index", m.harmony.facial_index),
        specs.eye_spacing.evaluate("eye_spacing", m.harmony.eye_spacing),
        specs.mouth_to_nose.evaluate("mouth_to_nose", m.harmony.mouth_to_nose),
        specs.jaw_to_cheek.evaluate("jaw_to_cheek", m.harmony.jaw_to_cheek),
    ];
    if let (true, Some(profile)) = (has_side_photo, &m.profile) {
        harmony.push(specs.nasolabial_ratio.evaluate("nasolabial_ratio", profile.nasolabial_ratio));
        harmony.push(specs.chin_projection.evaluate("chin_projection", profile.chin_projection));
    }

    let symmetry = vec![
        specs.symmetry.evaluate("eye_width_symmetry", m.symmetry.eye_width),
        specs.symmetry.evaluate("brow_height_symmetry", m.symmetry.brow_height),
        specs.symmetry.evaluate("mouth_corner_symmetry", m.symmetry.mouth_corner),
        specs.symmetry.evaluate("cheek_width_symmetry", m.symmetry.cheek_width),
    ];

    let thirds = vec![
        specs.thirds.evaluate("upper_to_middle_third", length_ratio(m.thirds.upper, m.thirds.middle)),
        specs.thirds.evaluate("lower_to_middle_third", length_ratio(m.thirds.lower, m.thirds.middle)),
    ];

    let features = vec![
        severity("skin_texture", m.features.skin_texture),
        severity("under_eye", m.features.under_eye),
        severity("jawline_softness", m.features.jawline_softness),
    ];

    let presentation = vec![
        severity("grooming", m.presentation.grooming),
        severity("lighting", m.presentation.lighting),
        severity("expression_tension", m.presentation.expression_tension),
    ];

    let inputs = [
        PillarInput::new(Pillar::Harmony, harmony.iter().map(SubScore::from).collect()),
        PillarInput::new(Pillar::Symmetry, symmetry.iter().map(SubScore::from).collect()),
        PillarInput::new(Pillar::Thirds, thirds.iter().map(SubScore::from).collect()),
        PillarInput::new(Pillar::Feature, features),
        PillarInput::new(Pillar::Presentation, presentation),
    ];

    let aggregate = aggregate(config.table_for(has_side_photo), &inputs)?;
    let overall = overall_score(
        &aggregate,
        quality_factor,
        &config.improvability,
        &config.calibration,
        gate,
    );

    let ratios = harmony.into_iter().chain(symmetry).chain(thirds).collect();

    Ok(FaceAnalysis {
        has_side_photo,
        pillars: aggregate.pillars,
        ratios,
        overall,
    })
}
