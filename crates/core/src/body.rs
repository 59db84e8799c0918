//! Body scoring: proportions, posture, composition, and vertical line.
//!
//! Posture is scored only when the provider could measure it; the weight
//! table follows from that and nothing else.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationParams, ConfidenceGate, BODY_CALIBRATION};
use crate::error::EngineError;
use crate::measurements::{BodyMeasurements, Measurement, PostureAngles};
use crate::overall::{overall_score, OverallScore};
use crate::pillar::{aggregate, Pillar, PillarInput, PillarScore, SubScore, WeightTable};
use crate::ratio::{RatioSignal, RatioSpec, BODY_TIERS};
use crate::threshold_validation::validate_positive;

pub const BODY_WEIGHTS_WITH_POSTURE: &[(Pillar, f64)] = &[
    (Pillar::Proportions, 0.35),
    (Pillar::Posture, 0.20),
    (Pillar::Composition, 0.25),
    (Pillar::VerticalLine, 0.20),
];

pub const BODY_WEIGHTS_WITHOUT_POSTURE: &[(Pillar, f64)] = &[
    (Pillar::Proportions, 0.45),
    (Pillar::Composition, 0.30),
    (Pillar::VerticalLine, 0.25),
];

pub const BODY_IMPROVABILITY: &[(Pillar, f64)] = &[(Pillar::Posture, 0.7), (Pillar::Composition, 0.5)];

/// Degrees of deviation at which a posture sub-score falls to `1/e`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PostureTolerances {
    pub forward_head: f64,
    pub shoulder_tilt: f64,
    pub pelvic_tilt: f64,
}

pub const DEFAULT_POSTURE_TOLERANCES: PostureTolerances = PostureTolerances {
    forward_head: 15.0,
    shoulder_tilt: 5.0,
    pelvic_tilt: 10.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRatioSpecs {
    pub shoulder_to_waist: RatioSpec,
    pub waist_to_hip: RatioSpec,
    pub leg_to_torso: RatioSpec,
    pub leg_to_height: RatioSpec,
    pub head_to_height: RatioSpec,
}

impl BodyRatioSpecs {
    pub fn standard() -> Result<Self, EngineError> {
        Ok(Self {
            shoulder_to_waist: RatioSpec::new(1.45, 0.2, BODY_TIERS)?,
            waist_to_hip: RatioSpec::new(0.75, 0.2, BODY_TIERS)?,
            leg_to_torso: RatioSpec::new(1.25, 0.2, BODY_TIERS)?,
            leg_to_height: RatioSpec::new(0.47, 0.2, BODY_TIERS)?,
            head_to_height: RatioSpec::new(0.13, 0.2, BODY_TIERS)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BodyScoringConfig {
    pub specs: BodyRatioSpecs,
    pub posture: PostureTolerances,
    with_posture: WeightTable,
    without_posture: WeightTable,
    pub calibration: CalibrationParams,
    pub improvability: Vec<(Pillar, f64)>,
}

impl BodyScoringConfig {
    pub fn new(
        specs: BodyRatioSpecs,
        posture: PostureTolerances,
        with_posture: &[(Pillar, f64)],
        without_posture: &[(Pillar, f64)],
        calibration: CalibrationParams,
        improvability: &[(Pillar, f64)],
    ) -> Result<Self, EngineError> {
        for (tolerance, name) in [
            (posture.forward_head, "forward_head tolerance"),
            (posture.shoulder_tilt, "shoulder_tilt tolerance"),
            (posture.pelvic_tilt, "pelvic_tilt tolerance"),
        ] {
            validate_positive(tolerance, name).map_err(EngineError::InvalidConfig)?;
        }
        calibration.validate()?;
        Ok(Self {
            specs,
            posture,
            with_posture: WeightTable::new(with_posture)?,
            without_posture: WeightTable::new(without_posture)?,
            calibration,
            improvability: improvability.to_vec(),
        })
    }

    pub fn standard() -> Result<Self, EngineError> {
        Self::new(
            BodyRatioSpecs::standard()?,
            DEFAULT_POSTURE_TOLERANCES,
            BODY_WEIGHTS_WITH_POSTURE,
            BODY_WEIGHTS_WITHOUT_POSTURE,
            BODY_CALIBRATION,
            BODY_IMPROVABILITY,
        )
    }

    pub fn table_for(&self, has_posture: bool) -> &WeightTable {
        if has_posture {
            &self.with_posture
        } else {
            &self.without_posture
        }
    }
}

// ---------------------------------------------------------------------------
// Body type
// ---------------------------------------------------------------------------

/// Somatotype probabilities; each in `(0, 1)`, together summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyTypeDistribution {
    pub ectomorph: f64,
    pub mesomorph: f64,
    pub endomorph: f64,
}

impl BodyTypeDistribution {
    /// Softmax over logits from v-taper, composition softness, and
    /// waist-to-hip.
    pub fn estimate(m: &BodyMeasurements, specs: &BodyRatioSpecs) -> Self {
        let v_taper = m.proportions.shoulder_to_waist.value / specs.shoulder_to_waist.ideal_mid();
        let softness = m.composition.mean();
        let waist_excess = m.proportions.waist_to_hip.value - specs.waist_to_hip.ideal_mid();

        let logits = [
            // Narrow frame with little mass on it.
            -3.0 * (v_taper - 1.0).abs() + 2.0 * (0.5 - softness) - 3.0 * waist_excess.max(0.0),
            // Pronounced taper and low softness.
            4.0 * (v_taper - 1.0) + 3.0 * (0.5 - softness),
            // Soft composition and a wide waist.
            4.0 * (softness - 0.5) + 6.0 * waist_excess,
        ];

        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps = logits.map(|l| (l - max).exp());
        let total: f64 = exps.iter().sum();

        Self {
            ectomorph: exps[0] / total,
            mesomorph: exps[1] / total,
            endomorph: exps[2] / total,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyAnalysis {
    pub has_posture: bool,
    pub pillars: Vec<PillarScore>,
    pub ratios: Vec<RatioSignal>,
    pub body_type: BodyTypeDistribution,
    pub overall: OverallScore,
}

fn posture_sub_score(name: &str, angle: Measurement, tolerance: f64) -> SubScore {
    let z = angle.value / tolerance;
    SubScore {
        name: name.to_string(),
        score: (-z * z).exp(),
        confidence: angle.confidence,
    }
}

fn posture_sub_scores(angles: &PostureAngles, tolerances: &PostureTolerances) -> Vec<SubScore> {
    vec![
        posture_sub_score("forward_head", angles.forward_head, tolerances.forward_head),
        posture_sub_score("shoulder_tilt", angles.shoulder_tilt, tolerances.shoulder_tilt),
        posture_sub_score("pelvic_tilt", angles.pelvic_tilt, tolerances.pelvic_tilt),
    ]
}

/// Score a body from checked measurements.
pub fn score_body(
    m: &BodyMeasurements,
    quality_factor: f64,
    config: &BodyScoringConfig,
    gate: &ConfidenceGate,
) -> Result<BodyAnalysis, EngineError> {
    let specs = &config.specs;

    let proportions = vec![
        specs.shoulder_to_waist.evaluate("shoulder_to_waist", m.proportions.shoulder_to_waist),
        specs.waist_to_hip.evaluate("waist_to_hip", m.proportions.waist_to_hip),
        specs.leg_to_torso.evaluate("leg_to_torso", m.proportions.leg_to_torso),
    ];
    let vertical_line = vec![
        specs.leg_to_height.evaluate("leg_to_height", m.vertical_line.leg_to_height),
        specs.head_to_height.evaluate("head_to_height", m.vertical_line.head_to_height),
    ];
    let c = &m.composition;
    let composition = vec![
        SubScore::from_severity("midsection_softness", c.midsection_softness.value, c.midsection_softness.confidence),
        SubScore::from_severity(
            "muscle_definition_deficit",
            c.muscle_definition_deficit.value,
            c.muscle_definition_deficit.confidence,
        ),
        SubScore::from_severity("limb_softness", c.limb_softness.value, c.limb_softness.confidence),
    ];

    let mut inputs = vec![
        PillarInput::new(Pillar::Proportions, proportions.iter().map(SubScore::from).collect()),
        PillarInput::new(Pillar::Composition, composition),
        PillarInput::new(Pillar::VerticalLine, vertical_line.iter().map(SubScore::from).collect()),
    ];
    let has_posture = m.posture.is_some();
    if let Some(angles) = &m.posture {
        inputs.push(PillarInput::new(Pillar::Posture, posture_sub_scores(angles, &config.posture)));
    }

    let aggregate = aggregate(config.table_for(has_posture), &inputs)?;
    let overall = overall_score(
        &aggregate,
        quality_factor,
        &config.improvability,
        &config.calibration,
        gate,
    );

    Ok(BodyAnalysis {
        has_posture,
        pillars: aggregate.pillars,
        ratios: proportions.into_iter().chain(vertical_line).collect(),
        body_type: BodyTypeDistribution::estimate(m, specs),
        overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::measurements::MeasurementReport;
    use crate::pillar::WEIGHT_SUM_EPSILON;

    fn body(full: bool) -> BodyMeasurements {
        match fixtures::body_report(full) {
            MeasurementReport::Body(m) => m,
            MeasurementReport::Face(_) => unreachable!(),
        }
    }

    fn score(m: &BodyMeasurements) -> BodyAnalysis {
        score_body(m, 1.0, &BodyScoringConfig::standard().unwrap(), &ConfidenceGate::default()).unwrap()
    }

    // -- tables ---------------------------------------------------------------

    #[test]
    fn both_body_tables_sum_to_one() {
        let config = BodyScoringConfig::standard().unwrap();
        for has_posture in [true, false] {
            assert!((config.table_for(has_posture).total() - 1.0).abs() < WEIGHT_SUM_EPSILON);
        }
    }

    #[test]
    fn posture_presence_selects_table() {
        let with = score(&body(true));
        let without = score(&body(false));
        assert!(with.has_posture);
        assert!(!without.has_posture);
        assert!(with.pillars.iter().any(|p| p.pillar == Pillar::Posture));
        assert!(without.pillars.iter().all(|p| p.pillar != Pillar::Posture));
        assert_eq!(without.pillars[0].weight, 0.45);
    }

    #[test]
    fn zero_tolerance_rejected() {
        let result = BodyScoringConfig::new(
            BodyRatioSpecs::standard().unwrap(),
            PostureTolerances {
                shoulder_tilt: 0.0,
                ..DEFAULT_POSTURE_TOLERANCES
            },
            BODY_WEIGHTS_WITH_POSTURE,
            BODY_WEIGHTS_WITHOUT_POSTURE,
            BODY_CALIBRATION,
            BODY_IMPROVABILITY,
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    // -- posture --------------------------------------------------------------

    #[test]
    fn neutral_posture_scores_one() {
        let s = posture_sub_score("forward_head", Measurement::exact(0.0), 15.0);
        assert_eq!(s.score, 1.0);
    }

    #[test]
    fn posture_score_falls_with_deviation() {
        let at_tolerance = posture_sub_score("shoulder_tilt", Measurement::exact(5.0), 5.0);
        assert!((at_tolerance.score - (-1.0f64).exp()).abs() < 1e-12);
        let negative = posture_sub_score("shoulder_tilt", Measurement::exact(-5.0), 5.0);
        assert_eq!(at_tolerance.score, negative.score);
    }

    // -- body type ------------------------------------------------------------

    #[test]
    fn distribution_is_a_probability_vector() {
        let d = score(&body(true)).body_type;
        for p in [d.ectomorph, d.mesomorph, d.endomorph] {
            assert!(p > 0.0 && p < 1.0);
        }
        assert!((d.ectomorph + d.mesomorph + d.endomorph - 1.0).abs() < 1e-12);
    }

    #[test]
    fn soft_wide_waist_leans_endomorph() {
        let mut m = body(false);
        m.composition.midsection_softness = Measurement::exact(0.9);
        m.composition.muscle_definition_deficit = Measurement::exact(0.9);
        m.composition.limb_softness = Measurement::exact(0.8);
        m.proportions.waist_to_hip = Measurement::exact(0.95);
        m.proportions.shoulder_to_waist = Measurement::exact(1.1);
        let d = BodyTypeDistribution::estimate(&m, &BodyRatioSpecs::standard().unwrap());
        assert!(d.endomorph > d.mesomorph && d.endomorph > d.ectomorph);
    }

    #[test]
    fn strong_taper_leans_mesomorph() {
        let mut m = body(false);
        m.composition.midsection_softness = Measurement::exact(0.1);
        m.composition.muscle_definition_deficit = Measurement::exact(0.1);
        m.composition.limb_softness = Measurement::exact(0.1);
        m.proportions.shoulder_to_waist = Measurement::exact(1.7);
        m.proportions.waist_to_hip = Measurement::exact(0.75);
        let d = BodyTypeDistribution::estimate(&m, &BodyRatioSpecs::standard().unwrap());
        assert!(d.mesomorph > d.ectomorph && d.mesomorph > d.endomorph);
    }

    // -- scoring --------------------------------------------------------------

    #[test]
    fn ratios_cover_proportions_and_vertical_line() {
        let names: Vec<String> = score(&body(false)).ratios.into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["shoulder_to_waist", "waist_to_hip", "leg_to_torso", "leg_to_height", "head_to_height"]
        );
    }

    #[test]
    fn overall_range_brackets_score() {
        let overall = score(&body(true)).overall;
        assert!(overall.potential_range.min <= overall.current_score10);
        assert!(overall.current_score10 <= overall.potential_range.max);
        assert!(!overall.summary.is_empty());
    }
}
