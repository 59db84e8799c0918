//! Overall score assembly shared by the face and body scorers.

use serde::{Deserialize, Serialize};

use crate::calibration::{calibrate_with_upside, CalibrationParams, ConfidenceGate, ScoreRange};
use crate::pillar::{Aggregate, Pillar, PillarScore};

/// The single reported score for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    pub current_score10: f64,
    pub potential_range: ScoreRange,
    pub confidence: f64,
    pub summary: String,
}

/// Raw score recoverable by improving the pillars a person can change.
///
/// `Σ weight * (1 - raw) * improvability` over the listed pillars.
pub fn compute_upside(pillars: &[PillarScore], improvability: &[(Pillar, f64)]) -> f64 {
    pillars
        .iter()
        .map(|p| {
            let factor = improvability
                .iter()
                .find(|(pillar, _)| *pillar == p.pillar)
                .map(|(_, f)| *f)
                .unwrap_or(0.0);
            p.weight * (1.0 - p.raw_score) * factor
        })
        .sum()
}

/// Calibrate an aggregate into an [`OverallScore`].
///
/// `quality_factor` is the mean quality score of the admitted photos and
/// scales the aggregate confidence before the gate sees it.
pub fn overall_score(
    aggregate: &Aggregate,
    quality_factor: f64,
    improvability: &[(Pillar, f64)],
    params: &CalibrationParams,
    gate: &ConfidenceGate,
) -> OverallScore {
    let quality_factor = if quality_factor.is_finite() {
        quality_factor.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let confidence = (aggregate.confidence * quality_factor).clamp(0.0, 1.0);
    let upside = compute_upside(&aggregate.pillars, improvability);
    let calibrated = calibrate_with_upside(aggregate.raw, upside, confidence, params, gate);

    OverallScore {
        current_score10: calibrated.score10,
        potential_range: calibrated.potential_range,
        confidence: calibrated.confidence,
        summary: summarize(calibrated.score10, &aggregate.pillars),
    }
}

/// One deterministic sentence naming the score tier and the strongest and
/// weakest pillars. Ties resolve to the earlier pillar in table order.
pub fn summarize(score10: f64, pillars: &[PillarScore]) -> String {
    let tier = if score10 >= 7.5 {
        "Strong"
    } else if score10 >= 5.5 {
        "Balanced"
    } else {
        "Developing"
    };

    let mut strongest: Option<&PillarScore> = None;
    let mut weakest: Option<&PillarScore> = None;
    for p in pillars {
        if strongest.map_or(true, |s| p.raw_score > s.raw_score) {
            strongest = Some(p);
        }
        if weakest.map_or(true, |w| p.raw_score < w.raw_score) {
            weakest = Some(p);
        }
    }

    match (strongest, weakest) {
        (Some(s), Some(w)) if s.pillar != w.pillar => format!(
            "{tier} overall result ({score10:.1}/10): {} is the strongest pillar and {} has the most room to improve.",
            s.pillar.as_str(),
            w.pillar.as_str()
        ),
        _ => format!("{tier} overall result ({score10:.1}/10) with consistent scores across pillars."),
    }
}
