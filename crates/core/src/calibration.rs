//! Sigmoid calibration and the confidence gate.
//!
//! The gate is applied exactly once, to the fully aggregated raw score.
//! Low-confidence inputs never produce a 0 or a 10, and marginal inputs are
//! reported with a wider potential range and a capped confidence.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::threshold_validation::{validate_positive, validate_unit_range};

/// Sigmoid shape for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationParams {
    pub steepness: f64,
    /// Raw score mapped to 5.0; sits near the population average.
    pub midpoint: f64,
}

pub const FACE_CALIBRATION: CalibrationParams = CalibrationParams {
    steepness: 9.0,
    midpoint: 0.62,
};

pub const BODY_CALIBRATION: CalibrationParams = CalibrationParams {
    steepness: 8.0,
    midpoint: 0.58,
};

impl CalibrationParams {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_positive(self.steepness, "steepness").map_err(EngineError::InvalidConfig)?;
        validate_unit_range(self.midpoint, "midpoint").map_err(EngineError::InvalidConfig)
    }
}

/// Confidence-gate policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceGate {
    /// Below this confidence the score is clamped into `[clamp_min, clamp_max]`.
    pub allow_extremes_threshold: f64,
    pub clamp_min: f64,
    pub clamp_max: f64,
    /// Below this (looser) confidence the range widens and confidence is capped.
    pub range_threshold: f64,
    pub narrow_delta: f64,
    pub wide_delta: f64,
    pub confidence_cap: f64,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self {
            allow_extremes_threshold: 0.70,
            clamp_min: 2.0,
            clamp_max: 8.0,
            range_threshold: 0.85,
            narrow_delta: 0.5,
            wide_delta: 1.5,
            confidence_cap: 0.75,
        }
    }
}

impl ConfidenceGate {
    pub fn validate(&self) -> Result<(), EngineError> {
        validate_unit_range(self.allow_extremes_threshold, "allow_extremes_threshold")
            .map_err(EngineError::InvalidConfig)?;
        validate_unit_range(self.range_threshold, "range_threshold").map_err(EngineError::InvalidConfig)?;
        validate_unit_range(self.confidence_cap, "confidence_cap").map_err(EngineError::InvalidConfig)?;
        if self.range_threshold < self.allow_extremes_threshold {
            return Err(EngineError::InvalidConfig(
                "range_threshold must not be stricter than allow_extremes_threshold".into(),
            ));
        }
        if !(0.0 <= self.clamp_min && self.clamp_min < self.clamp_max && self.clamp_max <= 10.0) {
            return Err(EngineError::InvalidConfig(format!(
                "clamp band [{}, {}] must be an ordered sub-range of [0, 10]",
                self.clamp_min, self.clamp_max
            )));
        }
        if self.narrow_delta < 0.0 || self.wide_delta < self.narrow_delta {
            return Err(EngineError::InvalidConfig(
                "wide_delta must be at least narrow_delta, and both non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Inclusive score interval on the 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

/// Output of [`calibrate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedScore {
    pub score10: f64,
    pub potential_range: ScoreRange,
    pub confidence: f64,
    pub extremes_allowed: bool,
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// `10 * sigmoid(steepness * (raw - midpoint))`, before any gating.
pub fn sigmoid_score10(raw: f64, params: &CalibrationParams) -> f64 {
    10.0 * sigmoid(params.steepness * (unit(raw) - params.midpoint))
}

/// Calibrate a raw composite with no improvement headroom.
pub fn calibrate(
    raw: f64,
    confidence: f64,
    params: &CalibrationParams,
    gate: &ConfidenceGate,
) -> CalibratedScore {
    calibrate_with_upside(raw, 0.0, confidence, params, gate)
}

/// Calibrate a raw composite, extending the potential range by the score
/// reachable with `upside` more raw score.
pub fn calibrate_with_upside(
    raw: f64,
    upside: f64,
    confidence: f64,
    params: &CalibrationParams,
    gate: &ConfidenceGate,
) -> CalibratedScore {
    let raw = unit(raw);
    let confidence = unit(confidence);
    let extremes_allowed = confidence >= gate.allow_extremes_threshold;
    let gated = |score: f64| {
        if extremes_allowed {
            score.clamp(0.0, 10.0)
        } else {
            score.clamp(gate.clamp_min, gate.clamp_max)
        }
    };

    let score10 = gated(sigmoid_score10(raw, params));
    let potential = gated(sigmoid_score10(raw + unit(upside), params));

    let (delta, reported_confidence) = if confidence < gate.range_threshold {
        (gate.wide_delta, confidence.min(gate.confidence_cap))
    } else {
        (gate.narrow_delta, confidence)
    };

    let min = gated(score10 - delta).min(score10);
    let max = gated((score10 + delta).max(potential)).max(score10);

    CalibratedScore {
        score10,
        potential_range: ScoreRange { min, max },
        confidence: reported_confidence,
        extremes_allowed,
    }
}
