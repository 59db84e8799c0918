//! Log-normal ratio scoring and band status.
//!
//! `score = exp(-(ln(value / ideal) / sigma)^2)` is symmetric in log space
//! (twice the ideal costs the same as half of it), lies in `(0, 1]`, and is
//! exactly 1.0 at the ideal. Status comes from the absolute percentage
//! deviation `|value / ideal - 1|` through fixed cut points.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::measurements::Measurement;
use crate::threshold_validation::validate_positive;

/// Scores at or above this value are in the top quartile and must never
/// carry an `Off` status.
pub const TOP_QUARTILE: f64 = 0.75;

/// Discrete band status of a measured ratio.
///
/// Face ratios use `Good / Ok / Off`; body ratios use
/// `Ideal / Good / Moderate / Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioStatus {
    Ideal,
    Good,
    Ok,
    Moderate,
    Off,
}

/// Upper deviation bound (inclusive) for each non-off status, ascending.
pub type TierCuts = &'static [(RatioStatus, f64)];

pub const FACE_TIERS: TierCuts = &[(RatioStatus::Good, 0.05), (RatioStatus::Ok, 0.10)];

pub const BODY_TIERS: TierCuts = &[
    (RatioStatus::Ideal, 0.05),
    (RatioStatus::Good, 0.10),
    (RatioStatus::Moderate, 0.15),
];

/// Inclusive tolerance interval around the ideal value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

/// One scored ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSignal {
    pub name: String,
    pub value: f64,
    pub ideal_mid: f64,
    pub band: Band,
    pub status: RatioStatus,
    pub score: f64,
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Pure functions
// ---------------------------------------------------------------------------

/// Log-normal proximity of `value` to `ideal`. Non-positive or non-finite
/// values score 0.0.
pub fn proximity_score(value: f64, ideal: f64, sigma: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    let z = (value / ideal).ln() / sigma;
    (-z * z).exp()
}

/// Absolute fractional deviation of `value` from `ideal`.
pub fn deviation(value: f64, ideal: f64) -> f64 {
    (value / ideal - 1.0).abs()
}

/// Map a deviation onto a status using ascending tier cuts.
pub fn classify_deviation(deviation: f64, tiers: TierCuts) -> RatioStatus {
    tiers
        .iter()
        .find(|(_, cut)| deviation <= *cut)
        .map(|(status, _)| *status)
        .unwrap_or(RatioStatus::Off)
}

// ---------------------------------------------------------------------------
// RatioSpec
// ---------------------------------------------------------------------------

/// Ideal value, tolerance width, and status tiers for one kind of ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioSpec {
    ideal_mid: f64,
    sigma: f64,
    tiers: TierCuts,
}

impl RatioSpec {
    /// Build a spec, rejecting any `sigma` wide enough that a ratio just past
    /// the last tier cut would still score in the top quartile.
    ///
    /// Deviation `d` past the cut `c` on the high side gives
    /// `|ln| > ln(1 + c)`, and on the low side `|ln| > -ln(1 - c)`, which is
    /// larger; so the smallest off-band log distance is `ln(1 + c)`. Because
    /// the score strictly decreases in `|ln|`, checking that point bounds
    /// every off-band score.
    pub fn new(ideal_mid: f64, sigma: f64, tiers: TierCuts) -> Result<Self, EngineError> {
        validate_positive(ideal_mid, "ideal_mid").map_err(EngineError::InvalidConfig)?;
        validate_positive(sigma, "sigma").map_err(EngineError::InvalidConfig)?;
        let Some(&(_, off_cut)) = tiers.last() else {
            return Err(EngineError::InvalidConfig("ratio tiers must not be empty".into()));
        };
        if tiers.windows(2).any(|w| w[0].1 >= w[1].1) || !(0.0..1.0).contains(&off_cut) {
            return Err(EngineError::InvalidConfig(
                "ratio tier cuts must be strictly ascending and below 1.0".into(),
            ));
        }
        let boundary_score = proximity_score(1.0 + off_cut, 1.0, sigma);
        if boundary_score >= TOP_QUARTILE {
            return Err(EngineError::InvalidConfig(format!(
                "sigma {sigma} is too wide: a ratio {:.0}% off ideal still scores {boundary_score:.3}",
                off_cut * 100.0
            )));
        }
        Ok(Self {
            ideal_mid,
            sigma,
            tiers,
        })
    }

    pub fn ideal_mid(&self) -> f64 {
        self.ideal_mid
    }

    /// Tolerance band spanned by the last non-off tier.
    pub fn band(&self) -> Band {
        let cut = self.tiers.last().map(|(_, c)| *c).unwrap_or(0.0);
        Band {
            min: self.ideal_mid * (1.0 - cut),
            max: self.ideal_mid * (1.0 + cut),
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        proximity_score(value, self.ideal_mid, self.sigma)
    }

    pub fn status(&self, value: f64) -> RatioStatus {
        if !value.is_finite() || value <= 0.0 {
            return RatioStatus::Off;
        }
        classify_deviation(deviation(value, self.ideal_mid), self.tiers)
    }

    /// Score a measurement under the given signal name.
    pub fn evaluate(&self, name: &str, measurement: Measurement) -> RatioSignal {
        RatioSignal {
            name: name.to_string(),
            value: measurement.value,
            ideal_mid: self.ideal_mid,
            band: self.band(),
            status: self.status(measurement.value),
            score: self.score(measurement.value),
            confidence: measurement.confidence,
        }
    }
}
