//! Pillars, weight tables, and weighted aggregation.
//!
//! A pillar's raw score is the mean of its sub-scores. The composite raw
//! score is `Σ(pillar_raw * weight)` over a [`WeightTable`] whose weights
//! always sum to 1.0; a table that does not is rejected at construction.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::ratio::RatioSignal;

/// Tolerance for the weight-sum invariant.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-9;

/// One weighted component of a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    Harmony,
    Symmetry,
    Thirds,
    Feature,
    Presentation,
    Proportions,
    Posture,
    Composition,
    VerticalLine,
}

impl Pillar {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Harmony => "harmony",
            Self::Symmetry => "symmetry",
            Self::Thirds => "thirds",
            Self::Feature => "feature",
            Self::Presentation => "presentation",
            Self::Proportions => "proportions",
            Self::Posture => "posture",
            Self::Composition => "composition",
            Self::VerticalLine => "vertical line",
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-scores and pillar inputs
// ---------------------------------------------------------------------------

/// A normalized `[0, 1]` contribution to one pillar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    pub name: String,
    pub score: f64,
    pub confidence: f64,
}

impl SubScore {
    /// A sub-score from a `[0, 1]` severity, where 0 is flawless.
    pub fn from_severity(name: &str, severity: f64, confidence: f64) -> Self {
        Self {
            name: name.to_string(),
            score: (1.0 - severity).clamp(0.0, 1.0),
            confidence,
        }
    }
}

impl From<&RatioSignal> for SubScore {
    fn from(signal: &RatioSignal) -> Self {
        Self {
            name: signal.name.clone(),
            score: signal.score,
            confidence: signal.confidence,
        }
    }
}

/// All sub-scores feeding one pillar.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarInput {
    pub pillar: Pillar,
    pub sub_scores: Vec<SubScore>,
}

impl PillarInput {
    pub fn new(pillar: Pillar, sub_scores: Vec<SubScore>) -> Self {
        Self { pillar, sub_scores }
    }

    /// Mean score and mean confidence, or `None` with no sub-scores.
    pub fn summarize(&self) -> Option<(f64, f64)> {
        if self.sub_scores.is_empty() {
            return None;
        }
        let n = self.sub_scores.len() as f64;
        let raw = self.sub_scores.iter().map(|s| s.score).sum::<f64>() / n;
        let confidence = self.sub_scores.iter().map(|s| s.confidence).sum::<f64>() / n;
        Some((raw.clamp(0.0, 1.0), confidence.clamp(0.0, 1.0)))
    }
}

// ---------------------------------------------------------------------------
// Weight tables
// ---------------------------------------------------------------------------

/// Normalized pillar weights for one scoring context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    entries: Vec<(Pillar, f64)>,
}

impl WeightTable {
    /// Fails fast unless every weight lies in `[0, 1]`, no pillar repeats,
    /// and the weights sum to 1.0 within [`WEIGHT_SUM_EPSILON`].
    pub fn new(entries: &[(Pillar, f64)]) -> Result<Self, EngineError> {
        if entries.is_empty() {
            return Err(EngineError::MalformedWeightTable("table has no entries".into()));
        }
        for (i, (pillar, weight)) in entries.iter().enumerate() {
            if !(0.0..=1.0).contains(weight) {
                return Err(EngineError::MalformedWeightTable(format!(
                    "weight for '{}' must be between 0.0 and 1.0, got {weight}",
                    pillar.as_str()
                )));
            }
            if entries[..i].iter().any(|(p, _)| p == pillar) {
                return Err(EngineError::MalformedWeightTable(format!(
                    "pillar '{}' appears more than once",
                    pillar.as_str()
                )));
            }
        }
        let sum: f64 = entries.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(EngineError::MalformedWeightTable(format!(
                "weights sum to {sum}, expected 1.0"
            )));
        }
        Ok(Self {
            entries: entries.to_vec(),
        })
    }

    pub fn entries(&self) -> &[(Pillar, f64)] {
        &self.entries
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// One pillar's share of the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    pub pillar: Pillar,
    pub raw_score: f64,
    pub weight: f64,
    pub confidence: f64,
    /// `raw_score * weight * confidence`.
    pub contribution: f64,
}

/// Composite of all pillars under one weight table.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// `Σ(raw_score * weight)`, in `[0, 1]`.
    pub raw: f64,
    /// Weight-averaged pillar confidence.
    pub confidence: f64,
    pub pillars: Vec<PillarScore>,
}

/// Aggregate pillar inputs under `table`, in table order.
///
/// Inputs for pillars the table does not weight are ignored; a weighted
/// pillar without a usable input means the table does not fit the context
/// and is reported as a malformed table.
pub fn aggregate(table: &WeightTable, inputs: &[PillarInput]) -> Result<Aggregate, EngineError> {
    let mut raw = 0.0;
    let mut confidence = 0.0;
    let mut pillars = Vec::with_capacity(table.entries().len());

    for &(pillar, weight) in table.entries() {
        let (pillar_raw, pillar_confidence) = inputs
            .iter()
            .find(|input| input.pillar == pillar)
            .and_then(PillarInput::summarize)
            .ok_or_else(|| {
                EngineError::MalformedWeightTable(format!(
                    "no scores available for weighted pillar '{}'",
                    pillar.as_str()
                ))
            })?;

        raw += pillar_raw * weight;
        confidence += pillar_confidence * weight;
        pillars.push(PillarScore {
            pillar,
            raw_score: pillar_raw,
            weight,
            confidence: pillar_confidence,
            contribution: pillar_raw * weight * pillar_confidence,
        });
    }

    Ok(Aggregate {
        raw: raw.clamp(0.0, 1.0),
        confidence: confidence.clamp(0.0, 1.0),
        pillars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sub(score: f64, confidence: f64) -> SubScore {
        SubScore {
            name: "s".into(),
            score,
            confidence,
        }
    }

    // -- WeightTable ----------------------------------------------------------

    #[test]
    fn normalized_table_accepted() {
        let t = WeightTable::new(&[(Pillar::Harmony, 0.6), (Pillar::Symmetry, 0.4)]).unwrap();
        assert!((t.total() - 1.0).abs() < WEIGHT_SUM_EPSILON);
        assert_eq!(t.entries(), &[(Pillar::Harmony, 0.6), (Pillar::Symmetry, 0.4)]);
    }

    #[test]
    fn unnormalized_table_rejected() {
        assert_matches!(
            WeightTable::new(&[(Pillar::Harmony, 0.6), (Pillar::Symmetry, 0.5)]),
            Err(EngineError::MalformedWeightTable(msg)) if msg.contains("sum to")
        );
    }

    #[test]
    fn duplicate_pillar_rejected() {
        assert_matches!(
            WeightTable::new(&[(Pillar::Harmony, 0.5), (Pillar::Harmony, 0.5)]),
            Err(EngineError::MalformedWeightTable(_))
        );
    }

    #[test]
    fn negative_weight_rejected() {
        assert!(WeightTable::new(&[(Pillar::Harmony, 1.5), (Pillar::Symmetry, -0.5)]).is_err());
    }

    #[test]
    fn empty_table_rejected() {
        assert!(WeightTable::new(&[]).is_err());
    }

    // -- aggregate ------------------------------------------------------------

    #[test]
    fn aggregate_is_weighted_sum_of_pillar_means() {
        let table = WeightTable::new(&[(Pillar::Harmony, 0.75), (Pillar::Symmetry, 0.25)]).unwrap();
        let inputs = vec![
            PillarInput::new(Pillar::Harmony, vec![sub(1.0, 1.0), sub(0.6, 0.5)]),
            PillarInput::new(Pillar::Symmetry, vec![sub(0.4, 1.0)]),
        ];
        let agg = aggregate(&table, &inputs).unwrap();
        // Harmony mean 0.8, symmetry 0.4 => 0.8 * 0.75 + 0.4 * 0.25 = 0.7
        assert!((agg.raw - 0.7).abs() < 1e-12);
        assert!((agg.confidence - (0.75 * 0.75 + 1.0 * 0.25)).abs() < 1e-12);
        let harmony = &agg.pillars[0];
        assert!((harmony.contribution - 0.8 * 0.75 * 0.75).abs() < 1e-12);
    }

    #[test]
    fn missing_weighted_pillar_is_an_error() {
        let table = WeightTable::new(&[(Pillar::Harmony, 0.5), (Pillar::Posture, 0.5)]).unwrap();
        let inputs = vec![PillarInput::new(Pillar::Harmony, vec![sub(1.0, 1.0)])];
        assert_matches!(
            aggregate(&table, &inputs),
            Err(EngineError::MalformedWeightTable(msg)) if msg.contains("posture")
        );
    }

    #[test]
    fn empty_pillar_input_is_an_error() {
        let table = WeightTable::new(&[(Pillar::Harmony, 1.0)]).unwrap();
        let inputs = vec![PillarInput::new(Pillar::Harmony, vec![])];
        assert!(aggregate(&table, &inputs).is_err());
    }

    #[test]
    fn severity_maps_to_inverse_score() {
        let s = SubScore::from_severity("skin_texture", 0.25, 0.9);
        assert_eq!(s.score, 0.75);
        assert_eq!(s.confidence, 0.9);
    }
}
