//! Report-level entry points: validate every photo in a report, then score.

use serde::{Deserialize, Serialize};

use crate::body::{score_body, BodyAnalysis};
use crate::cache::CacheKey;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::face::{score_face, FaceAnalysis};
use crate::hashing::variation_order;
use crate::measurements::MeasurementReport;
use crate::validation::{validate_photo, PhotoValidation};

/// Per-domain scoring result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum DomainAnalysis {
    Face(FaceAnalysis),
    Body(BodyAnalysis),
}

impl DomainAnalysis {
    pub fn score10(&self) -> f64 {
        match self {
            Self::Face(a) => a.overall.current_score10,
            Self::Body(a) => a.overall.current_score10,
        }
    }
}

/// A scored report together with the validations that admitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub validations: Vec<PhotoValidation>,
    pub result: DomainAnalysis,
}

/// Validate every photo in the report against the view it was submitted as.
pub fn validate_report(report: &MeasurementReport, config: &EngineConfig) -> Vec<PhotoValidation> {
    report
        .photos()
        .into_iter()
        .map(|(view, signals)| validate_photo(signals, view, config))
        .collect()
}

/// Validate, then score.
///
/// The first invalid photo short-circuits with
/// [`EngineError::ValidationRejected`]; nothing is scored from a photo that
/// failed validation.
pub fn analyze_report(report: &MeasurementReport, config: &EngineConfig) -> Result<ReportAnalysis, EngineError> {
    let validations = validate_report(report, config);
    if let Some(rejected) = validations.iter().find(|v| !v.is_valid) {
        return Err(EngineError::ValidationRejected(Box::new(rejected.clone())));
    }

    let quality_factor =
        validations.iter().map(|v| v.quality_score).sum::<f64>() / validations.len().max(1) as f64;

    let result = match report {
        MeasurementReport::Face(m) => {
            DomainAnalysis::Face(score_face(m, quality_factor, config.face(), config.gate())?)
        }
        MeasurementReport::Body(m) => {
            DomainAnalysis::Body(score_body(m, quality_factor, config.body(), config.gate())?)
        }
    };

    Ok(ReportAnalysis { validations, result })
}

/// The value returned to callers and persisted in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub schema_version: u32,
    pub content_hash: String,
    pub options_digest: String,
    pub seed: u64,
    /// Presentation order for result variations, driven by `seed`.
    pub variation_order: Vec<usize>,
    pub validations: Vec<PhotoValidation>,
    pub result: DomainAnalysis,
}

impl AnalysisResponse {
    pub fn new(key: &CacheKey, variations: usize, analysis: ReportAnalysis) -> Self {
        let seed = key.seed();
        Self {
            schema_version: key.schema_version,
            content_hash: key.content_hash.clone(),
            options_digest: key.options_digest.clone(),
            seed,
            variation_order: variation_order(seed, variations),
            validations: analysis.validations,
            result: analysis.result,
        }
    }
}
