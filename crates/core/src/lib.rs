//! Deterministic appearance scoring and photo validation.
//!
//! This crate is pure and synchronous. Its building blocks are:
//!
//! - [`validation`]: per-photo quality, occlusion, and view checks.
//! - [`ratio`] / [`pillar`] / [`calibration`]: ratio scoring, weighted
//!   pillar aggregation, and the sigmoid calibration with its confidence gate.
//! - [`face`] / [`body`]: domain scorers built from the above.
//! - [`measurements`]: the provider payload, parsed at the boundary.
//! - [`hashing`] / [`cache`]: content hashing, seeds, and cache keys.

pub mod analysis;
pub mod body;
pub mod cache;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod error;
pub mod face;
pub mod fixtures;
pub mod hashing;
pub mod measurements;
pub mod overall;
pub mod pillar;
pub mod quality_gate;
pub mod ratio;
pub mod threshold_validation;
pub mod types;
pub mod validation;

pub use analysis::{analyze_report, validate_report, AnalysisResponse, DomainAnalysis, ReportAnalysis};
pub use cache::{CacheEntry, CacheKey, SCHEMA_VERSION};
pub use config::EngineConfig;
pub use error::EngineError;
pub use measurements::{parse_report, MeasurementReport};
pub use validation::{validate_photo, PhotoValidation};
