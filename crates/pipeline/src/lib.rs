//! Async analysis pipeline around the pure scoring engine.
//!
//! - [`AnalysisService`]: validates options, derives the cache key, and
//!   scores through a [`MeasurementProvider`] bounded by a timeout.
//! - [`DeterministicCache`]: per-key single-flight over a [`CacheStore`].
//! - [`PipelineConfig`]: environment-driven runtime settings.

pub mod cache;
pub mod config;
pub mod error;
pub mod options;
pub mod provider;
pub mod service;
pub mod store;

pub use cache::{CacheStatus, DeterministicCache};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use options::AnalysisOptions;
pub use provider::{MeasurementProvider, ProviderError};
pub use service::{AnalysisOutcome, AnalysisService};
pub use store::{CacheStore, MemoryCacheStore};
