//! Analysis orchestration: key derivation, cached single-flight scoring,
//! and the bounded provider call.

use aesthete_core::{
    analyze_report, parse_report, validate_report, AnalysisResponse, CacheKey, EngineConfig, EngineError,
    MeasurementReport, PhotoValidation,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cache::{CacheStatus, DeterministicCache};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::options::AnalysisOptions;
use crate::provider::MeasurementProvider;
use crate::store::CacheStore;

/// A response together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub response: AnalysisResponse,
    pub cache_status: CacheStatus,
}

/// Scores photos through a measurement provider, caching deterministic
/// responses.
///
/// Created once at startup; share it behind an `Arc`.
pub struct AnalysisService<P, S> {
    provider: P,
    cache: DeterministicCache<S>,
    engine: EngineConfig,
    config: PipelineConfig,
}

impl<P: MeasurementProvider, S: CacheStore> AnalysisService<P, S> {
    pub fn new(provider: P, store: S, engine: EngineConfig, config: PipelineConfig) -> Self {
        Self {
            provider,
            cache: DeterministicCache::new(store),
            engine,
            config,
        }
    }

    pub fn cache(&self) -> &DeterministicCache<S> {
        &self.cache
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Options with the configured variation count.
    pub fn default_options(&self, locale: &str) -> AnalysisOptions {
        AnalysisOptions::new(self.config.variation_count, locale)
    }

    /// Validate and score one photo.
    ///
    /// Identical photo bytes and options return the identical response;
    /// concurrent identical requests reach the provider once. Nothing is
    /// cached when the provider fails, times out, or the photo is rejected.
    pub async fn analyze(&self, photo: &[u8], options: &AnalysisOptions) -> Result<AnalysisOutcome, PipelineError> {
        let canonical = options.canonical_value()?;
        let key = CacheKey::derive(photo, &canonical, self.config.schema_version)?;
        let request_id = Uuid::new_v4();

        tracing::debug!(
            %request_id,
            content_hash = %key.content_hash,
            options_digest = %key.options_digest,
            "Analysis requested",
        );

        let result = self
            .cache
            .get_or_compute(&key, || self.compute(request_id, &key, photo, options))
            .await;

        let (value, cache_status) = match result {
            Ok(found) => found,
            Err(e) => {
                log_failure(request_id, &key, &e);
                return Err(e);
            }
        };

        let response: AnalysisResponse = serde_json::from_value(value)
            .map_err(|e| PipelineError::Cache(format!("unreadable cache entry: {e}")))?;

        tracing::info!(
            %request_id,
            content_hash = %key.content_hash,
            cache = ?cache_status,
            score = response.result.score10(),
            "Analysis complete",
        );

        Ok(AnalysisOutcome { response, cache_status })
    }

    /// Run only the per-photo checks, uncached.
    pub async fn validate(&self, photo: &[u8], options: &AnalysisOptions) -> Result<Vec<PhotoValidation>, PipelineError> {
        options.canonical_value()?;
        let report = self.measure(Uuid::new_v4(), photo, options).await?;
        Ok(validate_report(&report, &self.engine))
    }

    async fn compute(
        &self,
        request_id: Uuid,
        key: &CacheKey,
        photo: &[u8],
        options: &AnalysisOptions,
    ) -> Result<Value, PipelineError> {
        let report = self.measure(request_id, photo, options).await?;
        let analysis = analyze_report(&report, &self.engine)?;
        let response = AnalysisResponse::new(key, options.variations as usize, analysis);
        serde_json::to_value(&response).map_err(|e| PipelineError::Cache(format!("unserializable response: {e}")))
    }

    /// Call the provider under the configured timeout and parse its payload.
    async fn measure(
        &self,
        request_id: Uuid,
        photo: &[u8],
        options: &AnalysisOptions,
    ) -> Result<MeasurementReport, PipelineError> {
        let timeout = self.config.upstream_timeout();
        tracing::debug!(%request_id, timeout_secs = timeout.as_secs(), "Calling measurement provider");

        let raw = tokio::time::timeout(timeout, self.provider.measure(photo, options))
            .await
            .map_err(|_| {
                EngineError::UpstreamComputationFailure(format!(
                    "measurement provider timed out after {}s",
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| EngineError::UpstreamComputationFailure(e.to_string()))?;

        Ok(parse_report(&raw)?)
    }
}

fn log_failure(request_id: Uuid, key: &CacheKey, error: &PipelineError) {
    match error {
        PipelineError::Engine(EngineError::ValidationRejected(v)) => tracing::info!(
            %request_id,
            content_hash = %key.content_hash,
            expected_view = ?v.expected_view,
            detected_view = ?v.detected_view,
            reason = v.rejection_reason.as_deref().unwrap_or(""),
            "Photo rejected",
        ),
        e if e.is_retryable() => tracing::warn!(
            %request_id,
            content_hash = %key.content_hash,
            error = %e,
            "Upstream failure; nothing cached",
        ),
        e => tracing::error!(
            %request_id,
            content_hash = %key.content_hash,
            error = %e,
            "Analysis failed",
        ),
    }
}
