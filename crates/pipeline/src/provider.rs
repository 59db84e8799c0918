//! Measurement provider seam.
//!
//! A provider turns photo bytes into the raw measurement JSON the engine
//! parses. Vision inference lives behind this trait; the pipeline only
//! bounds it with a timeout and never caches its failures.

use std::sync::Arc;

use crate::options::AnalysisOptions;

/// Errors a measurement provider can report.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached or refused the request.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider ran but could not measure this photo.
    #[error("Measurement failed: {0}")]
    MeasurementFailed(String),

    #[error("Provider I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of raw measurement JSON for a photo.
pub trait MeasurementProvider: Send + Sync {
    /// Measure `photo` and return the provider's JSON payload.
    fn measure(
        &self,
        photo: &[u8],
        options: &AnalysisOptions,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;
}

impl<T: MeasurementProvider> MeasurementProvider for Arc<T> {
    async fn measure(&self, photo: &[u8], options: &AnalysisOptions) -> Result<String, ProviderError> {
        T::measure(self, photo, options).await
    }
}
