//! Worker-side measurement provider.
//!
//! [`FileMeasurementProvider`] stands in for the external vision model by
//! serving a pre-extracted measurement payload from disk.

use std::path::{Path, PathBuf};

use aesthete_pipeline::{AnalysisOptions, MeasurementProvider, ProviderError};

/// Reads the measurement JSON for every request from one file.
#[derive(Debug, Clone)]
pub struct FileMeasurementProvider {
    path: PathBuf,
}

impl FileMeasurementProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MeasurementProvider for FileMeasurementProvider {
    async fn measure(&self, photo: &[u8], _options: &AnalysisOptions) -> Result<String, ProviderError> {
        if photo.is_empty() {
            return Err(ProviderError::MeasurementFailed("photo is empty".into()));
        }
        let payload = tokio::fs::read_to_string(&self.path).await?;
        tracing::debug!(path = %self.path.display(), bytes = payload.len(), "Loaded measurement payload");
        Ok(payload)
    }
}
