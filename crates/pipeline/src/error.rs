use aesthete_core::EngineError;

/// Errors surfaced by the analysis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Validation, scoring, upstream, or configuration failure from the engine.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Caller-supplied options failed validation.
    #[error("Invalid analysis options: {0}")]
    InvalidOptions(String),

    /// The cache store failed or held an unreadable entry.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl PipelineError {
    /// Whether the same request may be retried unchanged.
    ///
    /// Only upstream failures (provider errors, timeouts, unparseable
    /// payloads) qualify; a rejected photo needs a new upload.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Engine(e) => e.is_retryable(),
            Self::InvalidOptions(_) | Self::Cache(_) => false,
        }
    }
}

impl From<validator::ValidationErrors> for PipelineError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidOptions(errors.to_string())
    }
}
