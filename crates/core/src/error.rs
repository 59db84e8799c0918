use crate::validation::PhotoValidation;

/// Errors raised by the scoring and validation engine.
///
/// A schema-version mismatch on a cache entry is a miss, not an error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The photo failed view, quality, or occlusion checks. Recoverable only
    /// by the end user re-uploading; never retried automatically.
    #[error("Photo rejected: {}", .0.rejection_reason.as_deref().unwrap_or("photo is not usable"))]
    ValidationRejected(Box<PhotoValidation>),

    /// A weight table violated its normalization invariant.
    #[error("Malformed weight table: {0}")]
    MalformedWeightTable(String),

    /// The external measurement provider failed, timed out, or returned a
    /// payload that does not parse into a known result shape.
    #[error("Upstream computation failed: {0}")]
    UpstreamComputationFailure(String),

    /// Static configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The submitted photo payload could not be unwrapped into raw bytes.
    #[error("Invalid photo encoding: {0}")]
    InvalidPhotoEncoding(String),
}

impl EngineError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamComputationFailure(_))
    }
}
