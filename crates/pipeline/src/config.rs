use std::str::FromStr;
use std::time::Duration;

use aesthete_core::{EngineError, SCHEMA_VERSION};

use crate::error::PipelineError;

/// Pipeline configuration loaded from environment variables.
///
/// Scoring constants are not configurable here; they live in
/// [`aesthete_core::EngineConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Hard limit on one measurement provider call (default: `30`).
    pub upstream_timeout_secs: u64,
    /// Schema version written into, and required of, cache entries.
    pub schema_version: u32,
    /// Variation count used when the caller does not pick one (default: `4`).
    pub variation_count: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            upstream_timeout_secs: 30,
            schema_version: SCHEMA_VERSION,
            variation_count: 4,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `UPSTREAM_TIMEOUT_SECS` | `30`                    |
    /// | `CACHE_SCHEMA_VERSION`  | built-in schema version |
    /// | `VARIATION_COUNT`       | `4`                     |
    pub fn from_env() -> Result<Self, PipelineError> {
        let defaults = Self::default();
        let config = Self {
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            schema_version: env_or("CACHE_SCHEMA_VERSION", defaults.schema_version)?,
            variation_count: env_or("VARIATION_COUNT", defaults.variation_count)?,
        };
        if config.upstream_timeout_secs == 0 {
            return Err(invalid("UPSTREAM_TIMEOUT_SECS must be greater than zero".into()));
        }
        Ok(config)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn invalid(message: String) -> PipelineError {
    PipelineError::Engine(EngineError::InvalidConfig(message))
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, PipelineError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(format!("{name} must be a valid {}, got '{raw}'", std::any::type_name::<T>()))),
        Err(_) => Ok(default),
    }
}
