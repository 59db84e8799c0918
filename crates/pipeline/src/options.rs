//! Caller-supplied analysis options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::PipelineError;

/// Options that shape one analysis. Part of the cache key, so two requests
/// differing only in key order of `extra` share a cached result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AnalysisOptions {
    /// Number of result variations to order.
    #[validate(range(min = 1, max = 16))]
    pub variations: u32,
    #[validate(length(min = 2, max = 16))]
    pub locale: String,
    /// Free-form provider hints, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl AnalysisOptions {
    pub fn new(variations: u32, locale: impl Into<String>) -> Self {
        Self {
            variations,
            locale: locale.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Validate and convert to the JSON value hashed into the cache key.
    pub fn canonical_value(&self) -> Result<Value, PipelineError> {
        self.validate()?;
        serde_json::to_value(self).map_err(|e| PipelineError::InvalidOptions(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn valid_options_pass() {
        let value = AnalysisOptions::new(4, "en").canonical_value().unwrap();
        assert_eq!(value, json!({"variations": 4, "locale": "en"}));
    }

    #[test]
    fn variations_out_of_range_rejected() {
        assert_matches!(
            AnalysisOptions::new(0, "en").canonical_value(),
            Err(PipelineError::InvalidOptions(msg)) if msg.contains("variations")
        );
        assert!(AnalysisOptions::new(17, "en").canonical_value().is_err());
    }

    #[test]
    fn locale_length_checked() {
        assert!(AnalysisOptions::new(4, "e").canonical_value().is_err());
        assert!(AnalysisOptions::new(4, "en-GB").canonical_value().is_ok());
    }

    #[test]
    fn extra_parses_from_any_key_order() {
        let a: AnalysisOptions =
            serde_json::from_str(r#"{"variations": 2, "locale": "en", "extra": {"b": 1, "a": 2}}"#).unwrap();
        let b: AnalysisOptions =
            serde_json::from_str(r#"{"extra": {"a": 2, "b": 1}, "locale": "en", "variations": 2}"#).unwrap();
        assert_eq!(a, b);
    }
}
