//! Cache keys and stored entries.
//!
//! A key is `(content_hash, options_digest, schema_version)`. Storage and
//! single-flight live in the pipeline crate; this module only derives keys
//! and decides whether a stored entry is still usable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;
use crate::hashing::{compute_content_hash, compute_seed, options_digest};

/// Version of the persisted response shape. Bump on any change to scoring
/// output; entries written under another version are treated as misses.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub content_hash: String,
    pub options_digest: String,
    pub schema_version: u32,
}

impl CacheKey {
    /// Derive the key for a photo (raw bytes or a data URL) and its options.
    pub fn derive(photo: &[u8], options: &Value, schema_version: u32) -> Result<Self, EngineError> {
        Ok(Self {
            content_hash: compute_content_hash(photo)?,
            options_digest: options_digest(options),
            schema_version,
        })
    }

    /// Deterministic seed for everything randomized under this key.
    pub fn seed(&self) -> u64 {
        compute_seed(&self.content_hash, &self.options_digest)
    }

    /// Flat string form used by stores.
    pub fn storage_key(&self) -> String {
        format!(
            "v{}:{}:{}",
            self.schema_version, self.content_hash, self.options_digest
        )
    }
}

/// One persisted response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub response: Value,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: CacheKey, response: Value) -> Self {
        Self {
            key,
            response,
            created_at: Utc::now(),
        }
    }

    /// Whether the entry was written under the caller's schema version.
    pub fn is_current_for(&self, schema_version: u32) -> bool {
        self.key.schema_version == schema_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reordered_options_derive_same_key() {
        let a = CacheKey::derive(b"photo", &json!({"a": 1, "b": 2}), SCHEMA_VERSION).unwrap();
        let b = CacheKey::derive(b"photo", &json!({"b": 2, "a": 1}), SCHEMA_VERSION).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed(), b.seed());
        assert_eq!(a.storage_key(), b.storage_key());
    }

    #[test]
    fn schema_version_is_part_of_storage_key() {
        let v1 = CacheKey::derive(b"photo", &json!({}), 1).unwrap();
        let v2 = CacheKey::derive(b"photo", &json!({}), 2).unwrap();
        assert_ne!(v1.storage_key(), v2.storage_key());
        assert_eq!(v1.seed(), v2.seed());
    }

    #[test]
    fn entry_version_check() {
        let key = CacheKey::derive(b"photo", &json!({}), 3).unwrap();
        let entry = CacheEntry::new(key, json!({"ok": true}));
        assert!(entry.is_current_for(3));
        assert!(!entry.is_current_for(4));
    }

    #[test]
    fn invalid_data_url_fails_derivation() {
        assert!(CacheKey::derive(b"data:image/png;base64,%%%", &json!({}), 1).is_err());
    }
}
