//! Cache storage seam and the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use aesthete_core::CacheEntry;
use tokio::sync::RwLock;

use crate::error::PipelineError;

/// Key/value persistence for cache entries. Entries are opaque to the store.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<CacheEntry>, PipelineError>> + Send;

    /// Insert or overwrite.
    fn put(&self, key: &str, entry: CacheEntry) -> impl std::future::Future<Output = Result<(), PipelineError>> + Send;
}

/// Process-local store backed by a `RwLock`-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, PipelineError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), PipelineError> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

impl<T: CacheStore> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, PipelineError> {
        T::get(self, key).await
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), PipelineError> {
        T::put(self, key, entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aesthete_core::CacheKey;
    use serde_json::json;

    fn entry(response: serde_json::Value) -> CacheEntry {
        CacheEntry::new(CacheKey::derive(b"photo", &json!({}), 1).unwrap(), response)
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryCacheStore::new();
        assert!(store.get("k").await.unwrap().is_none());
        store.put("k", entry(json!(1))).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().unwrap().response, json!(1));
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryCacheStore::new();
        store.put("k", entry(json!(1))).await.unwrap();
        store.put("k", entry(json!(2))).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("k").await.unwrap().unwrap().response, json!(2));
    }
}
