//! Deterministic response cache with per-key single-flight.
//!
//! On a miss the first caller for a key computes and stores the value while
//! every concurrent caller for the same key waits on that key's lock, then
//! re-reads the store. Failures are returned to the caller that computed
//! them and never stored, so the next waiter computes afresh.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use aesthete_core::{CacheEntry, CacheKey};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::store::CacheStore;

/// Whether a value came from the store or was computed by this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// A key's single-flight lock and the number of callers holding a slot on it.
struct Inflight {
    lock: Arc<Mutex<()>>,
    holders: usize,
}

type InflightTable = StdMutex<HashMap<String, Inflight>>;

/// A caller's claim on one key's lock. Dropping it, on completion or on
/// cancellation, releases the claim and removes the entry once unclaimed.
struct InflightSlot<'a> {
    table: &'a InflightTable,
    key: String,
    lock: Arc<Mutex<()>>,
}

impl<'a> InflightSlot<'a> {
    fn claim(table: &'a InflightTable, key: String) -> Self {
        let mut entries = table.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.entry(key.clone()).or_insert_with(|| Inflight {
            lock: Arc::new(Mutex::new(())),
            holders: 0,
        });
        entry.holders += 1;
        let lock = Arc::clone(&entry.lock);
        drop(entries);
        Self { table, key, lock }
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        let mut entries = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                entries.remove(&self.key);
            }
        }
    }
}

pub struct DeterministicCache<S> {
    store: S,
    /// Single-flight locks indexed by storage key. Never held across an await.
    inflight: InflightTable,
}

impl<S: CacheStore> DeterministicCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            inflight: StdMutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a key. An entry written under another schema version, or
    /// for a different key, is a miss.
    pub async fn get(&self, key: &CacheKey) -> Result<Option<Value>, PipelineError> {
        let entry = self.store.get(&key.storage_key()).await?;
        Ok(entry
            .filter(|e| e.is_current_for(key.schema_version) && e.key == *key)
            .map(|e| e.response))
    }

    pub async fn put(&self, key: &CacheKey, value: Value) -> Result<(), PipelineError> {
        self.store
            .put(&key.storage_key(), CacheEntry::new(key.clone(), value))
            .await
    }

    /// Return the cached value for `key`, or run `compute` exactly once
    /// across concurrent callers and store its result.
    ///
    /// Dropping the returned future releases the key, so a caller-side
    /// timeout leaves nothing behind.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &CacheKey,
        compute: F,
    ) -> Result<(Value, CacheStatus), PipelineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, PipelineError>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok((value, CacheStatus::Hit));
        }

        let slot = InflightSlot::claim(&self.inflight, key.storage_key());
        let _guard = slot.lock.lock().await;
        self.fill(key, compute).await
    }

    /// Re-check under the key lock, then compute and store on a miss.
    async fn fill<F, Fut>(&self, key: &CacheKey, compute: F) -> Result<(Value, CacheStatus), PipelineError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, PipelineError>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok((value, CacheStatus::Hit));
        }
        let value = compute().await?;
        self.put(key, value.clone()).await?;
        Ok((value, CacheStatus::Miss))
    }

    #[cfg(test)]
    fn inflight_len(&self) -> usize {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
