//! In-memory Store
//!
//! HashMap backed store with per-entry expiration, call counters and
//! failure injection. Suitable for tests and single-process deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::StoreError;
use crate::store::{ErrorChannel, Store};

// == Entry ==
#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    expires_at: Instant,
}

impl Entry {
    fn new(payload: String, ttl_secs: u64) -> Self {
        Self {
            payload,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        }
    }

    /// Expired once the current time reaches the expiration instant.
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

// == Store Calls ==
/// Snapshot of how many commands reached the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCalls {
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
}

#[derive(Debug, Default)]
struct CallCounters {
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
}

// == Memory Store ==
/// In-process [`Store`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
    calls: CallCounters,
    failure: Mutex<Option<StoreError>>,
    errors: ErrorChannel,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent command fail with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<StoreError>) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = error;
    }

    /// Returns the command counters.
    pub fn calls(&self) -> StoreCalls {
        StoreCalls {
            reads: self.calls.reads.load(Ordering::Relaxed),
            writes: self.calls.writes.load(Ordering::Relaxed),
            deletes: self.calls.deletes.load(Ordering::Relaxed),
        }
    }

    /// Remaining TTL of a live key in whole seconds, rounded up.
    pub async fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| {
                let remaining = entry.expires_at - now;
                remaining.as_millis().div_ceil(1000) as u64
            })
    }

    /// Removes all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match self.failure.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.calls.reads.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.payload.clone())),
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was rewritten in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn write_with_expiry(
        &self,
        key: &str,
        payload: &str,
        ttl_secs: u64,
    ) -> Result<(), StoreError> {
        self.calls.writes.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry::new(payload.to_string(), ttl_secs));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.calls.deletes.fetch_add(1, Ordering::Relaxed);
        self.check_failure()?;

        self.entries.write().await.remove(key);
        Ok(())
    }

    fn errors(&self) -> &ErrorChannel {
        &self.errors
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_write_and_read() {
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 60).await.unwrap();

        assert_eq!(store.read("key1").await.unwrap().as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_read_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.read("missing").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_overwrite_resets_ttl() {
        tokio::time::pause();
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 2).await.unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;
        store.write_with_expiry("key1", "value2", 2).await.unwrap();
        tokio::time::advance(Duration::from_millis(1500)).await;

        assert_eq!(store.read("key1").await.unwrap().as_deref(), Some("value2"));
    }

    #[tokio::test]
    async fn test_store_expiration() {
        tokio::time::pause();
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 1).await.unwrap();
        assert!(store.read("key1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(1000)).await;

        assert_eq!(store.read("key1").await.unwrap(), None);
        // Lazily removed on read
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_ttl_remaining() {
        tokio::time::pause();
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 5).await.unwrap();
        assert_eq!(store.ttl_remaining("key1").await, Some(5));

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(store.ttl_remaining("key1").await, Some(3));

        tokio::time::advance(Duration::from_millis(2500)).await;
        assert_eq!(store.ttl_remaining("key1").await, None);
        assert_eq!(store.ttl_remaining("missing").await, None);
    }

    #[tokio::test]
    async fn test_store_delete() {
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 60).await.unwrap();
        store.delete("key1").await.unwrap();
        // Deleting a missing key is not an error
        store.delete("key1").await.unwrap();

        assert_eq!(store.read("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_cleanup_expired() {
        tokio::time::pause();
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 1).await.unwrap();
        store.write_with_expiry("key2", "value2", 10).await.unwrap();

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert_eq!(store.cleanup_expired().await, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.read("key2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_store_counts_calls() {
        let store = MemoryStore::new();

        store.write_with_expiry("key1", "value1", 60).await.unwrap();
        store.read("key1").await.unwrap();
        store.read("key2").await.unwrap();
        store.delete("key1").await.unwrap();

        assert_eq!(
            store.calls(),
            StoreCalls {
                reads: 2,
                writes: 1,
                deletes: 1
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_injection() {
        let store = MemoryStore::new();
        let failure = StoreError::Connection("connection lost".to_string());

        store.fail_with(Some(failure.clone()));
        assert_eq!(store.read("key1").await, Err(failure.clone()));
        assert_eq!(store.write_with_expiry("key1", "v", 60).await, Err(failure.clone()));
        assert_eq!(store.delete("key1").await, Err(failure));
        assert!(store.is_empty().await);

        store.fail_with(None);
        assert!(store.write_with_expiry("key1", "v", 60).await.is_ok());
    }
}
