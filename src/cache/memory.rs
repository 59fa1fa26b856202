//! In-process fast store backed by moka.
//!
//! Follows redis semantics for the operations the coordinator uses: `set`
//! stores a value without expiration (clearing any previous one), `expire`
//! attaches a TTL to an existing key and is a no-op for missing keys.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::Result;
use crate::traits::FastStore;

/// Default maximum number of entries held by a [`MemoryStore`].
const DEFAULT_MAX_ENTRIES: u64 = 10_000;

#[derive(Clone)]
struct StoredBlob {
    bytes: Arc<Vec<u8>>,
    ttl: Option<Duration>,
}

/// Per-entry expiry: each blob carries its own TTL.
struct BlobExpiry;

impl Expiry<String, StoredBlob> for BlobExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredBlob,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredBlob,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Thread-safe in-memory [`FastStore`].
///
/// Bounded LRU (moka) with per-key TTL. Never fails, so a coordinator
/// backed by it is never demoted.
pub struct MemoryStore {
    entries: Cache<String, StoredBlob>,
}

impl MemoryStore {
    /// Create a store with the default max capacity (10,000).
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store with a custom max capacity.
    pub fn with_max_entries(max: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max)
            .expire_after(BlobExpiry)
            .build();
        Self { entries }
    }

    /// Number of entries currently held (approximate, see moka docs).
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FastStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.entries.get(key).await.is_some())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .entries
            .get(key)
            .await
            .map(|blob| blob.bytes.as_ref().clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let blob = StoredBlob {
            bytes: Arc::new(value),
            ttl: None,
        };
        self.entries.insert(key.to_owned(), blob).await;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        if let Some(blob) = self.entries.get(key).await {
            let blob = StoredBlob {
                bytes: blob.bytes,
                ttl: Some(ttl),
            };
            self.entries.insert(key.to_owned(), blob).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        assert!(!store.exists("k").await.unwrap());

        store.set("k", b"value".to_vec()).await.unwrap();

        assert!(store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", b"one".to_vec()).await.unwrap();
        store.set("k", b"two".to_vec()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"two".to_vec()));
    }

    #[tokio::test]
    async fn expire_missing_key_is_noop() {
        let store = MemoryStore::new();
        store.expire("missing", Duration::from_secs(1)).await.unwrap();
        assert!(!store.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn expire_removes_entry_after_ttl() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec()).await.unwrap();
        store.expire("k", Duration::from_millis(50)).await.unwrap();

        assert!(store.exists("k").await.unwrap());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!store.exists("k").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_clears_previous_expiration() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec()).await.unwrap();
        store.expire("k", Duration::from_millis(50)).await.unwrap();
        store.set("k", b"v2".to_vec()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(store.get("k").await.unwrap(), Some(b"v2".to_vec()));
    }
}
