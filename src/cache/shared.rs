//! Shared Cache Module
//!
//! The process-wide cache handed to every connection task.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStats, CacheTable, ReaderPreferringLock, SlotInfo, StatsSnapshot};
use crate::config::Config;
use crate::error::CacheError;

// == Shared Cache ==
/// Cache table behind the reader-preferring gate, plus counters.
///
/// `lookup` and `insert` are each atomic with respect to one another, but a
/// lookup followed by an insert is not: two concurrent misses for the same
/// key both fetch from the origin and both insert.
#[derive(Debug)]
pub struct SharedCache {
    table: ReaderPreferringLock<CacheTable>,
    stats: CacheStats,
    capacity: usize,
    max_object_size: usize,
}

impl SharedCache {
    // == Constructor ==
    /// Creates an empty cache of `capacity` slots accepting payloads
    /// strictly smaller than `max_object_size`.
    pub fn new(capacity: usize, max_object_size: usize) -> Self {
        Self {
            table: ReaderPreferringLock::new(CacheTable::new(capacity)),
            stats: CacheStats::new(),
            capacity,
            max_object_size,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_cache_entries, config.max_object_size)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_object_size(&self) -> usize {
        self.max_object_size
    }

    // == Lookup ==
    /// Returns the cached payload for `key`, taking the gate in shared mode.
    pub async fn lookup(&self, key: &str) -> Result<Option<Arc<[u8]>>, CacheError> {
        let found = self.table.read().await?.lookup(key);

        match &found {
            Some(payload) => {
                self.stats.record_hit();
                debug!(key, size = payload.len(), "cache hit");
            }
            None => {
                self.stats.record_miss();
                debug!(key, "cache miss");
            }
        }

        Ok(found)
    }

    // == Insert ==
    /// Stores `payload` under `key`, taking the gate in exclusive mode.
    ///
    /// Returns the slot written. Payloads of `max_object_size` bytes or more
    /// are refused.
    pub async fn insert(&self, key: &str, payload: Vec<u8>) -> Result<usize, CacheError> {
        if payload.len() >= self.max_object_size {
            self.stats.record_rejected();
            return Err(CacheError::ObjectTooLarge {
                size: payload.len(),
                limit: self.max_object_size,
            });
        }

        let size = payload.len();
        let insertion = self
            .table
            .write()
            .await?
            .insert(key.to_string(), Arc::from(payload));

        self.stats.record_insert();
        if let Some(evicted) = &insertion.evicted {
            self.stats.record_eviction();
            debug!(key, evicted = %evicted, slot = insertion.slot, "cache eviction");
        }
        debug!(key, size, slot = insertion.slot, "cache insert");

        Ok(insertion.slot)
    }

    // == Stats ==
    /// Current counters and occupancy.
    pub async fn stats(&self) -> Result<StatsSnapshot, CacheError> {
        let total_entries = self.table.read().await?.len();
        Ok(self.stats.snapshot(total_entries, self.capacity))
    }

    /// Occupied slots in index order.
    pub async fn entries(&self) -> Result<Vec<SlotInfo>, CacheError> {
        Ok(self.table.read().await?.entries())
    }

    /// Slot the next eviction sweep starts from.
    pub async fn cursor(&self) -> Result<usize, CacheError> {
        Ok(self.table.read().await?.cursor())
    }

    // == Close ==
    /// Refuses further lookups and inserts with [`CacheError::GateClosed`].
    /// Exchanges already inside the gate finish normally.
    pub fn close(&self) {
        self.table.close();
        debug!("cache closed");
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_never_inserted_misses() {
        let cache = SharedCache::new(10, 1024);

        assert!(cache.lookup("http://nowhere/").await.unwrap().is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let cache = SharedCache::new(10, 1024);

        let slot = cache.insert("http://a/", b"payload".to_vec()).await.unwrap();
        assert_eq!(slot, 0);

        let found = cache.lookup("http://a/").await.unwrap().unwrap();
        assert_eq!(&*found, b"payload");

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_object_size_boundary() {
        let cache = SharedCache::new(10, 100);

        let err = cache.insert("big", vec![b'x'; 100]).await.unwrap_err();
        assert!(matches!(
            err,
            CacheError::ObjectTooLarge {
                size: 100,
                limit: 100
            }
        ));
        assert!(cache.lookup("big").await.unwrap().is_none());

        cache.insert("fits", vec![b'x'; 99]).await.unwrap();
        assert_eq!(cache.lookup("fits").await.unwrap().unwrap().len(), 99);

        assert_eq!(cache.stats().await.unwrap().rejected, 1);
    }

    #[tokio::test]
    async fn test_eviction_is_counted() {
        let cache = SharedCache::new(2, 1024);

        cache.insert("a", b"1".to_vec()).await.unwrap();
        cache.insert("b", b"2".to_vec()).await.unwrap();
        cache.insert("c", b"3".to_vec()).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.inserts, 3);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
        assert!(cache.lookup("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_cache_refuses_access() {
        let cache = SharedCache::new(10, 1024);
        cache.insert("a", b"1".to_vec()).await.unwrap();

        cache.close();

        assert!(matches!(
            cache.lookup("a").await,
            Err(CacheError::GateClosed(_))
        ));
        assert!(matches!(
            cache.insert("b", b"2".to_vec()).await,
            Err(CacheError::GateClosed(_))
        ));
    }

    #[tokio::test]
    async fn test_from_config_uses_limits() {
        let config = Config::default();
        let cache = SharedCache::from_config(&config);

        assert_eq!(cache.capacity(), config.max_cache_entries);
        assert_eq!(cache.max_object_size(), config.max_object_size);
        assert_eq!(cache.cursor().await.unwrap(), 0);
    }
}
