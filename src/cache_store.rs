//! Epoch-keyed cache/cDAG memoization with bounded LRU eviction (§5,
//! §10.3). No global singleton: a host constructs and holds its own
//! `CacheStore`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::trace;

use crate::cache::{cache_size, seed_hash, Cache};
use crate::cdag::CDag;

/// Everything derived from one epoch's seed: the light cache, the cDAG,
/// and the cache size it was built at.
#[derive(Debug)]
pub struct EpochCache {
    pub epoch: u64,
    pub cache: Cache,
    pub cdag: CDag,
    pub cache_size_bytes: u64,
}

struct Entry {
    value: Arc<EpochCache>,
    last_used: u64,
}

/// Bounded, least-recently-used memoization table for built epoch caches.
pub struct CacheStore {
    capacity: usize,
    table: RwLock<HashMap<u64, Entry>>,
    clock: std::sync::atomic::AtomicU64,
}

impl CacheStore {
    /// Create a store that holds at most `capacity` epochs' worth of
    /// cache/cDAG data before evicting the least-recently-used entry.
    pub fn new(capacity: usize) -> Self {
        CacheStore {
            capacity: capacity.max(1),
            table: RwLock::new(HashMap::new()),
            clock: std::sync::atomic::AtomicU64::new(0),
        }
    }

    fn tick(&self) -> u64 {
        self.clock
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }

    /// A non-building read: returns the cached entry for `epoch` if present,
    /// without constructing anything.
    pub fn get(&self, epoch: u64) -> Option<Arc<EpochCache>> {
        let table = self.table.read().unwrap();
        table.get(&epoch).map(|e| e.value.clone())
    }

    /// Build (or return the memoized) cache/cDAG pair for `epoch`.
    pub fn ensure_epoch(&self, epoch: u64) -> Arc<EpochCache> {
        if let Some(existing) = self.get(epoch) {
            let mut table = self.table.write().unwrap();
            if let Some(entry) = table.get_mut(&epoch) {
                entry.last_used = self.tick();
            }
            return existing;
        }

        trace!("cache store miss for epoch {epoch}, building");
        let effective_block = epoch * crate::cache::EPOCH_LENGTH + 1;
        let seed = seed_hash(epoch);
        let size = cache_size(effective_block);
        let cache = Cache::build(&seed, size);
        let cdag = CDag::build(&cache);
        let built = Arc::new(EpochCache {
            epoch,
            cache,
            cdag,
            cache_size_bytes: size,
        });

        let mut table = self.table.write().unwrap();
        if table.len() >= self.capacity && !table.contains_key(&epoch) {
            if let Some((&lru_epoch, _)) = table.iter().min_by_key(|(_, e)| e.last_used) {
                table.remove(&lru_epoch);
            }
        }
        table.insert(
            epoch,
            Entry {
                value: built.clone(),
                last_used: self.tick(),
            },
        );
        built
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_epoch_memoizes() {
        let store = CacheStore::new(2);
        assert!(store.get(0).is_none());
        let first = store.ensure_epoch(0);
        assert!(store.get(0).is_some());
        let second = store.ensure_epoch(0);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let store = CacheStore::new(1);
        let epoch0 = store.ensure_epoch(0);
        let epoch1 = store.ensure_epoch(1);
        // Capacity 1: building epoch 1 must have evicted epoch 0.
        assert!(store.get(0).is_none());
        assert!(store.get(1).is_some());
        assert!(!Arc::ptr_eq(&epoch0, &epoch1));
    }
}
