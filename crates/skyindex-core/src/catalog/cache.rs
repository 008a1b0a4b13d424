//! Bounded LRU cache of search results

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;

use super::entry::CatalogEntry;
use crate::logging::ResourceMetrics;

/// Snapshot of query cache occupancy and effectiveness
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hit rate as a percentage (0.0-100.0)
    pub hit_rate: f64,
}

/// Query string → result list, evicting the least recently used key
#[derive(Debug)]
pub struct QueryCache {
    entries: LruCache<String, Vec<CatalogEntry>>,
    metrics: ResourceMetrics,
}

fn non_zero(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

impl QueryCache {
    /// Create a cache holding at most `capacity` queries (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(non_zero(capacity)),
            metrics: ResourceMetrics::new(),
        }
    }

    /// Look up a query, promoting it to most recently used
    pub fn get(&mut self, query: &str) -> Option<Vec<CatalogEntry>> {
        match self.entries.get(query) {
            Some(results) => {
                self.metrics.record_cache_hit();
                Some(results.clone())
            }
            None => {
                self.metrics.record_cache_miss();
                None
            }
        }
    }

    pub fn put(&mut self, query: &str, results: Vec<CatalogEntry>) {
        if let Some((evicted, _)) = self.entries.push(query.to_string(), results) {
            if evicted != query {
                self.metrics.record_eviction();
                tracing::trace!(query = %evicted, "query cache eviction");
            }
        }
    }

    /// Drop every cached result; statistics are kept
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Change capacity, evicting least recently used keys if shrinking
    pub fn resize(&mut self, capacity: usize) {
        let capacity = non_zero(capacity);
        let overflow = self.entries.len().saturating_sub(capacity.get());
        for _ in 0..overflow {
            self.metrics.record_eviction();
        }
        self.entries.resize(capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn metrics(&self) -> &ResourceMetrics {
        &self.metrics
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity(),
            hits: self.metrics.cache_hits(),
            misses: self.metrics.cache_misses(),
            evictions: self.metrics.cache_evictions(),
            hit_rate: self.metrics.cache_hit_rate(),
        }
    }
}
