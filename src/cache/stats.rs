//! Cache Statistics Module
//!
//! Counters describing how lookups were served.

use serde::{Deserialize, Serialize};

// == Cache Stats ==
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Lookups answered by a fresh entry
    pub hits: u64,
    /// Lookups for keys with no entry at all
    pub misses: u64,
    /// Lookups that found only an expired entry
    pub expired: u64,
    /// Successful upstream fetches that replaced an expired entry
    pub refreshes: u64,
    /// Expired entries served because upstream was rate limited
    pub stale_served: u64,
    /// Entries dropped by the LRU bound
    pub evictions: u64,
    /// Entries dropped by the background sweep
    pub swept: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Fraction of lookups answered without contacting upstream.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expired;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    pub fn record_refresh(&mut self) {
        self.refreshes += 1;
    }

    pub fn record_stale_served(&mut self) {
        self.stale_served += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_swept(&mut self, count: usize) {
        self.swept += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_counts_expired_as_non_hits() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_miss();
        stats.record_expired();
        stats.record_hit();
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_fallback_counters() {
        let mut stats = CacheStats::new();
        stats.record_refresh();
        stats.record_stale_served();
        stats.record_stale_served();
        stats.record_eviction();
        stats.record_swept(3);

        assert_eq!(stats.refreshes, 1);
        assert_eq!(stats.stale_served, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.swept, 3);
    }
}
