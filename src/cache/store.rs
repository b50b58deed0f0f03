//! TTL Cache Module
//!
//! Keyed store of the last fetched payload per identity, with a fixed
//! freshness window, stale reads for fallback, and an LRU bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Lookup ==
/// A payload read from the cache.
#[derive(Debug)]
pub struct Lookup<V> {
    pub value: Arc<V>,
    pub fetched_at: DateTime<Utc>,
    /// `now < expires_at` at the moment of the read
    pub is_fresh: bool,
}

impl<V> Clone for Lookup<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
            is_fresh: self.is_fresh,
        }
    }
}

// == TTL Cache ==
/// In-memory cache of payloads keyed by identity.
///
/// Methods take the current instant explicitly so callers read the clock
/// once per operation. The store never fails and performs no I/O; share it
/// as `Arc<RwLock<TtlCache<V>>>` so every write replaces a whole entry.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: HashMap<String, CacheEntry<V>>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
    ttl: Duration,
}

impl<V> TtlCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_entries` identities (minimum one),
    /// each fresh for `ttl` after it is written.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Lookup ==
    /// Returns the entry for `key` and whether it is still fresh.
    ///
    /// Expired entries are returned with `is_fresh = false`, never removed.
    pub fn lookup(&mut self, key: &str, now: Instant) -> Option<Lookup<V>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return None;
        };

        let is_fresh = entry.is_fresh(now);
        let lookup = Lookup {
            value: Arc::clone(&entry.value),
            fetched_at: entry.fetched_at,
            is_fresh,
        };

        if is_fresh {
            self.stats.record_hit();
        } else {
            self.stats.record_expired();
        }
        self.lru.touch(key);

        Some(lookup)
    }

    // == Stale Read ==
    /// Returns any entry for `key`, fresh or expired, provided it has not
    /// been expired for longer than `max_staleness`.
    pub fn stale(
        &mut self,
        key: &str,
        now: Instant,
        max_staleness: Option<Duration>,
    ) -> Option<Lookup<V>> {
        let entry = self.entries.get(key)?;
        if !entry.usable_as_fallback(now, max_staleness) {
            return None;
        }

        let lookup = Lookup {
            value: Arc::clone(&entry.value),
            fetched_at: entry.fetched_at,
            is_fresh: entry.is_fresh(now),
        };
        self.lru.touch(key);

        Some(lookup)
    }

    // == Put ==
    /// Stores `value` for `key` with `expires_at = now + ttl`, replacing any
    /// previous entry. Inserting a new key into a full cache evicts the least
    /// recently used one.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: V,
        fetched_at: DateTime<Utc>,
        now: Instant,
    ) -> Arc<V> {
        let key = key.into();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        let entry = CacheEntry::new(value, fetched_at, now, self.ttl);
        let value = Arc::clone(&entry.value);
        self.lru.touch(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());

        value
    }

    /// Entry for `key` without touching LRU order or statistics.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    // == Sweep ==
    /// Removes entries that have been expired for longer than `retention`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, now: Instant, retention: Duration) -> usize {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.staleness(now) > retention)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &doomed {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_swept(doomed.len());
        self.stats.set_total_entries(self.entries.len());
        doomed.len()
    }

    pub fn record_refresh(&mut self) {
        self.stats.record_refresh();
    }

    pub fn record_stale_served(&mut self) {
        self.stats.record_stale_served();
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_lookup_absent() {
        let mut cache: TtlCache<String> = TtlCache::new(10, TTL);

        assert!(cache.lookup("tok1", Instant::now()).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_put_then_lookup_fresh() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();

        cache.put("tok1", "P1".to_string(), Utc::now(), t0);
        let hit = cache.lookup("tok1", t0 + secs(30)).unwrap();

        assert!(hit.is_fresh);
        assert_eq!(*hit.value, "P1");
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_expired_entry_is_kept() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();

        cache.put("tok1", "P1".to_string(), Utc::now(), t0);
        let read = cache.lookup("tok1", t0 + secs(70)).unwrap();

        assert!(!read.is_fresh);
        assert_eq!(*read.value, "P1");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().expired, 1);
    }

    #[test]
    fn test_overwrite_resets_expiry() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();

        cache.put("tok1", "P1".to_string(), Utc::now(), t0);
        cache.put("tok1", "P2".to_string(), Utc::now(), t0 + secs(70));

        let read = cache.lookup("tok1", t0 + secs(100)).unwrap();
        assert!(read.is_fresh);
        assert_eq!(*read.value, "P2");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.peek("tok1").unwrap().expires_at, t0 + secs(130));
    }

    #[test]
    fn test_stale_read_respects_bound() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();
        cache.put("tok1", "P1".to_string(), Utc::now(), t0);

        let at = t0 + secs(70);
        assert!(cache.stale("tok1", at, Some(secs(10))).is_some());
        assert!(cache.stale("tok1", at, Some(secs(5))).is_none());
        assert!(cache.stale("tok1", at + secs(1_000_000), None).is_some());
        assert!(cache.stale("tok2", at, None).is_none());
    }

    #[test]
    fn test_stale_read_returns_fresh_entries_too() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();
        cache.put("tok1", "P1".to_string(), Utc::now(), t0);

        let read = cache.stale("tok1", t0 + secs(1), Some(Duration::ZERO)).unwrap();
        assert!(read.is_fresh);
    }

    #[test]
    fn test_lru_bound_evicts_least_recent() {
        let mut cache = TtlCache::new(2, TTL);
        let t0 = Instant::now();

        cache.put("a", 1, Utc::now(), t0);
        cache.put("b", 2, Utc::now(), t0);
        cache.lookup("a", t0);
        cache.put("c", 3, Utc::now(), t0);

        assert_eq!(cache.len(), 2);
        assert!(cache.peek("b").is_none());
        assert!(cache.peek("a").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let mut cache = TtlCache::new(2, TTL);
        let t0 = Instant::now();

        cache.put("a", 1, Utc::now(), t0);
        cache.put("b", 2, Utc::now(), t0);
        cache.put("a", 10, Utc::now(), t0);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_sweep_removes_only_long_expired() {
        let mut cache = TtlCache::new(10, TTL);
        let t0 = Instant::now();

        cache.put("old", 1, Utc::now(), t0);
        cache.put("recent", 2, Utc::now(), t0 + secs(100));

        // "old" expired at 60s, "recent" at 160s.
        let removed = cache.sweep(t0 + secs(200), secs(100));

        assert_eq!(removed, 1);
        assert!(cache.peek("old").is_none());
        assert!(cache.peek("recent").is_some());
        assert_eq!(cache.stats().swept, 1);
        assert_eq!(cache.stats().total_entries, 1);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = TtlCache::new(0, TTL);
        cache.put("a", 1, Utc::now(), Instant::now());
        assert_eq!(cache.len(), 1);
    }
}
