//! Cache Entry Module
//!
//! A single cached payload together with its freshness window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Expiry horizon for TTLs too large to add to the monotonic clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Cache Entry ==
/// Last successfully fetched payload for one identity key.
///
/// Freshness is measured on the monotonic clock; `fetched_at` is wall-clock
/// time kept only for reporting.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored payload, shared with readers and never mutated
    pub value: Arc<V>,
    /// Wall-clock time of the fetch that produced this payload
    pub fetched_at: DateTime<Utc>,
    /// Monotonic time the entry was written
    pub stored_at: Instant,
    /// Monotonic time after which the entry is stale
    pub expires_at: Instant,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
            stored_at: self.stored_at,
            expires_at: self.expires_at,
        }
    }
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now` that stays fresh for `ttl`.
    ///
    /// A `ttl` beyond the clock's range is capped at [`FAR_FUTURE`].
    pub fn new(value: V, fetched_at: DateTime<Utc>, now: Instant, ttl: Duration) -> Self {
        let expires_at = now.checked_add(ttl.min(FAR_FUTURE)).unwrap_or(now);

        Self {
            value: Arc::new(value),
            fetched_at,
            stored_at: now,
            expires_at,
        }
    }

    // == Is Fresh ==
    /// An entry is fresh strictly before its expiry instant; at the boundary
    /// it is already stale.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    // == Staleness ==
    /// How long the entry has been past its expiry. Zero while fresh.
    pub fn staleness(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.expires_at)
    }

    /// Whether the entry may still stand in for a failed fetch.
    ///
    /// `None` places no bound on staleness.
    pub fn usable_as_fallback(&self, now: Instant, max_staleness: Option<Duration>) -> bool {
        match max_staleness {
            Some(bound) => self.staleness(now) <= bound,
            None => true,
        }
    }

    /// Remaining freshness, zero once expired.
    pub fn ttl_remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}
