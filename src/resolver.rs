//! Cache-Aside Resolver
//!
//! Serves fresh entries from the cache, refreshes from upstream otherwise,
//! and falls back to a stale entry only when upstream is rate limited.
//! Every other upstream failure reaches the caller with its classification.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::cache::{SharedCache, TtlCache};
use crate::config::Config;
use crate::error::{AnalyticsError, Result};
use crate::upstream::{AnalyticsSource, UpstreamError};

// == Cache State ==
/// How a resolution was served, reported to callers via `X-Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheState {
    /// Fresh entry, no upstream call
    Hit,
    /// No prior entry, fetched upstream
    Miss,
    /// Prior entry had expired, fetched upstream
    Refresh,
    /// Upstream rate limited, expired entry served instead
    Stale,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Hit => "HIT",
            CacheState::Miss => "MISS",
            CacheState::Refresh => "REFRESH",
            CacheState::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Resolution ==
/// A payload together with how it was obtained.
#[derive(Debug)]
pub struct Resolution<V> {
    pub value: Arc<V>,
    pub state: CacheState,
    /// When the served payload was fetched from upstream
    pub fetched_at: DateTime<Utc>,
    /// The failure that forced a stale read, if any
    pub upstream_error: Option<UpstreamError>,
}

impl<V> Resolution<V> {
    pub fn is_stale(&self) -> bool {
        self.state == CacheState::Stale
    }

    /// Seconds until upstream accepts calls again, for stale responses.
    pub fn retry_after(&self) -> Option<u64> {
        self.upstream_error.as_ref().and_then(UpstreamError::retry_after)
    }
}

// == Resolver ==
/// Cache-aside access to an [`AnalyticsSource`].
///
/// Cheap to clone; clones share the cache and the source.
pub struct Resolver<V> {
    cache: SharedCache<V>,
    source: Arc<dyn AnalyticsSource<V>>,
    max_staleness: Option<Duration>,
}

impl<V> Clone for Resolver<V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            source: Arc::clone(&self.source),
            max_staleness: self.max_staleness,
        }
    }
}

impl<V: Send + Sync + 'static> Resolver<V> {
    pub fn new(
        source: Arc<dyn AnalyticsSource<V>>,
        cache: TtlCache<V>,
        max_staleness: Option<Duration>,
    ) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            source,
            max_staleness,
        }
    }

    /// Builds the cache from the configured TTL, bound and staleness limit.
    pub fn from_config(source: Arc<dyn AnalyticsSource<V>>, config: &Config) -> Self {
        let cache = TtlCache::new(config.max_entries, config.ttl());
        Self::new(source, cache, config.max_staleness())
    }

    /// Shared handle to the underlying cache.
    pub fn cache(&self) -> &SharedCache<V> {
        &self.cache
    }

    pub fn max_staleness(&self) -> Option<Duration> {
        self.max_staleness
    }

    // == Resolve ==
    /// Returns the payload for `key`, contacting upstream only when the
    /// cached entry is missing or expired.
    ///
    /// The cache lock is released while the upstream call is in flight.
    pub async fn resolve(&self, key: &str) -> Result<Resolution<V>> {
        if key.trim().is_empty() {
            return Err(AnalyticsError::Unauthenticated(
                "missing access credential".to_string(),
            ));
        }

        let prior = self.cache.write().await.lookup(key, Instant::now());

        if let Some(hit) = prior.as_ref().filter(|lookup| lookup.is_fresh) {
            debug!("Cache hit for {}", fingerprint(key));
            return Ok(Resolution {
                value: Arc::clone(&hit.value),
                state: CacheState::Hit,
                fetched_at: hit.fetched_at,
                upstream_error: None,
            });
        }

        match self.source.fetch(key).await {
            Ok(value) => {
                let fetched_at = Utc::now();
                let mut cache = self.cache.write().await;
                let value = cache.put(key, value, fetched_at, Instant::now());

                let state = if prior.is_some() {
                    cache.record_refresh();
                    CacheState::Refresh
                } else {
                    CacheState::Miss
                };
                info!("Fetched analytics for {} ({})", fingerprint(key), state);

                Ok(Resolution {
                    value,
                    state,
                    fetched_at,
                    upstream_error: None,
                })
            }
            Err(err) if err.is_rate_limited() => self.fall_back(key, err).await,
            Err(err) => {
                match &err {
                    UpstreamError::Other { .. } => {
                        error!("Upstream failure for {}: {}", fingerprint(key), err)
                    }
                    _ => info!("Upstream refused {}: {}", fingerprint(key), err),
                }
                Err(err.into())
            }
        }
    }

    /// Serves any entry still within the staleness bound, or propagates the
    /// rate-limit failure with its retry-after hint.
    async fn fall_back(&self, key: &str, err: UpstreamError) -> Result<Resolution<V>> {
        let mut cache = self.cache.write().await;

        match cache.stale(key, Instant::now(), self.max_staleness) {
            Some(stale) => {
                cache.record_stale_served();
                warn!(
                    "Upstream rate limited for {}, serving stale entry from {}",
                    fingerprint(key),
                    stale.fetched_at.to_rfc3339()
                );
                Ok(Resolution {
                    value: stale.value,
                    state: CacheState::Stale,
                    fetched_at: stale.fetched_at,
                    upstream_error: Some(err),
                })
            }
            None => {
                warn!(
                    "Upstream rate limited for {} with no fallback: {}",
                    fingerprint(key),
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Loggable stand-in for a credential.
fn fingerprint(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    format!("{}*** ({} chars)", prefix, key.chars().count())
}
