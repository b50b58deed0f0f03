//! Configuration Module
//!
//! Loads service configuration from environment variables. Every value is
//! fixed for the lifetime of the process.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Endpoint paced by the dashboard client.
pub const OVERVIEW_ENDPOINT: &str = "/api/analytics/overview";

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin allowed by CORS
    pub frontend_url: String,
    /// Root URL of the upstream analytics API
    pub upstream_base_url: String,
    /// Seconds a fetched payload stays fresh
    pub cache_ttl: u64,
    /// Seconds past expiry an entry may still be served as a fallback,
    /// None = no bound
    pub max_staleness: Option<u64>,
    /// Maximum number of identities held in the cache
    pub max_entries: usize,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// Retry-after reported when upstream gives no usable reset time
    pub retry_after_floor: u64,
    /// Minimum gap between dashboard calls to the overview endpoint (ms)
    pub overview_min_interval_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `FRONTEND_URL` - Allowed CORS origin (default: http://localhost:3000)
    /// - `UPSTREAM_BASE_URL` - Upstream API root (default: https://api.twitter.com)
    /// - `CACHE_TTL` - Freshness window in seconds (default: 60)
    /// - `MAX_STALENESS` - Fallback bound in seconds, or `unbounded` (default: 3600)
    /// - `MAX_ENTRIES` - Maximum cached identities (default: 1000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `RETRY_AFTER_FLOOR` - Default retry-after in seconds (default: 60)
    /// - `OVERVIEW_MIN_INTERVAL_MS` - Dashboard pacing in ms (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_base_url),
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            max_staleness: match env::var("MAX_STALENESS") {
                Ok(v) if v.eq_ignore_ascii_case("unbounded") => None,
                Ok(v) => v.parse().ok().or(defaults.max_staleness),
                Err(_) => defaults.max_staleness,
            },
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            retry_after_floor: env_or("RETRY_AFTER_FLOOR", defaults.retry_after_floor),
            overview_min_interval_ms: env_or(
                "OVERVIEW_MIN_INTERVAL_MS",
                defaults.overview_min_interval_ms,
            ),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn max_staleness(&self) -> Option<Duration> {
        self.max_staleness.map(Duration::from_secs)
    }

    pub fn overview_min_interval(&self) -> Duration {
        Duration::from_millis(self.overview_min_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8000,
            frontend_url: "http://localhost:3000".to_string(),
            upstream_base_url: "https://api.twitter.com".to_string(),
            cache_ttl: 60,
            max_staleness: Some(3600),
            max_entries: 1000,
            cleanup_interval: 60,
            retry_after_floor: 60,
            overview_min_interval_ms: 3000,
        }
    }
}

/// Parses an environment variable, falling back to `default` when it is
/// missing or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
