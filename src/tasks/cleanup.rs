//! Stale Entry Sweep
//!
//! Background task that drops cache entries too old to serve even as a
//! rate-limit fallback.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a task that periodically removes entries expired for longer than
/// `retention`.
///
/// Entries within `retention` of their expiry are kept, so every entry the
/// resolver could still fall back to survives the sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_sweep_task<V>(
    cache: SharedCache<V>,
    interval_secs: u64,
    retention: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stale entry sweep every {}s, retention {}s",
            interval.as_secs(),
            retention.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.sweep(Instant::now(), retention);

            if removed > 0 {
                info!("Sweep removed {} stale entries", removed);
            } else {
                debug!("Sweep found nothing to remove");
            }
        }
    })
}
