//! Call Throttle
//!
//! Serializes and paces calls per endpoint: concurrent callers of the same
//! endpoint dispatch one at a time, in arrival order, at least
//! `min_interval` apart. Different endpoints never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Last dispatch instant of one endpoint. The async mutex guarding it queues
/// waiters first-in first-out, which gives the total order.
type Slot = Arc<Mutex<Option<Instant>>>;

// == Call Throttle ==
/// Per-endpoint pacing shared by every caller holding a clone.
#[derive(Debug, Clone, Default)]
pub struct CallThrottle {
    intervals: Arc<HashMap<String, Duration>>,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl CallThrottle {
    /// Throttle with no configured endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Throttle pacing each listed endpoint at its minimum interval.
    pub fn with_intervals<I, K>(intervals: I) -> Self
    where
        I: IntoIterator<Item = (K, Duration)>,
        K: Into<String>,
    {
        Self {
            intervals: Arc::new(
                intervals
                    .into_iter()
                    .map(|(endpoint, interval)| (endpoint.into(), interval))
                    .collect(),
            ),
            slots: Arc::default(),
        }
    }

    /// Configured interval for `endpoint`, if it is paced.
    pub fn interval(&self, endpoint: &str) -> Option<Duration> {
        self.intervals.get(endpoint).copied()
    }

    // == Wait Turn ==
    /// Waits for `endpoint`'s next slot using its configured interval.
    /// Endpoints without one proceed immediately.
    pub async fn wait_turn(&self, endpoint: &str) {
        if let Some(interval) = self.interval(endpoint) {
            self.wait_turn_for(endpoint, interval).await;
        }
    }

    /// Suspends until the caller may dispatch to `endpoint`, no sooner than
    /// `min_interval` after the previous dispatch.
    ///
    /// The dispatch is recorded when the caller proceeds. If the caller is
    /// dropped while waiting, the moment it was dropped counts as its
    /// dispatch and the next caller is released.
    pub async fn wait_turn_for(&self, endpoint: &str, min_interval: Duration) {
        let slot = self.slot(endpoint).await;
        let turn = Turn {
            last: slot.lock().await,
        };

        if let Some(last) = *turn.last {
            let wait = min_interval.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                debug!("Throttling {} for {}ms", endpoint, wait.as_millis());
                tokio::time::sleep(wait).await;
            }
        }

        drop(turn);
    }

    async fn slot(&self, endpoint: &str) -> Slot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(endpoint.to_string()).or_default())
    }
}

/// Exclusive hold on an endpoint's slot. Dropping it, on any path, stamps
/// the dispatch time and hands the slot to the next waiter.
struct Turn<'a> {
    last: MutexGuard<'a, Option<Instant>>,
}

impl Drop for Turn<'_> {
    fn drop(&mut self) {
        *self.last = Some(Instant::now());
    }
}
