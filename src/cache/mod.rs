//! Cache Module
//!
//! In-memory TTL cache with stale reads and LRU bounding.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{Lookup, TtlCache};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Cache handle shared between the resolver and the sweep task.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;
