//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod memory;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::{Keys, LruIndex};
pub use memory::{CacheOptions, InMemoryCache, DEFAULT_REAP_INTERVAL};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStore, SweepStrategy};
