//! In-Memory Cache Module
//!
//! Thread-safe cache backend: a [`CacheStore`] behind a single reader/writer
//! lock, plus the reaper task that sweeps it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::info;

use crate::backend::CacheBackend;
use crate::cache::{CacheStats, CacheStore, StatsSnapshot, SweepStrategy};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_reaper, Reaper};

/// Default pause between reaper sweeps
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(1);

// == Cache Options ==
/// Construction parameters for [`InMemoryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Maximum number of entries
    pub max_size: usize,
    /// Pause between reaper sweeps
    pub reap_interval: Duration,
    /// How much of the index each sweep visits
    pub sweep: SweepStrategy,
}

impl CacheOptions {
    /// Options for a cache of `max_size` entries with default reaping.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            reap_interval: DEFAULT_REAP_INTERVAL,
            sweep: SweepStrategy::default(),
        }
    }

    pub fn reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval;
        self
    }

    pub fn sweep(mut self, sweep: SweepStrategy) -> Self {
        self.sweep = sweep;
        self
    }
}

// == In-Memory Cache ==
/// Bounded LRU cache with per-entry TTL, safe to share across threads.
///
/// The reaper task is started on construction and owned by the cache: it
/// stops when the cache is dropped or [`shutdown`](Self::shutdown) is
/// awaited. Share the cache itself through an `Arc`.
///
/// # Example
/// ```no_run
/// # async fn demo() -> mini_cache::error::Result<()> {
/// use std::time::Duration;
/// use mini_cache::cache::InMemoryCache;
///
/// let cache = InMemoryCache::new(1000)?;
/// cache.set("session", "token".to_string(), Duration::from_secs(60))?;
/// assert_eq!(cache.get("session")?, "token");
/// cache.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryCache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    stats: Arc<CacheStats>,
    reaper: Reaper,
}

impl<V> InMemoryCache<V>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries, reaped every second.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(max_size: usize) -> Result<Self> {
        Self::with_options(CacheOptions::new(max_size))
    }

    /// Creates a cache from explicit options.
    ///
    /// # Errors
    /// - `InvalidCapacity` if `max_size` is zero
    /// - `InvalidConfig` if `reap_interval` is zero
    /// - `NoRuntime` outside a Tokio runtime
    pub fn with_options(options: CacheOptions) -> Result<Self> {
        let store = CacheStore::new(options.max_size)?;
        let stats = store.stats_handle();
        let store = Arc::new(RwLock::new(store));
        let reaper = spawn_reaper(Arc::clone(&store), options.reap_interval, options.sweep)?;

        info!(
            max_size = options.max_size,
            sweep = %options.sweep,
            "In-memory cache initialized"
        );

        Ok(Self {
            store,
            stats,
            reaper,
        })
    }
}

impl<V> InMemoryCache<V> {
    // == Set ==
    /// Stores `value` under `key`; a zero `ttl` never expires.
    ///
    /// Never fails: a full cache evicts its least recently used entry.
    pub fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        self.store.write().set(key.to_string(), value, ttl)
    }

    // == Delete ==
    /// Removes `key`, failing with `KeyNotFound` if it is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.store.write().delete(key)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) -> Result<()> {
        self.store.write().clear();
        Ok(())
    }

    // == Inspection ==
    /// Number of entries held, including expired ones not yet reaped.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.store.read().capacity()
    }

    /// Returns current statistics without taking the cache lock.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Shared handle to the live statistics counters.
    pub fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> Vec<String> {
        self.store.read().keys().map(str::to_string).collect()
    }

    /// Checks the index bijection and capacity bound under a read lock.
    pub fn is_consistent(&self) -> bool {
        self.store.read().is_consistent()
    }

    /// Runs one sweep immediately, outside the reaper's schedule.
    pub fn reap_now(&self, strategy: SweepStrategy) -> usize {
        self.store.write().reap_expired(strategy)
    }

    // == Shutdown ==
    /// Stops the reaper and waits for it to exit.
    pub async fn shutdown(self) {
        self.reaper.shutdown().await;
    }
}

impl<V: Clone> InMemoryCache<V> {
    // == Get ==
    /// Returns a copy of the live value under `key` and marks it most
    /// recently used.
    ///
    /// The existence and expiry check runs under a shared read guard, so
    /// misses and expired reads never wait on other lookups. A hit takes the
    /// write lock for the recency move and resolves the key again there,
    /// since a writer may have replaced or removed it in between.
    ///
    /// # Errors
    /// - `KeyNotFound` if the key is absent
    /// - `KeyExpired` if its TTL has elapsed but it has not been reaped yet
    pub fn get(&self, key: &str) -> Result<V> {
        self.store.read().lookup(key)?;
        self.store.write().get(key)
    }
}

impl<V> CacheBackend for InMemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    type Value = V;
    type Error = CacheError;

    fn set(&self, key: &str, value: V, ttl: Duration) -> Result<()> {
        InMemoryCache::set(self, key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<V> {
        InMemoryCache::get(self, key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        InMemoryCache::delete(self, key)
    }

    fn clear(&self) -> Result<()> {
        InMemoryCache::clear(self)
    }
}
