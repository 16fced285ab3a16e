//! Cache Store Module
//!
//! Single-threaded cache engine combining the LRU index with TTL expiry.
//! [`InMemoryCache`](crate::cache::InMemoryCache) wraps it in a lock and
//! drives the reaper against it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruIndex, StatsSnapshot};
use crate::error::{CacheError, Result};

// == Sweep Strategy ==
/// How far a reaper sweep walks the recency list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepStrategy {
    /// Walk from the tail and stop at the first live entry.
    ///
    /// Cheap, but a long-lived entry at the tail hides expired entries
    /// closer to the head until it is touched or evicted.
    Tail,
    /// Visit every entry on each sweep.
    #[default]
    Full,
}

impl FromStr for SweepStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tail" => Ok(SweepStrategy::Tail),
            "full" => Ok(SweepStrategy::Full),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown sweep strategy '{}', expected 'tail' or 'full'",
                other
            ))),
        }
    }
}

impl fmt::Display for SweepStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepStrategy::Tail => f.write_str("tail"),
            SweepStrategy::Full => f.write_str("full"),
        }
    }
}

// == Cache Store ==
/// Bounded, recency-ordered store with lazy TTL expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Recency list and key map
    index: LruIndex<V>,
    /// Performance statistics, shared with the owning cache
    stats: Arc<CacheStats>,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl<V> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_entries` entries.
    ///
    /// # Errors
    /// `CacheError::InvalidCapacity` if `max_entries` is zero.
    pub fn new(max_entries: usize) -> Result<Self> {
        if max_entries == 0 {
            return Err(CacheError::InvalidCapacity(max_entries));
        }

        Ok(Self {
            index: LruIndex::with_capacity(max_entries),
            stats: Arc::new(CacheStats::new()),
            max_entries,
        })
    }

    // == Set ==
    /// Stores a value under `key`, expiring after `ttl` (zero = never).
    ///
    /// An existing key is updated in place and moved to the head without a
    /// capacity check. A new key at capacity evicts the tail first, whatever
    /// its expiry state.
    pub fn set(&mut self, key: String, value: V, ttl: Duration) -> Result<()> {
        self.set_at(key, value, ttl, Instant::now());
        Ok(())
    }

    pub(crate) fn set_at(&mut self, key: String, value: V, ttl: Duration, now: Instant) {
        if let Some(slot) = self.index.slot_of(&key) {
            if let Some(entry) = self.index.entry_mut(slot) {
                entry.refresh(value, ttl, now);
            }
            self.index.move_to_front(slot);
            return;
        }

        if self.index.len() >= self.max_entries {
            if let Some(evicted) = self.index.pop_back() {
                debug!(key = %evicted.key, "Evicted least recently used entry");
                self.stats.record_evictions(1);
            }
        }

        self.index.push_front(CacheEntry::new(key, value, ttl, now));
        self.stats.set_total_entries(self.index.len());
    }

    // == Lookup ==
    /// Finds the slot of a live entry without touching recency order.
    ///
    /// This is the read-only half of a get; misses and expired reads are
    /// recorded here.
    pub fn lookup(&self, key: &str) -> Result<usize> {
        self.lookup_at(key, Instant::now())
    }

    pub(crate) fn lookup_at(&self, key: &str, now: Instant) -> Result<usize> {
        let Some(slot) = self.index.slot_of(key) else {
            self.stats.record_miss();
            return Err(CacheError::KeyNotFound(key.to_string()));
        };

        match self.index.entry(slot) {
            Some(entry) if entry.is_expired_at(now) => {
                // Left in place for the reaper or a later set/delete
                self.stats.record_expired();
                Err(CacheError::KeyExpired(key.to_string()))
            }
            Some(_) => Ok(slot),
            None => {
                self.stats.record_miss();
                Err(CacheError::KeyNotFound(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        match self.index.remove_key(key) {
            Some(_) => {
                self.stats.set_total_entries(self.index.len());
                Ok(())
            }
            None => Err(CacheError::KeyNotFound(key.to_string())),
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.index.clear();
        self.stats.set_total_entries(0);
    }

    // == Reap Expired ==
    /// Removes expired entries according to `strategy`.
    ///
    /// Returns the number of entries removed.
    pub fn reap_expired(&mut self, strategy: SweepStrategy) -> usize {
        self.reap_expired_at(strategy, Instant::now())
    }

    pub(crate) fn reap_expired_at(&mut self, strategy: SweepStrategy, now: Instant) -> usize {
        let mut removed = 0;
        let mut cursor = self.index.back();

        while let Some(slot) = cursor {
            // Read the neighbour before the node can be unlinked
            cursor = self.index.prev_of(slot);

            let expired = self
                .index
                .entry(slot)
                .is_some_and(|entry| entry.is_expired_at(now));

            if expired {
                self.index.remove(slot);
                removed += 1;
            } else if strategy == SweepStrategy::Tail {
                break;
            }
        }

        if removed > 0 {
            self.stats.record_reaped(removed);
            self.stats.set_total_entries(self.index.len());
        }
        removed
    }

    // == Inspection ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the configured maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Returns the entry stored under `key`, expired or not.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.index.get(key)
    }

    /// Keys from most to least recently used.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys()
    }

    /// Returns a copy of the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the shared statistics counters.
    pub fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Checks the index invariants and the capacity bound.
    pub fn is_consistent(&self) -> bool {
        self.index.len() <= self.max_entries && self.index.is_consistent()
    }
}

impl<V: Clone> CacheStore<V> {
    // == Promote ==
    /// Moves the entry in `slot` to the head and returns a copy of its value.
    ///
    /// `slot` must come from [`lookup`](Self::lookup) with no write in
    /// between.
    pub fn promote(&mut self, slot: usize) -> Option<V> {
        let value = self.index.entry(slot)?.value.clone();
        self.index.move_to_front(slot);
        self.stats.record_hit();
        Some(value)
    }

    // == Get ==
    /// Retrieves a live value by key and marks it most recently used.
    ///
    /// # Errors
    /// - `KeyNotFound` if the key is absent
    /// - `KeyExpired` if its TTL has elapsed (the entry is not removed)
    pub fn get(&mut self, key: &str) -> Result<V> {
        let slot = self.lookup(key)?;
        self.promote(slot)
            .ok_or_else(|| CacheError::KeyNotFound(key.to_string()))
    }
}
