//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value together with its key and expiry deadline.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub value: V,
    /// Expiry deadline, None = never expires
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry whose deadline is computed from `ttl` at `now`.
    ///
    /// A zero `ttl` means the entry never expires.
    pub fn new(key: String, value: V, ttl: Duration, now: Instant) -> Self {
        Self {
            key,
            value,
            expires_at: deadline(ttl, now),
        }
    }

    // == Refresh ==
    /// Replaces the value and recomputes the deadline in place.
    pub fn refresh(&mut self, value: V, ttl: Duration, now: Instant) {
        self.value = value;
        self.expires_at = deadline(ttl, now);
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches the
    /// deadline, so a fully elapsed TTL never reads as live.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}

/// Zero TTL maps to no deadline, as does one past the clock's range.
fn deadline(ttl: Duration, now: Instant) -> Option<Instant> {
    if ttl.is_zero() {
        None
    } else {
        now.checked_add(ttl)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn entry(ttl: Duration) -> CacheEntry<&'static str> {
        CacheEntry::new("key".to_string(), "test_value", ttl, Instant::now())
    }

    #[test]
    fn test_entry_creation_no_ttl() {
        let entry = entry(Duration::ZERO);

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at.is_none());
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = entry(Duration::from_secs(60));

        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = entry(Duration::from_millis(50));

        assert!(!entry.is_expired_at(Instant::now()));
        sleep(Duration::from_millis(80));
        assert!(entry.is_expired_at(Instant::now()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry {
            key: "k".to_string(),
            value: (),
            expires_at: Some(now),
        };

        assert!(entry.is_expired_at(now), "Entry should be expired at boundary");
        assert!(!entry.is_expired_at(now - Duration::from_millis(1)));
    }

    #[test]
    fn test_refresh_replaces_value_and_deadline() {
        let now = Instant::now();
        let mut entry = CacheEntry::new("k".to_string(), 1, Duration::from_secs(1), now);

        entry.refresh(2, Duration::ZERO, now);

        assert_eq!(entry.value, 2);
        assert!(entry.expires_at.is_none());
    }
}
