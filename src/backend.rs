//! Cache Backend Contract
//!
//! The operation set every cache backend implements, in-process or remote.
//! Callers written against [`CacheBackend`] can swap backends without
//! touching call sites.

use std::sync::Arc;
use std::time::Duration;

use crate::error::CacheError;

// == Cache Backend ==
/// Set / Get / Delete / Clear over string keys.
///
/// `Error` is whatever the backend naturally produces. A network-backed
/// implementation surfaces its transport errors unchanged rather than
/// mapping them onto [`CacheError`].
pub trait CacheBackend: Send + Sync {
    /// Value type accepted by `set` and returned by `get`
    type Value;
    /// Error reported by every operation
    type Error: std::error::Error + Send + Sync + 'static;

    /// Stores `value` under `key`. A zero `ttl` means the entry never expires.
    fn set(&self, key: &str, value: Self::Value, ttl: Duration) -> Result<(), Self::Error>;

    /// Retrieves the live value stored under `key`.
    fn get(&self, key: &str) -> Result<Self::Value, Self::Error>;

    /// Removes `key`.
    fn delete(&self, key: &str) -> Result<(), Self::Error>;

    /// Removes every key.
    fn clear(&self) -> Result<(), Self::Error>;
}

/// Type-erased backend shared across handlers.
pub type SharedBackend<V> = Arc<dyn CacheBackend<Value = V, Error = CacheError>>;

impl<B: CacheBackend + ?Sized> CacheBackend for Arc<B> {
    type Value = B::Value;
    type Error = B::Error;

    fn set(&self, key: &str, value: Self::Value, ttl: Duration) -> Result<(), Self::Error> {
        (**self).set(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Self::Value, Self::Error> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), Self::Error> {
        (**self).clear()
    }
}

impl<B: CacheBackend + ?Sized> CacheBackend for Box<B> {
    type Value = B::Value;
    type Error = B::Error;

    fn set(&self, key: &str, value: Self::Value, ttl: Duration) -> Result<(), Self::Error> {
        (**self).set(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Self::Value, Self::Error> {
        (**self).get(key)
    }

    fn delete(&self, key: &str) -> Result<(), Self::Error> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), Self::Error> {
        (**self).clear()
    }
}
