//! Mini Cache - a pluggable cache with a bounded in-process backend
//!
//! Every backend implements [`CacheBackend`]. The in-process
//! [`InMemoryCache`] combines LRU eviction with per-entry TTL and runs a
//! background reaper that reclaims expired entries.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use backend::{CacheBackend, SharedBackend};
pub use cache::{CacheOptions, InMemoryCache, SweepStrategy};
pub use config::Config;
pub use error::{CacheError, Result};
