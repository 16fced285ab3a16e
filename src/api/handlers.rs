//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Cache operations go
//! through the [`CacheBackend`] contract only, so any backend producing
//! `CacheError` can sit behind the router.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::backend::{CacheBackend, SharedBackend};
use crate::cache::{CacheStats, InMemoryCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend serving set/get/delete/clear
    pub cache: SharedBackend<Value>,
    /// Live counters reported by `/stats`
    pub stats: Arc<CacheStats>,
    /// TTL applied when a set request omits one
    pub default_ttl: Duration,
}

impl AppState {
    /// Creates a new AppState around an in-memory cache.
    pub fn new(cache: Arc<InMemoryCache<Value>>, default_ttl: Duration) -> Self {
        let stats = cache.stats_handle();
        Self {
            cache,
            stats,
            default_ttl,
        }
    }

    /// Creates a new AppState around any backend.
    pub fn with_backend(
        cache: SharedBackend<Value>,
        stats: Arc<CacheStats>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            cache,
            stats,
            default_ttl,
        }
    }

    /// Builds the in-memory cache described by `config` and wraps it.
    ///
    /// Also returns the cache handle so the caller can shut its reaper down.
    /// Fails with `InvalidConfig` if the default TTL is past the clock's range.
    pub fn from_config(config: &Config) -> Result<(Self, Arc<InMemoryCache<Value>>)> {
        if Instant::now().checked_add(config.default_ttl()).is_none() {
            return Err(CacheError::InvalidConfig(format!(
                "default TTL of {} seconds is out of range",
                config.default_ttl
            )));
        }
        let cache = Arc::new(InMemoryCache::with_options(config.cache_options())?);
        Ok((Self::new(Arc::clone(&cache), config.default_ttl()), cache))
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value in the cache with optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = req
        .ttl
        .map(Duration::from_secs)
        .unwrap_or(state.default_ttl);
    state.cache.set(&req.key, req.value, ttl)?;

    Ok(Json(SetResponse::new(req.key, ttl.as_secs())))
}

/// Handler for GET /get/:key
///
/// Retrieves a value from the cache by key.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /clear
pub async fn clear_handler(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    state.cache.clear()?;

    Ok(Json(ClearResponse::new()))
}

/// Handler for GET /stats
///
/// Reads the counters directly, without touching the cache lock.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.stats.snapshot()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        let cache = Arc::new(InMemoryCache::new(100).unwrap());
        AppState::new(cache, Duration::ZERO)
    }

    fn set_request(key: &str, value: Value, ttl: Option<u64>) -> SetRequest {
        SetRequest {
            key: key.to_string(),
            value,
            ttl,
        }
    }

    #[tokio::test]
    async fn test_set_and_get_handler() {
        let state = test_state();

        let req = set_request("test_key", json!({"n": 1}), None);
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(result.is_ok());

        let response = get_handler(State(state), Path("test_key".to_string()))
            .await
            .unwrap();
        assert_eq!(response.value, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_default_ttl_applies_when_omitted() {
        let cache = Arc::new(InMemoryCache::new(10).unwrap());
        let state = AppState::new(cache, Duration::from_secs(30));

        let response = set_handler(State(state), Json(set_request("k", json!(1), None)))
            .await
            .unwrap();
        assert_eq!(response.ttl, Some(30));
    }

    #[tokio::test]
    async fn test_get_nonexistent_key() {
        let state = test_state();

        let result = get_handler(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(CacheError::KeyNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();

        let req = set_request("to_delete", json!("v"), None);
        let stored = set_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(stored.ttl, None);

        let result = delete_handler(State(state.clone()), Path("to_delete".to_string())).await;
        assert!(result.is_ok());

        let result = get_handler(State(state), Path("to_delete".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let state = test_state();

        for key in ["a", "b"] {
            let req = set_request(key, json!(key), None);
            let stored = set_handler(State(state.clone()), Json(req)).await.unwrap();
            assert!(stored.message.contains(key));
        }

        let cleared = clear_handler(State(state.clone())).await.unwrap();
        assert!(!cleared.message.is_empty());

        let stats = stats_handler(State(state.clone())).await;
        assert_eq!(stats.total_entries, 0);
        assert!(get_handler(State(state), Path("a".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_set_invalid_request() {
        let state = test_state();

        let req = set_request("", json!("value"), None);
        let result = set_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_set_rejects_unrepresentable_ttl() {
        let state = test_state();

        let req = set_request("k", json!("v"), Some(u64::MAX));
        let result = set_handler(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert!(get_handler(State(state), Path("k".to_string())).await.is_err());
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = Config {
            max_entries: 2,
            ..Config::default()
        };

        let (state, cache) = AppState::from_config(&config).unwrap();
        assert_eq!(cache.capacity(), 2);
        assert_eq!(state.default_ttl, Duration::ZERO);
    }

    #[tokio::test]
    async fn test_from_config_rejects_unrepresentable_default_ttl() {
        let config = Config {
            default_ttl: u64::MAX,
            ..Config::default()
        };

        assert!(matches!(
            AppState::from_config(&config),
            Err(CacheError::InvalidConfig(_))
        ));
    }
}
