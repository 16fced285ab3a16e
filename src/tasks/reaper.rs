//! Expiry Reaper Task
//!
//! Background task that periodically removes expired cache entries, so
//! memory is reclaimed even for keys that are never read again.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, SweepStrategy};
use crate::error::{CacheError, Result};

// == Reaper ==
/// Handle to a running reaper task.
///
/// The task stops when [`shutdown`](Reaper::shutdown) is awaited or when the
/// handle is dropped, whichever comes first.
#[derive(Debug)]
pub struct Reaper {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

/// Spawns a task that sweeps `store` every `interval`.
///
/// Each tick takes the store's write lock once and removes expired entries
/// according to `strategy`. An empty or fully live store is not an error;
/// the task just waits for the next tick.
///
/// # Errors
/// - `InvalidConfig` if `interval` is zero
/// - `NoRuntime` if called outside a Tokio runtime
pub fn spawn_reaper<V>(
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
    strategy: SweepStrategy,
) -> Result<Reaper>
where
    V: Send + Sync + 'static,
{
    if interval.is_zero() {
        return Err(CacheError::InvalidConfig(
            "reap interval must be greater than zero".to_string(),
        ));
    }

    let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
    let (shutdown, mut shutdown_rx) = watch::channel(false);

    let handle = runtime.spawn(async move {
        info!(
            "Starting expiry reaper with interval of {:?} ({} sweep)",
            interval, strategy
        );

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.write().reap_expired(strategy);

                    if removed > 0 {
                        info!("Expiry reaper: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry reaper: no expired entries found");
                    }
                }
                changed = shutdown_rx.changed() => {
                    // A dropped sender counts as a stop request too
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!("Expiry reaper stopped");
    });

    Ok(Reaper {
        shutdown,
        handle: Some(handle),
    })
}

impl Reaper {
    // == Shutdown ==
    /// Signals the task to stop and waits for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);

        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    warn!("Expiry reaper panicked: {}", err);
                }
            }
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.shutdown.send(true);
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_store(capacity: usize) -> Arc<RwLock<CacheStore<String>>> {
        Arc::new(RwLock::new(CacheStore::new(capacity).unwrap()))
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let store = shared_store(100);
        store
            .write()
            .set("expire_soon".to_string(), "value".to_string(), Duration::from_millis(100))
            .unwrap();

        let reaper = spawn_reaper(store.clone(), Duration::from_millis(50), SweepStrategy::Full)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(store.read().peek("expire_soon").is_none());
        assert_eq!(store.read().stats().reaped, 1);

        reaper.shutdown().await;
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let store = shared_store(100);
        {
            let mut guard = store.write();
            guard
                .set("long_lived".to_string(), "value".to_string(), Duration::from_secs(3600))
                .unwrap();
            guard
                .set("forever".to_string(), "value".to_string(), Duration::ZERO)
                .unwrap();
        }

        let reaper = spawn_reaper(store.clone(), Duration::from_millis(50), SweepStrategy::Full)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(store.write().get("long_lived").unwrap(), "value");
        assert_eq!(store.write().get("forever").unwrap(), "value");

        reaper.shutdown().await;
    }

    #[tokio::test]
    async fn test_reaper_survives_empty_store() {
        let store = shared_store(4);
        let reaper = spawn_reaper(store.clone(), Duration::from_millis(20), SweepStrategy::Tail)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!reaper.is_finished(), "Reaper must keep running on an empty store");

        store
            .write()
            .set("late".to_string(), "v".to_string(), Duration::from_millis(30))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(store.read().is_empty());

        reaper.shutdown().await;
    }

    #[tokio::test]
    async fn test_reaper_shutdown_joins_task() {
        let store = shared_store(4);
        let reaper = spawn_reaper(store.clone(), Duration::from_secs(1), SweepStrategy::Full)
            .unwrap();

        reaper.shutdown().await;

        // The task held the only other reference to the store
        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[tokio::test]
    async fn test_reaper_stops_on_drop() {
        let store = shared_store(4);
        let reaper = spawn_reaper(store.clone(), Duration::from_secs(1), SweepStrategy::Full)
            .unwrap();

        drop(reaper);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(Arc::strong_count(&store), 1);
    }

    #[tokio::test]
    async fn test_reaper_rejects_zero_interval() {
        let result = spawn_reaper(shared_store(4), Duration::ZERO, SweepStrategy::Full);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_reaper_requires_runtime() {
        let result = spawn_reaper(shared_store(4), Duration::from_secs(1), SweepStrategy::Full);
        assert!(matches!(result, Err(CacheError::NoRuntime)));
    }
}
