use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::TtlCache;

/// Handle to a running cache sweeper.
///
/// The sweeper stops when [`stop`](Self::stop) is called or when the handle
/// is dropped.
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signal the sweeper to stop. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Check if the sweeper has been told to stop.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the sweeper and wait for its task to finish.
    pub async fn join(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Cache sweeper task ended abnormally");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Spawn a Tokio task that purges expired entries from `cache` every `interval`.
///
/// Must be called from within a Tokio runtime. A zero `interval` panics in
/// `tokio::time::interval`; callers that want no sweeping should not spawn one.
pub fn spawn_sweeper<K, V>(cache: TtlCache<K, V>, interval: Duration) -> SweeperHandle
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        tracing::debug!(?interval, "Cache sweeper started");
        let mut tick = tokio::time::interval(interval);
        // The first tick completes immediately; nothing can have expired yet.
        tick.tick().await;
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let evicted = cache.evict_expired();
                    if evicted > 0 {
                        tracing::trace!(evicted, remaining = cache.len(), "Evicted expired cache entries");
                    }
                }
                _ = token.cancelled() => {
                    break;
                }
            }
        }
        tracing::debug!("Cache sweeper stopped");
    });

    SweeperHandle {
        cancel,
        task: Some(task),
    }
}
