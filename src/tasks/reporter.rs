//! Cache Stats Reporter
//!
//! Background task that periodically logs cache statistics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::SharedCache;

/// Spawns a background task that logs cache statistics every
/// `interval_secs` seconds.
///
/// Reading the statistics enters the cache gate as a reader, like any
/// lookup.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(SharedCache::new(10, 102_400));
/// let reporter = spawn_stats_reporter(cache.clone(), 30);
/// // Later, during shutdown:
/// reporter.abort();
/// ```
pub fn spawn_stats_reporter(cache: Arc<SharedCache>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache stats reporter with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.stats().await {
                Ok(stats) => info!(
                    hits = stats.hits,
                    misses = stats.misses,
                    inserts = stats.inserts,
                    evictions = stats.evictions,
                    rejected = stats.rejected,
                    entries = stats.total_entries,
                    hit_rate = stats.hit_rate(),
                    "cache stats"
                ),
                Err(err) => {
                    warn!("stats reporter stopping: {}", err);
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reporter_keeps_running() {
        let cache = Arc::new(SharedCache::new(10, 1024));

        let handle = spawn_stats_reporter(cache, 1);

        // Long enough for at least one report
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test]
    async fn test_reporter_can_be_aborted() {
        let cache = Arc::new(SharedCache::new(10, 1024));

        let handle = spawn_stats_reporter(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
