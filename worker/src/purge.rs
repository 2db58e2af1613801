//! C6: retention purge — periodically deletes delivery logs older than the retention horizon.

use chrono::Duration as ChronoDuration;
use chrono::Utc;
use relay_core::Store;
use tokio_util::task::TaskTracker;

/// Runs the purge task on a fixed interval until `task_tracker` is closed.
pub async fn run(
    store: Store,
    interval: std::time::Duration,
    retention_horizon: ChronoDuration,
    task_tracker: TaskTracker,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so the first purge happens one interval in.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if task_tracker.is_closed() {
            break;
        }

        let cutoff = Utc::now() - retention_horizon;
        match store.purge_logs_older_than(cutoff).await {
            Ok(deleted) => {
                tracing::info!(deleted, %cutoff, "retention purge completed");
            }
            Err(err) => {
                tracing::error!(%err, "retention purge failed");
            }
        }
    }

    tracing::debug!("retention purge task terminated");
}
