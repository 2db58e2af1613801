//! Per-unit delivery-worker loop: promote due scheduled jobs, block on `ready`, process one
//! job if present. Mirrors the reference project's `pg::look_for_work` polling idiom, with
//! the Postgres `SELECT ... FOR UPDATE SKIP LOCKED` claim replaced by a Redis `BRPOP`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::task::TaskTracker;

use crate::work::{WorkerContext, deliver};

/// How long a single `BRPOP` blocks before looping back to check for shutdown.
const DEQUEUE_POLL_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay before retrying after an infrastructure error, so a flapping Postgres/Redis
/// connection doesn't spin the unit in a tight loop.
const RESTART_DELAY: Duration = Duration::from_secs(1);

/// Runs unit `unit_id` until `task_tracker` is closed, restarting the inner loop on any
/// infrastructure error.
pub async fn run_unit(unit_id: u16, ctx: Arc<WorkerContext>, task_tracker: TaskTracker) {
    loop {
        if let Err(err) = look_for_work(unit_id, &ctx, &task_tracker).await {
            tracing::error!(unit_id, %err, "delivery unit crashed");
        }

        if task_tracker.is_closed() {
            break;
        }

        tokio::time::sleep(RESTART_DELAY).await;
        tracing::info!(unit_id, "restarting delivery unit");
    }

    tracing::debug!(unit_id, "delivery unit terminated");
}

async fn look_for_work(
    unit_id: u16,
    ctx: &Arc<WorkerContext>,
    task_tracker: &TaskTracker,
) -> anyhow::Result<()> {
    loop {
        if task_tracker.is_closed() {
            return Ok(());
        }

        if let Ok(moved) = ctx.queue.promote_due().await {
            if moved > 0 {
                tracing::trace!(unit_id, moved, "promoted scheduled jobs to ready");
            }
        }

        let job = ctx.queue.dequeue(DEQUEUE_POLL_TIMEOUT).await?;
        let Some(job) = job else {
            continue;
        };

        let webhook_id = job.webhook_id;
        if let Err(err) = deliver(ctx, job).await {
            tracing::error!(unit_id, %webhook_id, %err, "delivery job failed");
        }
    }
}
