//! C3: the delivery job queue — a ready FIFO plus a time-delayed scheduled set.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::error::QueueError;
use crate::models::DeliveryJob;

const READY_KEY: &str = "webhook:ready";
const SCHEDULED_KEY: &str = "webhook:scheduled";

/// Redis-backed job queue. `ready` is a LIST (`LPUSH`/`BRPOP`); `scheduled` is a sorted set
/// scored by `ready_at` unix timestamp, moved into `ready` as entries become due.
#[derive(Clone)]
pub struct JobQueue {
    conn: ConnectionManager,
}

fn now_unix() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl JobQueue {
    /// Wrap an already-connected Redis connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Append a job to the ready queue.
    pub async fn enqueue(&self, job: &DeliveryJob) -> Result<(), QueueError> {
        let encoded = serde_json::to_string(job)?;
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(READY_KEY, encoded).await?;
        Ok(())
    }

    /// Place a job in the scheduled set, to become visible in `ready` after `delay`.
    pub async fn enqueue_in(&self, delay: Duration, job: &DeliveryJob) -> Result<(), QueueError> {
        let encoded = serde_json::to_string(job)?;
        let ready_at = now_unix() + delay.as_secs_f64();
        let mut conn = self.conn.clone();
        conn.zadd::<_, _, _, ()>(SCHEDULED_KEY, encoded, ready_at)
            .await?;
        Ok(())
    }

    /// Move every scheduled job whose `ready_at` has passed into the ready queue.
    ///
    /// Called by worker tasks between dequeue attempts, following the idle-poll idiom of
    /// the reference worker loop this was grounded on.
    pub async fn promote_due(&self) -> Result<u64, QueueError> {
        let mut conn = self.conn.clone();
        let due: Vec<String> = conn
            .zrangebyscore(SCHEDULED_KEY, f64::NEG_INFINITY, now_unix())
            .await?;

        let mut moved = 0u64;
        for payload in due {
            let removed: i64 = conn.zrem(SCHEDULED_KEY, &payload).await?;
            if removed > 0 {
                conn.lpush::<_, _, ()>(READY_KEY, &payload).await?;
                moved += 1;
            }
        }
        Ok(moved)
    }

    /// Block up to `timeout` waiting for a ready job, returning it if one arrived.
    pub async fn dequeue(&self, timeout: Duration) -> Result<Option<DeliveryJob>, QueueError> {
        let mut conn = self.conn.clone();
        let result: Option<(String, String)> = conn.brpop(READY_KEY, timeout.as_secs_f64()).await?;
        match result {
            Some((_, payload)) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    /// Current length of the ready queue.
    pub async fn count_ready(&self) -> Result<u64, QueueError> {
        let mut conn = self.conn.clone();
        let len: u64 = conn.llen(READY_KEY).await?;
        Ok(len)
    }
}
