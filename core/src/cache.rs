//! C2: low-latency subscription lookup, write-through on the persistent store.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use uuid::Uuid;

use crate::models::Subscription;
use crate::store::Store;

const KEY_PREFIX: &str = "subscription:";

fn key(id: Uuid) -> String {
    format!("{KEY_PREFIX}{id}")
}

/// Redis-backed projection cache for subscriptions, keyed by id.
///
/// Every operation here is best-effort: a Redis failure is logged at `warn` and treated as
/// a cache miss rather than propagated, so correctness always falls back to the store.
#[derive(Clone)]
pub struct SubscriptionCache {
    conn: ConnectionManager,
}

impl SubscriptionCache {
    /// Wrap an already-connected Redis connection manager.
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Unconditional overwrite. Failures are swallowed.
    pub async fn put(&self, sub: &Subscription) {
        let mut conn = self.conn.clone();
        let Ok(encoded) = serde_json::to_string(sub) else {
            tracing::warn!(subscription_id = %sub.id, "failed to encode subscription for cache");
            return;
        };
        let result: Result<(), redis::RedisError> = conn.set(key(sub.id), encoded).await;
        if let Err(err) = result {
            tracing::warn!(subscription_id = %sub.id, %err, "cache put failed, ignoring");
        }
    }

    /// Returns the cached projection, or `None` on miss, decode failure, or Redis error.
    pub async fn get(&self, id: Uuid) -> Option<Subscription> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(key(id)).await {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(subscription_id = %id, %err, "cache get failed, treating as miss");
                return None;
            }
        };

        raw.and_then(|s| match serde_json::from_str(&s) {
            Ok(sub) => Some(sub),
            Err(err) => {
                tracing::warn!(subscription_id = %id, %err, "corrupt cache entry, treating as miss");
                None
            }
        })
    }

    /// Unconditional delete. Failures are swallowed.
    pub async fn invalidate(&self, id: Uuid) {
        let mut conn = self.conn.clone();
        let result: Result<(), redis::RedisError> = conn.del(key(id)).await;
        if let Err(err) = result {
            tracing::warn!(subscription_id = %id, %err, "cache invalidate failed, ignoring");
        }
    }

    /// Cache-first lookup with fall-through to the store and write-through on miss.
    ///
    /// Returns `None` only when the store itself has no such subscription.
    pub async fn get_or_load(
        &self,
        store: &Store,
        id: Uuid,
    ) -> Result<Option<Subscription>, crate::error::StoreError> {
        if let Some(sub) = self.get(id).await {
            return Ok(Some(sub));
        }

        match store.get_subscription(id).await? {
            Some(sub) => {
                self.put(&sub).await;
                Ok(Some(sub))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        let id = Uuid::nil();
        assert_eq!(key(id), "subscription:00000000-0000-0000-0000-000000000000");
    }
}
