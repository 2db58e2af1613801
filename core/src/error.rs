//! Error types shared by the store, cache and queue.

/// Failures that can occur while talking to the persistent store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested row does not exist.
    #[error("not found")]
    NotFound,

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failures that can occur while talking to the Redis-backed queue.
///
/// Cache operations never return an error to their caller (see [`crate::cache`]);
/// this type is only used internally there to decide whether to fall back to the store.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The underlying Redis connection failed.
    #[error("queue backend error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A queued payload could not be decoded back into a [`crate::models::DeliveryJob`].
    #[error("malformed job payload: {0}")]
    Decode(#[from] serde_json::Error),
}
