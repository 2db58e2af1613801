//! Shared data model, persistent store (C1), subscription cache (C2) and job queue (C3)
//! for the webhook delivery service. Consumed by both the `api` and `worker` binaries.

pub mod backoff;
pub mod cache;
pub mod error;
pub mod models;
pub mod queue;
pub mod store;

pub use cache::SubscriptionCache;
pub use queue::JobQueue;
pub use store::Store;
