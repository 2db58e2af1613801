//! Errors surfaced by the worker's internal fallible operations.
//!
//! HTTP-level failures (timeouts, non-2xx responses, transport errors) are not modeled here:
//! they are outcomes of a delivery attempt, classified and logged by [`crate::work`] rather
//! than propagated as Rust errors. This type only covers infrastructure failures that should
//! abort the current job iteration and let the outer supervision loop decide whether to
//! restart.

/// Failures while processing one job that are not part of the delivery outcome itself.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The persistent store (C1) failed.
    #[error("store error: {0}")]
    Store(#[from] relay_core::error::StoreError),

    /// The job queue (C3) failed.
    #[error("queue error: {0}")]
    Queue(#[from] relay_core::error::QueueError),
}
