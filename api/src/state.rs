//! Shared application state injected into every handler.

use relay_core::{JobQueue, Store, SubscriptionCache};

/// Handles to the store, cache and queue, composed once at process start and shared
/// across all request handlers via `actix_web::web::Data`.
#[derive(Clone)]
pub struct AppState {
    /// C1.
    pub store: Store,
    /// C2.
    pub cache: SubscriptionCache,
    /// C3.
    pub queue: JobQueue,
}
