// Force exposed items to be documented
#![deny(missing_docs)]

//! Logging and error-reporting bootstrap shared by every binary in this workspace.
//!
//! Both the API and the worker call [`init`] once at startup to wire `tracing` to stdout
//! (respecting `RUST_LOG`) and, if a DSN is configured, to forward panics and error-level
//! spans to Sentry.

use sentry::ClientInitGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize structured logging and, optionally, Sentry error reporting.
///
/// The returned guard must be kept alive for the lifetime of the process; dropping it
/// flushes any buffered events. Returns `None` when no DSN is configured.
pub fn init(sentry_dsn: Option<&str>, traces_sample_rate: f32) -> Option<ClientInitGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match sentry_dsn {
        Some(dsn) => {
            let guard = sentry::init((
                dsn,
                sentry::ClientOptions {
                    send_default_pii: false,
                    attach_stacktrace: true,
                    traces_sample_rate,
                    ..Default::default()
                },
            ));

            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .with(sentry::integrations::tracing::layer())
                .init();

            tracing::info!("error reporting initialized");
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();

            tracing::warn!("no SENTRY_DSN configured, error reporting is disabled");
            None
        }
    }
}
