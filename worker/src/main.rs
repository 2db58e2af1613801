use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio::select;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::task::TaskTracker;

use relay_core::{JobQueue, Store, SubscriptionCache};
use relay_worker::queue_loop;
use relay_worker::purge;
use relay_worker::work::WorkerContext;

const APP_NAME: &str = "relay-worker";

#[derive(Debug, Clone, Parser)]
#[clap(author, about, version, name = APP_NAME)]
struct Config {
    /// Optional Sentry DSN for error reporting
    #[clap(long, env)]
    sentry_dsn: Option<String>,

    /// Database URL (with credentials)
    #[clap(long, env, hide_env_values = true)]
    database_url: String,

    /// Maximum number of connections to the database
    #[clap(long, env, default_value = "5")]
    max_db_connections: u32,

    /// Redis URL backing the subscription cache and job queue
    #[clap(long, env, hide_env_values = true)]
    redis_url: String,

    /// Timeout applied to every outbound delivery POST
    #[clap(long, env, value_parser = humantime::parse_duration, default_value = "5s")]
    http_timeout: Duration,

    /// Number of concurrent delivery-worker units
    #[clap(long, env, default_value = "4")]
    worker_concurrent: u16,

    /// How often the retention purge task runs
    #[clap(long, env, value_parser = humantime::parse_duration, default_value = "1h")]
    purge_interval: Duration,

    /// Age beyond which delivery logs are purged
    #[clap(long, env, value_parser = humantime::parse_duration, default_value = "72h")]
    retention_horizon: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Return value *must* be kept in a variable or else it will be dropped and the error
    // reporting integration won't work.
    let _telemetry = relay_telemetry::init(config.sentry_dsn.as_deref(), 1.0);

    tracing::info!("starting {APP_NAME} {}", clap::crate_version!());

    tracing::debug!("connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect_with(
            PgConnectOptions::from_str(&config.database_url)?.application_name(APP_NAME),
        )
        .await?;
    let store = Store::new(pool);
    store.migrate().await?;
    tracing::info!("connected to database");

    tracing::debug!("connecting to redis...");
    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let redis_conn = redis_client.get_connection_manager().await?;
    let cache = SubscriptionCache::new(redis_conn.clone());
    let queue = JobQueue::new(redis_conn);
    tracing::info!("connected to redis");

    let http = reqwest::Client::builder().build()?;

    let ctx = Arc::new(WorkerContext {
        store: store.clone(),
        cache,
        queue,
        http,
        http_timeout: config.http_timeout,
    });

    // Tracks supervisory tasks (signal handling, shutdown indicator); exits the process
    // if any of them panics or returns an error.
    let mut tasks = JoinSet::new();

    // Tracks in-flight worker/purge loops so we can wait for them to drain gracefully.
    let task_tracker = TaskTracker::new();

    let signal_tracker = task_tracker.clone();
    tasks.spawn(async move {
        let mut hangup = signal(SignalKind::hangup()).expect("could not listen to SIGHUP");
        let mut interrupt = signal(SignalKind::interrupt()).expect("could not listen to SIGINT");
        let mut terminate = signal(SignalKind::terminate()).expect("could not listen to SIGTERM");

        select! {
            Some(_) = hangup.recv() => shutdown(&signal_tracker),
            Some(_) = interrupt.recv() => shutdown(&signal_tracker),
            Some(_) = terminate.recv() => shutdown(&signal_tracker),
        }

        fn shutdown(task_tracker: &TaskTracker) {
            tracing::info!("finishing in-flight work before terminating...");
            task_tracker.close();
        }
    });

    let indicator_tracker = task_tracker.clone();
    tasks.spawn(async move {
        loop {
            if indicator_tracker.is_closed() {
                if indicator_tracker.is_empty() {
                    break;
                }
                tracing::info!(
                    remaining = indicator_tracker.len(),
                    "waiting for in-flight tasks to finish..."
                );
            }
            sleep(Duration::from_secs(1)).await;
        }
    });

    for unit_id in 0..config.worker_concurrent {
        let unit_ctx = ctx.clone();
        let unit_tracker = task_tracker.clone();
        task_tracker.spawn(async move {
            // Stagger unit start so a cold Redis connection doesn't get hit by every
            // unit at once.
            sleep(Duration::from_millis(u64::from(unit_id) * 100)).await;
            queue_loop::run_unit(unit_id, unit_ctx, unit_tracker).await;
        });
    }

    let purge_store = store.clone();
    let purge_tracker = task_tracker.clone();
    let retention_horizon = ChronoDuration::from_std(config.retention_horizon)
        .unwrap_or_else(|_| ChronoDuration::hours(72));
    task_tracker.spawn(async move {
        purge::run(
            purge_store,
            config.purge_interval,
            retention_horizon,
            purge_tracker,
        )
        .await;
    });

    // We wait for the supervisory tasks (signal handler, shutdown indicator) to terminate;
    // the indicator only exits once `task_tracker` is closed and every worker/purge unit has
    // drained, so this also waits out graceful shutdown.
    tasks.join_all().await;

    if task_tracker.is_closed() {
        tracing::info!("worker gracefully terminated");
        Ok(())
    } else {
        anyhow::bail!("fatal error")
    }
}
