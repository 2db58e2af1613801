use std::str::FromStr;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing_actix_web::TracingLogger;

use relay_api::{handlers, state::AppState};
use relay_core::{JobQueue, Store, SubscriptionCache};

const APP_NAME: &str = "relay-api";

#[derive(Debug, Clone, Parser)]
#[clap(author, about, version, name = APP_NAME)]
struct Config {
    /// Optional Sentry DSN for error reporting
    #[clap(long, env)]
    sentry_dsn: Option<String>,

    /// IP address on which to start the HTTP server
    #[clap(long, env, default_value = "127.0.0.1")]
    ip: String,

    /// Port on which to start the HTTP server
    #[clap(long, env, default_value = "8080")]
    port: u16,

    /// Database URL (with credentials)
    #[clap(long, env, hide_env_values = true)]
    database_url: String,

    /// Maximum number of connections to the database
    #[clap(long, env, default_value = "5")]
    max_db_connections: u32,

    /// Redis URL backing the subscription cache and job queue
    #[clap(long, env, hide_env_values = true)]
    redis_url: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Return value *must* be kept in a variable or else it will be dropped and the error
    // reporting integration won't work.
    let _telemetry = relay_telemetry::init(config.sentry_dsn.as_deref(), 1.0);

    tracing::info!("starting {APP_NAME} {}", clap::crate_version!());

    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect_with(
            PgConnectOptions::from_str(&config.database_url)?.application_name(APP_NAME),
        )
        .await?;
    let store = Store::new(pool);
    store.migrate().await?;
    tracing::info!(
        "connected to database with a pool of up to {} connections",
        config.max_db_connections
    );

    let redis_client = redis::Client::open(config.redis_url.clone())?;
    let redis_conn = redis_client.get_connection_manager().await?;
    let cache = SubscriptionCache::new(redis_conn.clone());
    let queue = JobQueue::new(redis_conn);
    tracing::info!("connected to redis");

    let app_state = AppState {
        store,
        cache,
        queue,
    };

    let ip = config.ip.clone();
    let port = config.port;
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(TracingLogger::default())
            .service(
                web::scope("/subscriptions")
                    .route("", web::post().to(handlers::subscriptions::create))
                    .route("/", web::post().to(handlers::subscriptions::create))
                    .route("", web::get().to(handlers::subscriptions::list))
                    .route("/", web::get().to(handlers::subscriptions::list))
                    .route("/{id}", web::get().to(handlers::subscriptions::get))
                    .route("/{id}", web::patch().to(handlers::subscriptions::update))
                    .route("/{id}", web::delete().to(handlers::subscriptions::delete))
                    .route(
                        "/{id}/attempts",
                        web::get().to(handlers::status::subscription_attempts),
                    ),
            )
            .service(web::resource("/ingest/{subscription_id}").route(web::post().to(handlers::ingest::ingest)))
            .service(web::resource("/status/{webhook_id}").route(web::get().to(handlers::status::webhook_status)))
    })
    .bind((ip.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
