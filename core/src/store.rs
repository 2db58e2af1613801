//! C1: durable storage of subscriptions and delivery logs.

use chrono::{DateTime, Utc};
use serde_json::Value as Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{DeliveryLog, Outcome, Subscription, SubscriptionCreate, SubscriptionUpdate};

/// Thin wrapper around a [`PgPool`] exposing the operations the rest of the system needs.
///
/// Cloning is cheap: `PgPool` is itself a handle around a connection pool.
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

struct SubscriptionRow {
    id: Uuid,
    target_url: String,
    secret: Option<String>,
    events: Option<Json>,
    created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Subscription {
            id: row.id,
            target_url: row.target_url,
            secret: row.secret,
            events: row
                .events
                .and_then(|v| serde_json::from_value(v).ok()),
            created_at: row.created_at,
        }
    }
}

struct DeliveryLogRow {
    id: Uuid,
    webhook_id: Uuid,
    subscription_id: Uuid,
    target_url: String,
    timestamp: DateTime<Utc>,
    attempt_number: i32,
    outcome: String,
    status_code: Option<i32>,
    error: Option<String>,
}

impl From<DeliveryLogRow> for DeliveryLog {
    fn from(row: DeliveryLogRow) -> Self {
        DeliveryLog {
            id: row.id,
            webhook_id: row.webhook_id,
            subscription_id: row.subscription_id,
            target_url: row.target_url,
            timestamp: row.timestamp,
            attempt_number: row.attempt_number,
            outcome: Outcome::from_stored(&row.outcome),
            status_code: row.status_code,
            error: row.error,
        }
    }
}

impl Store {
    /// Wrap an already-connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run pending migrations. Called once at process start by both binaries.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Exposes the underlying pool for callers that need raw access (e.g. health checks).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new subscription.
    pub async fn create_subscription(
        &self,
        input: SubscriptionCreate,
    ) -> Result<Subscription, StoreError> {
        let id = Uuid::new_v4();
        let events = input.events.as_ref().map(|e| serde_json::json!(e));
        let row = sqlx::query_as!(
            SubscriptionRow,
            r#"
            INSERT INTO subscriptions (id, target_url, secret, events)
            VALUES ($1, $2, $3, $4)
            RETURNING id, target_url, secret, events, created_at
            "#,
            id,
            input.target_url,
            input.secret,
            events,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Point read of a subscription by id.
    pub async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, StoreError> {
        let row = sqlx::query_as!(
            SubscriptionRow,
            r#"SELECT id, target_url, secret, events, created_at FROM subscriptions WHERE id = $1"#,
            id,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List subscriptions, stable order by `created_at`, offset + limit.
    pub async fn list_subscriptions(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Subscription>, StoreError> {
        let rows = sqlx::query_as!(
            SubscriptionRow,
            r#"
            SELECT id, target_url, secret, events, created_at FROM subscriptions
            ORDER BY created_at ASC
            OFFSET $1 LIMIT $2
            "#,
            skip,
            limit,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update. Returns `Ok(None)` if no such subscription exists.
    pub async fn update_subscription(
        &self,
        id: Uuid,
        patch: SubscriptionUpdate,
    ) -> Result<Option<Subscription>, StoreError> {
        let Some(current) = self.get_subscription(id).await? else {
            return Ok(None);
        };

        let target_url = patch.target_url.unwrap_or(current.target_url);
        let secret = patch.secret.or(current.secret);
        let events = patch.events.or(current.events);
        let events_json = events.as_ref().map(|e| serde_json::json!(e));

        let row = sqlx::query_as!(
            SubscriptionRow,
            r#"
            UPDATE subscriptions SET target_url = $2, secret = $3, events = $4
            WHERE id = $1
            RETURNING id, target_url, secret, events, created_at
            "#,
            id,
            target_url,
            secret,
            events_json,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(Some(row.into()))
    }

    /// Delete a subscription. Returns whether a row was actually removed.
    pub async fn delete_subscription(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query!(r#"DELETE FROM subscriptions WHERE id = $1"#, id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append one delivery log row. Durable once this returns.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_delivery_log(
        &self,
        webhook_id: Uuid,
        subscription_id: Uuid,
        target_url: &str,
        attempt_number: i32,
        outcome: Outcome,
        status_code: Option<i32>,
        error: Option<&str>,
    ) -> Result<DeliveryLog, StoreError> {
        let id = Uuid::new_v4();
        let outcome_str = outcome.to_string();
        let row = sqlx::query_as!(
            DeliveryLogRow,
            r#"
            INSERT INTO delivery_logs
                (id, webhook_id, subscription_id, target_url, "timestamp", attempt_number, outcome, status_code, error)
            VALUES ($1, $2, $3, $4, now(), $5, $6, $7, $8)
            RETURNING id, webhook_id, subscription_id, target_url, "timestamp", attempt_number, outcome, status_code, error
            "#,
            id,
            webhook_id,
            subscription_id,
            target_url,
            attempt_number,
            outcome_str,
            status_code,
            error,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Number of log rows recorded for a given webhook_id.
    pub async fn count_logs_for_webhook(&self, webhook_id: Uuid) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar!(
            r#"SELECT COUNT(*) as "count!" FROM delivery_logs WHERE webhook_id = $1"#,
            webhook_id,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Logs for a webhook_id, newest first, up to `limit`.
    pub async fn logs_for_webhook(
        &self,
        webhook_id: Uuid,
        limit: i64,
    ) -> Result<Vec<DeliveryLog>, StoreError> {
        let rows = sqlx::query_as!(
            DeliveryLogRow,
            r#"
            SELECT id, webhook_id, subscription_id, target_url, "timestamp", attempt_number, outcome, status_code, error
            FROM delivery_logs WHERE webhook_id = $1
            ORDER BY "timestamp" DESC
            LIMIT $2
            "#,
            webhook_id,
            limit,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Logs for a subscription, newest first, up to `limit`.
    pub async fn logs_for_subscription(
        &self,
        subscription_id: Uuid,
        limit: i64,
    ) -> Result<Vec<DeliveryLog>, StoreError> {
        let rows = sqlx::query_as!(
            DeliveryLogRow,
            r#"
            SELECT id, webhook_id, subscription_id, target_url, "timestamp", attempt_number, outcome, status_code, error
            FROM delivery_logs WHERE subscription_id = $1
            ORDER BY "timestamp" DESC
            LIMIT $2
            "#,
            subscription_id,
            limit,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Bulk-delete log rows older than `cutoff`. Returns the number of rows removed.
    pub async fn purge_logs_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query!(
            r#"DELETE FROM delivery_logs WHERE "timestamp" < $1"#,
            cutoff,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
