//! Request/response bodies for the REST surface. Kept separate from `relay_core::models`
//! so that wire-format concerns (validation attributes, optional-field semantics) don't leak
//! into the shared core crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use relay_core::models::{DeliveryLog, Outcome, Subscription};

/// Body of `POST /subscriptions/`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscriptionCreateBody {
    /// Absolute HTTP(S) URL deliveries are POSTed to.
    #[validate(custom(function = "crate::validators::subscription_target_url"))]
    pub target_url: String,
    /// Opaque value forwarded verbatim as `X-Signature`.
    pub secret: Option<String>,
    /// Event-type tags this subscription accepts; absent/empty means "accept all".
    pub events: Option<Vec<String>>,
}

/// Body of `PATCH /subscriptions/{id}`. Every field is optional; only supplied fields
/// are applied.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SubscriptionUpdateBody {
    /// New target URL, if provided.
    #[validate(custom(function = "crate::validators::subscription_target_url"))]
    pub target_url: Option<String>,
    /// New secret, if provided.
    pub secret: Option<String>,
    /// New event-type tags, if provided.
    pub events: Option<Vec<String>>,
}

impl SubscriptionUpdateBody {
    /// Manual re-validation of only the fields that were actually supplied, since
    /// `validator`'s `#[validate]` attribute runs unconditionally on `Option` fields that
    /// derive `Validate` themselves but our custom function needs the same treatment here.
    pub fn validate_present_fields(&self) -> Result<(), validator::ValidationErrors> {
        if let Some(url) = &self.target_url {
            crate::validators::subscription_target_url(url).map_err(|e| {
                let mut errors = validator::ValidationErrors::new();
                errors.add("target_url", e);
                errors
            })?;
        }
        Ok(())
    }
}

/// Response body for subscription endpoints.
#[derive(Debug, Serialize)]
pub struct SubscriptionBody {
    /// See [`Subscription::id`].
    pub id: Uuid,
    /// See [`Subscription::target_url`].
    pub target_url: String,
    /// See [`Subscription::secret`].
    pub secret: Option<String>,
    /// See [`Subscription::events`].
    pub events: Option<Vec<String>>,
    /// See [`Subscription::created_at`].
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Subscription> for SubscriptionBody {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            target_url: sub.target_url,
            secret: sub.secret,
            events: sub.events,
            created_at: sub.created_at,
        }
    }
}

/// Response body for `POST /ingest/{subscription_id}`.
#[derive(Debug, Serialize)]
pub struct IngestAccepted {
    /// Identifies the logical event across all of its delivery attempts.
    pub webhook_id: Uuid,
}

/// One row of `recent_attempts` in [`StatusResponse`] and the `/attempts` listing.
#[derive(Debug, Serialize)]
pub struct DeliveryAttemptBody {
    /// Row identifier.
    pub id: Uuid,
    /// Identifies the logical event this attempt belongs to.
    pub webhook_id: Uuid,
    /// The subscription this attempt was made on behalf of.
    pub subscription_id: Uuid,
    /// Snapshot of the subscription's target URL at the time of the attempt.
    pub target_url: String,
    /// UTC instant the attempt completed.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// 1-based attempt number within this webhook_id.
    pub attempt_number: i32,
    /// See [`Outcome`].
    pub outcome: Outcome,
    /// HTTP status of the target's response, if one was received.
    pub status_code: Option<i32>,
    /// Short error string; absent on success.
    pub error: Option<String>,
}

impl From<DeliveryLog> for DeliveryAttemptBody {
    fn from(log: DeliveryLog) -> Self {
        Self {
            id: log.id,
            webhook_id: log.webhook_id,
            subscription_id: log.subscription_id,
            target_url: log.target_url,
            timestamp: log.timestamp,
            attempt_number: log.attempt_number,
            outcome: log.outcome,
            status_code: log.status_code,
            error: log.error,
        }
    }
}

/// Response body for `GET /status/{webhook_id}`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// The webhook id this status describes.
    pub webhook_id: Uuid,
    /// The subscription the most recent attempt was made on behalf of.
    pub subscription_id: Uuid,
    /// Total number of attempts recorded so far.
    pub total_attempts: i64,
    /// Outcome of the most recent attempt.
    pub final_outcome: Outcome,
    /// Timestamp of the most recent attempt.
    pub last_attempt_at: chrono::DateTime<chrono::Utc>,
    /// Status code of the most recent attempt, if any.
    pub last_status_code: Option<i32>,
    /// Error string of the most recent attempt, if any.
    pub error: Option<String>,
    /// Up to the 20 most recent attempts, newest first.
    pub recent_attempts: Vec<DeliveryAttemptBody>,
}

/// Query parameters for `GET /subscriptions/`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of rows to skip.
    #[serde(default)]
    pub skip: i64,
    /// Maximum number of rows to return.
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_list_limit() -> i64 {
    100
}

/// Query parameters for `GET /subscriptions/{id}/attempts`.
#[derive(Debug, Deserialize)]
pub struct AttemptsQuery {
    /// Maximum number of rows to return, capped at 100.
    #[serde(default = "default_attempts_limit")]
    pub limit: i64,
}

fn default_attempts_limit() -> i64 {
    20
}

impl AttemptsQuery {
    /// Clamp the requested limit to the [1, 100] range mandated by the spec.
    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, 100)
    }
}
