//! The data model shared by the store, cache, queue and both binaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// A registered target endpoint that receives webhooks.
///
/// Canonical copy lives in the persistent store (C1); a JSON-encoded projection of this
/// same shape is cached in Redis (C2) keyed by [`Subscription::id`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Globally unique, client-visible identifier.
    pub id: Uuid,
    /// Absolute HTTP(S) URL deliveries are POSTed to.
    pub target_url: String,
    /// Opaque value forwarded verbatim as the `X-Signature` header; never logged.
    pub secret: Option<String>,
    /// Event-type tags this subscription is interested in. Empty/absent means "accept all".
    pub events: Option<Vec<String>>,
    /// Assigned at insert, immutable thereafter.
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCreate {
    /// See [`Subscription::target_url`].
    pub target_url: String,
    /// See [`Subscription::secret`].
    pub secret: Option<String>,
    /// See [`Subscription::events`].
    pub events: Option<Vec<String>>,
}

/// Fields accepted when partially updating a subscription. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionUpdate {
    /// New target URL, if provided.
    pub target_url: Option<String>,
    /// New secret, if provided.
    pub secret: Option<String>,
    /// New event-type tags, if provided.
    pub events: Option<Vec<String>>,
}

/// A unit of delivery work. Lives only in the queue; never persisted beyond it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryJob {
    /// Identifies the logical event across all of its attempts.
    pub webhook_id: Uuid,
    /// The subscription this job is being delivered to.
    pub subscription_id: Uuid,
    /// JSON body as received at ingestion, forwarded verbatim.
    pub payload: serde_json::Value,
    /// Verbatim copy of the `X-Event-Type` header supplied at ingestion, if any.
    pub event_type: Option<String>,
    /// Verbatim copy of the `X-Signature` header supplied at ingestion, if any.
    pub signature: Option<String>,
    /// Monotonically increasing, 1-based.
    pub attempt: u32,
}

/// The terminal classification of a delivery attempt.
///
/// Stored in the `delivery_logs.outcome` TEXT column as its [`Display`] form; round-tripped
/// through [`Outcome::from_stored`] rather than a `sqlx::Type` derive, since the three
/// variants map to strings containing a space ("Failed Attempt") rather than a Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Outcome {
    /// The target responded with a 2xx status. Terminal; no further attempts.
    #[strum(serialize = "Success")]
    #[serde(rename = "Success")]
    Success,
    /// The attempt failed but another retry has been scheduled.
    #[strum(serialize = "Failed Attempt")]
    #[serde(rename = "Failed Attempt")]
    FailedAttempt,
    /// The attempt failed and the retry budget is exhausted. Terminal.
    #[strum(serialize = "Failure")]
    #[serde(rename = "Failure")]
    Failure,
}

impl Outcome {
    /// Parse the TEXT representation stored in `delivery_logs.outcome`.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "Success" => Self::Success,
            "Failed Attempt" => Self::FailedAttempt,
            _ => Self::Failure,
        }
    }
}

/// An append-only record of one delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryLog {
    /// Row identifier.
    pub id: Uuid,
    /// Identifies the logical event this attempt belongs to.
    pub webhook_id: Uuid,
    /// The subscription this attempt was made on behalf of.
    pub subscription_id: Uuid,
    /// Snapshot of the subscription's target URL at the time of the attempt.
    pub target_url: String,
    /// UTC instant the attempt completed.
    pub timestamp: DateTime<Utc>,
    /// 1-based attempt number within this webhook_id.
    pub attempt_number: i32,
    /// See [`Outcome`].
    pub outcome: Outcome,
    /// HTTP status of the target's response, if one was received.
    pub status_code: Option<i32>,
    /// Short error string; absent on success.
    pub error: Option<String>,
}
