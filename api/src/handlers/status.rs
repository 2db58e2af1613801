//! C7: read-only projections over the delivery log.

use actix_web::{HttpResponse, web};

use crate::dto::{AttemptsQuery, DeliveryAttemptBody, StatusResponse};
use crate::handlers::parse_id;
use crate::problems::ApiProblem;
use crate::state::AppState;

const RECENT_ATTEMPTS_LIMIT: i64 = 20;

/// `GET /status/{webhook_id}`
pub async fn webhook_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiProblem> {
    let webhook_id = parse_id(&path)?;

    let total = state.store.count_logs_for_webhook(webhook_id).await?;
    if total == 0 {
        return Err(ApiProblem::NotFound(
            "no delivery attempts recorded for this webhook_id",
        ));
    }

    let recent = state
        .store
        .logs_for_webhook(webhook_id, RECENT_ATTEMPTS_LIMIT)
        .await?;
    // `total > 0` guarantees at least one row was just read back, newest first.
    let last = recent
        .first()
        .ok_or(ApiProblem::NotFound("no delivery attempts recorded for this webhook_id"))?;

    let body = StatusResponse {
        webhook_id,
        subscription_id: last.subscription_id,
        total_attempts: total,
        final_outcome: last.outcome,
        last_attempt_at: last.timestamp,
        last_status_code: last.status_code,
        error: last.error.clone(),
        recent_attempts: recent.iter().cloned().map(Into::into).collect(),
    };

    Ok(HttpResponse::Ok().json(body))
}

/// `GET /subscriptions/{id}/attempts`
pub async fn subscription_attempts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<AttemptsQuery>,
) -> Result<HttpResponse, ApiProblem> {
    let subscription_id = parse_id(&path)?;
    let logs = state
        .store
        .logs_for_subscription(subscription_id, query.clamped_limit())
        .await?;
    let body: Vec<DeliveryAttemptBody> = logs.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}
