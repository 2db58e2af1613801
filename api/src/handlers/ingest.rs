//! C4: ingestion handoff — accepts one HTTP POST, resolves the subscription, enqueues the
//! first delivery attempt.

use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use relay_core::models::DeliveryJob;

use crate::dto::IngestAccepted;
use crate::handlers::parse_id;
use crate::problems::ApiProblem;
use crate::state::AppState;

const EVENT_TYPE_HEADER: &str = "X-Event-Type";
const SIGNATURE_HEADER: &str = "X-Signature";

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// `POST /ingest/{subscription_id}`
pub async fn ingest(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiProblem> {
    let subscription_id = parse_id(&path)?;

    let sub = state
        .cache
        .get_or_load(&state.store, subscription_id)
        .await?
        .ok_or(ApiProblem::NotFound("Subscription not found"))?;

    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| ApiProblem::InvalidJsonBody)?;

    let job = DeliveryJob {
        webhook_id: Uuid::new_v4(),
        subscription_id: sub.id,
        payload,
        event_type: header_value(&req, EVENT_TYPE_HEADER),
        signature: header_value(&req, SIGNATURE_HEADER),
        attempt: 1,
    };

    state.queue.enqueue(&job).await?;

    Ok(HttpResponse::Accepted().json(IngestAccepted {
        webhook_id: job.webhook_id,
    }))
}
