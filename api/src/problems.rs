//! Unified error type for the REST surface.
//!
//! Every handler returns `Result<_, ApiProblem>`. The error body shape is the flat
//! `{"detail": ...}` contract the ingestion and management API is specified to produce —
//! deliberately not the RFC7807 `problem+json` shape used elsewhere in the reference
//! project, since the detail field here is either a plain string or, for 422 validation
//! failures, a list of per-field error objects.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

/// Errors recoverable into an HTTP response by a handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiProblem {
    /// The path segment was not a well-formed UUID.
    #[error("invalid UUID")]
    InvalidUuid,

    /// The request body failed schema validation (e.g. malformed target_url).
    #[error("validation error")]
    Validation(validator::ValidationErrors),

    /// The request body could not be parsed as JSON.
    #[error("invalid json body")]
    InvalidJsonBody,

    /// A referenced subscription or webhook id does not exist.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// An unexpected database or infrastructure failure.
    #[error("internal error")]
    Internal(#[from] sqlx::Error),

    /// The job queue (Redis) failed while enqueueing an ingested event.
    #[error("queue error: {0}")]
    Queue(#[from] relay_core::error::QueueError),
}

impl From<relay_core::error::StoreError> for ApiProblem {
    fn from(err: relay_core::error::StoreError) -> Self {
        match err {
            relay_core::error::StoreError::NotFound => ApiProblem::NotFound("not found"),
            relay_core::error::StoreError::Database(e) => {
                tracing::error!(%e, "database error");
                ApiProblem::Internal(e)
            }
        }
    }
}

impl ResponseError for ApiProblem {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiProblem::InvalidUuid | ApiProblem::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiProblem::InvalidJsonBody => StatusCode::BAD_REQUEST,
            ApiProblem::NotFound(_) => StatusCode::NOT_FOUND,
            ApiProblem::Internal(_) | ApiProblem::Queue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            ApiProblem::InvalidUuid => json!("id is not a valid UUID"),
            ApiProblem::Validation(errors) => {
                let items: Vec<_> = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            json!({
                                "loc": ["body", field],
                                "msg": e.message.clone().unwrap_or_else(|| e.code.clone()),
                                "type": e.code,
                            })
                        })
                    })
                    .collect();
                json!(items)
            }
            ApiProblem::InvalidJsonBody => json!("invalid json body received"),
            ApiProblem::NotFound(msg) => json!(*msg),
            ApiProblem::Internal(_) => json!("internal server error"),
            ApiProblem::Queue(err) => {
                tracing::error!(%err, "queue error");
                json!("internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(json!({ "detail": detail }))
    }
}
