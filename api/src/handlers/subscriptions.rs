//! C8: subscription CRUD, maintaining C2 cache coherence on every mutation.

use actix_web::{HttpResponse, web};
use validator::Validate;

use relay_core::models::{SubscriptionCreate, SubscriptionUpdate};

use crate::dto::{ListQuery, SubscriptionBody, SubscriptionCreateBody, SubscriptionUpdateBody};
use crate::handlers::parse_id;
use crate::problems::ApiProblem;
use crate::state::AppState;

/// `POST /subscriptions/`
pub async fn create(
    state: web::Data<AppState>,
    body: web::Json<SubscriptionCreateBody>,
) -> Result<HttpResponse, ApiProblem> {
    body.validate().map_err(ApiProblem::Validation)?;

    let sub = state
        .store
        .create_subscription(SubscriptionCreate {
            target_url: body.target_url.clone(),
            secret: body.secret.clone(),
            events: body.events.clone(),
        })
        .await?;
    state.cache.put(&sub).await;

    Ok(HttpResponse::Created().json(SubscriptionBody::from(sub)))
}

/// `GET /subscriptions/{id}`
pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiProblem> {
    let id = parse_id(&path)?;
    let sub = state
        .cache
        .get_or_load(&state.store, id)
        .await?
        .ok_or(ApiProblem::NotFound("subscription not found"))?;

    Ok(HttpResponse::Ok().json(SubscriptionBody::from(sub)))
}

/// `GET /subscriptions/` — cache deliberately bypassed; a straight paginated store read.
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiProblem> {
    let subs = state
        .store
        .list_subscriptions(query.skip, query.limit)
        .await?;
    let body: Vec<SubscriptionBody> = subs.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// `PATCH /subscriptions/{id}`
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<SubscriptionUpdateBody>,
) -> Result<HttpResponse, ApiProblem> {
    let id = parse_id(&path)?;
    body.validate_present_fields()
        .map_err(ApiProblem::Validation)?;

    let sub = state
        .store
        .update_subscription(
            id,
            SubscriptionUpdate {
                target_url: body.target_url.clone(),
                secret: body.secret.clone(),
                events: body.events.clone(),
            },
        )
        .await?
        .ok_or(ApiProblem::NotFound("subscription not found"))?;
    state.cache.put(&sub).await;

    Ok(HttpResponse::Ok().json(SubscriptionBody::from(sub)))
}

/// `DELETE /subscriptions/{id}`
pub async fn delete(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiProblem> {
    let id = parse_id(&path)?;
    let deleted = state.store.delete_subscription(id).await?;
    if !deleted {
        return Err(ApiProblem::NotFound("subscription not found"));
    }
    state.cache.invalidate(id).await;

    Ok(HttpResponse::NoContent().finish())
}
