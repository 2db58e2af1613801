//! C5: the delivery worker's per-job algorithm.
//!
//! One call to [`deliver`] executes exactly the state transition described by the module's
//! state machine: resolve the subscription, POST the payload, classify the response, write
//! exactly one log row, and reschedule a retry if the job hasn't exhausted its attempts.

use std::sync::Arc;
use std::time::Duration;

use relay_core::backoff::{MAX_ATTEMPTS, delay_after};
use relay_core::models::{DeliveryJob, Outcome};
use relay_core::{JobQueue, Store, SubscriptionCache};

use crate::error::WorkerError;

/// Handles shared by every delivery-worker task.
pub struct WorkerContext {
    pub store: Store,
    pub cache: SubscriptionCache,
    pub queue: JobQueue,
    pub http: reqwest::Client,
    pub http_timeout: Duration,
}

/// Process one dequeued job to completion: at most one log row written, at most one
/// retry re-enqueued.
pub async fn deliver(ctx: &Arc<WorkerContext>, job: DeliveryJob) -> Result<(), WorkerError> {
    let Some(sub) = ctx.cache.get_or_load(&ctx.store, job.subscription_id).await? else {
        tracing::info!(
            webhook_id = %job.webhook_id,
            subscription_id = %job.subscription_id,
            "subscription no longer exists, dropping in-flight job"
        );
        return Ok(());
    };

    let mut request = ctx
        .http
        .post(&sub.target_url)
        .json(&job.payload)
        .timeout(ctx.http_timeout);
    if let Some(event_type) = &job.event_type {
        request = request.header("X-Event-Type", event_type);
    }
    if let Some(signature) = &job.signature {
        request = request.header("X-Signature", signature);
    }

    let (status_code, error) = match request.send().await {
        Ok(resp) if resp.status().is_success() => (Some(i32::from(resp.status().as_u16())), None),
        Ok(resp) => {
            let code = i32::from(resp.status().as_u16());
            (Some(code), Some(format!("HTTP {code}")))
        }
        Err(err) => (None, Some(err.to_string())),
    };

    let attempt = job.attempt;
    let will_retry = error.is_some() && attempt < MAX_ATTEMPTS;
    let outcome = match &error {
        None => Outcome::Success,
        Some(_) if will_retry => Outcome::FailedAttempt,
        Some(_) => Outcome::Failure,
    };

    tracing::info!(
        webhook_id = %job.webhook_id,
        subscription_id = %job.subscription_id,
        attempt,
        ?outcome,
        ?status_code,
        "delivery attempt completed"
    );

    ctx.store
        .insert_delivery_log(
            job.webhook_id,
            job.subscription_id,
            &sub.target_url,
            attempt as i32,
            outcome,
            status_code,
            error.as_deref(),
        )
        .await?;

    if will_retry {
        // `will_retry` implies `attempt < MAX_ATTEMPTS`, so a delay always exists.
        if let Some(delay) = delay_after(attempt) {
            let next = DeliveryJob {
                attempt: attempt + 1,
                ..job
            };
            ctx.queue.enqueue_in(delay, &next).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_classification_matches_backoff_budget() {
        assert!(MAX_ATTEMPTS > 1);
        assert!(delay_after(MAX_ATTEMPTS - 1).is_some());
        assert!(delay_after(MAX_ATTEMPTS).is_none());
    }
}
