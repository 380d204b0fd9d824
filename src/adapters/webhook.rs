use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::SyncError, event::SyncOutcome, id::EventId, webhook::WebhookEnvelope},
        services::event_router::dispatch,
    },
    axum::{Json, extract::State, http::HeaderMap},
};

#[tracing::instrument(
    name = "webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sig = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| SyncError::WebhookSignature("missing Stripe-Signature header".into()))?;

    // Verification first — nothing in the body is trusted before this.
    state.verifier.verify(body.as_bytes(), sig)?;

    let raw_event: serde_json::Value = serde_json::from_str(&body).map_err(SyncError::from)?;
    let envelope: WebhookEnvelope =
        serde_json::from_value(raw_event.clone()).map_err(SyncError::from)?;
    EventId::new(&envelope.id)?;

    // Add event context to the span so all subsequent logs are correlated.
    tracing::Span::current()
        .record("event_id", tracing::field::display(&envelope.id))
        .record("event_type", tracing::field::display(&envelope.event_type));

    match dispatch(&state, &envelope, &raw_event).await? {
        SyncOutcome::Created(id) => {
            tracing::info!(entity_id = %id, "record created");
            Ok(Json(serde_json::json!({"status": "created"})))
        }
        SyncOutcome::Updated(id) => {
            tracing::info!(entity_id = %id, "record updated");
            Ok(Json(serde_json::json!({"status": "updated"})))
        }
        SyncOutcome::Stale(id) => {
            tracing::info!(entity_id = %id, "stale event, skipped");
            Ok(Json(serde_json::json!({"status": "skipped"})))
        }
        SyncOutcome::Duplicate => {
            tracing::info!("duplicate event, already processed");
            Ok(Json(serde_json::json!({"status": "duplicate"})))
        }
        SyncOutcome::Orphaned => {
            tracing::info!("no matching member, event recorded");
            Ok(Json(serde_json::json!({"status": "orphaned"})))
        }
        SyncOutcome::Logged => {
            tracing::info!("unhandled event type, logged");
            Ok(Json(serde_json::json!({"status": "logged"})))
        }
    }
}
