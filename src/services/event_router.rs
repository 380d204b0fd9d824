use {
    crate::AppState,
    crate::domain::{
        checkout::CheckoutCompletion,
        error::SyncError,
        event::SyncOutcome,
        id::{EventId, SubscriptionId},
        invoice::{InvoiceStatus, InvoiceUpdate},
        subscription::{SubscriptionStatus, SubscriptionUpdate, SubscriptionUpdateParams},
        webhook::{CheckoutSessionPayload, InvoicePayload, SubscriptionPayload, WebhookEnvelope},
    },
    crate::infra::postgres::event_repo,
    crate::services::{checkout_sync, invoice_sync, subscription_sync},
    uuid::Uuid,
};

const ACTOR: &str = "webhook:stripe";

/// Dispatch a verified envelope to the one translator that handles its
/// type. Unrecognized types are recorded and ignored — the provider's event
/// catalog evolves independently of this system.
pub async fn dispatch(
    state: &AppState,
    envelope: &WebhookEnvelope,
    raw_event: &serde_json::Value,
) -> Result<SyncOutcome, SyncError> {
    match envelope.event_type.as_str() {
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            let update = match subscription_update(envelope, raw_event) {
                Ok(update) => update,
                Err(SyncError::Validation(msg)) => {
                    return log_invalid(state, envelope, raw_event, &msg).await;
                }
                Err(e) => return Err(e),
            };
            subscription_sync::process_subscription_event(&state.pool, &update, ACTOR).await
        }
        "invoice.paid" | "invoice.payment_succeeded" | "invoice.payment_failed" => {
            let update = match invoice_update(envelope, raw_event) {
                Ok(update) => update,
                Err(SyncError::Validation(msg)) => {
                    return log_invalid(state, envelope, raw_event, &msg).await;
                }
                Err(e) => return Err(e),
            };
            invoice_sync::process_invoice_event(&state.pool, &update, ACTOR).await
        }
        "checkout.session.completed" => {
            let completion = match checkout_completion(envelope, raw_event) {
                Ok(completion) => completion,
                Err(SyncError::Validation(msg)) => {
                    return log_invalid(state, envelope, raw_event, &msg).await;
                }
                Err(e) => return Err(e),
            };
            checkout_sync::process_checkout_completed(
                &state.pool,
                state.notifier.as_ref(),
                &completion,
                ACTOR,
            )
            .await
        }
        _ => {
            let is_new = event_repo::log_passthrough(
                &state.pool,
                None,
                &envelope.id,
                &envelope.event_type,
                envelope.created,
                raw_event,
            )
            .await?;
            if is_new {
                Ok(SyncOutcome::Logged)
            } else {
                Ok(SyncOutcome::Duplicate)
            }
        }
    }
}

async fn log_invalid(
    state: &AppState,
    envelope: &WebhookEnvelope,
    raw_event: &serde_json::Value,
    msg: &str,
) -> Result<SyncOutcome, SyncError> {
    tracing::warn!(
        event_type = %envelope.event_type,
        "skipping event with invalid payload: {msg}"
    );
    let is_new = event_repo::log_passthrough(
        &state.pool,
        None,
        &envelope.id,
        &envelope.event_type,
        envelope.created,
        raw_event,
    )
    .await?;
    if is_new {
        Ok(SyncOutcome::Logged)
    } else {
        Ok(SyncOutcome::Duplicate)
    }
}

fn subscription_update(
    envelope: &WebhookEnvelope,
    raw_event: &serde_json::Value,
) -> Result<SubscriptionUpdate, SyncError> {
    let payload: SubscriptionPayload = serde_json::from_value(envelope.data.object.clone())
        .map_err(|e| SyncError::Validation(format!("subscription payload: {e}")))?;

    // subscription.deleted carries whatever status the object last had;
    // the deletion itself is what cancels it.
    let status = if envelope.event_type == "customer.subscription.deleted" {
        SubscriptionStatus::Canceled
    } else {
        SubscriptionStatus::try_from(payload.status.as_str())?
    };

    let price_id = payload.price_id().map(|s| s.to_string());
    Ok(SubscriptionUpdate::new(SubscriptionUpdateParams {
        subscription_id: SubscriptionId::new(&payload.id)?,
        customer_id: payload.customer.id().to_string(),
        status,
        price_id,
        cancel_at_period_end: payload.cancel_at_period_end,
        current_period_end: payload.current_period_end,
        event_id: EventId::new(&envelope.id)?,
        event_type: envelope.event_type.clone(),
        provider_ts: envelope.created,
        raw_event: raw_event.clone(),
    }))
}

fn invoice_update(
    envelope: &WebhookEnvelope,
    raw_event: &serde_json::Value,
) -> Result<InvoiceUpdate, SyncError> {
    let payload: InvoicePayload = serde_json::from_value(envelope.data.object.clone())
        .map_err(|e| SyncError::Validation(format!("invoice payload: {e}")))?;

    let status = match payload.status.as_deref() {
        Some(status) => InvoiceStatus::try_from(status)?,
        // payment_failed events can arrive while the invoice is still open
        None if envelope.event_type == "invoice.payment_failed" => InvoiceStatus::Open,
        None => InvoiceStatus::Paid,
    };

    let price_id = payload.price_id().map(|s| s.to_string());
    Ok(InvoiceUpdate {
        id: Uuid::now_v7(),
        invoice_id: payload.id.clone(),
        customer_id: payload.customer.as_ref().map(|c| c.id().to_string()),
        subscription_id: payload.subscription.as_ref().map(|s| s.id().to_string()),
        price_id,
        status,
        amount_paid: payload.amount_paid,
        currency: payload.currency.clone(),
        event_id: EventId::new(&envelope.id)?,
        event_type: envelope.event_type.clone(),
        provider_ts: envelope.created,
        raw_event: raw_event.clone(),
    })
}

fn checkout_completion(
    envelope: &WebhookEnvelope,
    raw_event: &serde_json::Value,
) -> Result<CheckoutCompletion, SyncError> {
    let payload: CheckoutSessionPayload = serde_json::from_value(envelope.data.object.clone())
        .map_err(|e| SyncError::Validation(format!("checkout session payload: {e}")))?;

    Ok(CheckoutCompletion {
        session_id: payload.id.clone(),
        customer_id: payload.customer.as_ref().map(|c| c.id().to_string()),
        email: payload.email().map(|s| s.to_string()),
        name: payload.name().map(|s| s.to_string()),
        mode: payload.mode.clone(),
        subscription_id: payload.subscription.as_ref().map(|s| s.id().to_string()),
        amount_total: payload.amount_total,
        currency: payload.currency.clone(),
        event_id: EventId::new(&envelope.id)?,
        event_type: envelope.event_type.clone(),
        provider_ts: envelope.created,
        raw_event: raw_event.clone(),
    })
}
