use {
    crate::domain::{
        checkout::CheckoutCompletion, error::SyncError, event::SyncOutcome, member::NewMember,
        notify::SignupNotifier,
    },
    crate::infra::postgres::{event_repo, member_repo},
    sqlx::PgPool,
};

/// Handle checkout completion: create or link the member, then fire the
/// signup notification at most once. The notification is gated on the event
/// being newly recorded AND the member being newly created, and goes out
/// only after the transaction commits — a redelivered event short-circuits
/// at the dedup gate and never reaches the notifier.
pub async fn process_checkout_completed(
    pool: &PgPool,
    notifier: &dyn SignupNotifier,
    completion: &CheckoutCompletion,
    actor: &str,
) -> Result<SyncOutcome, SyncError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET LOCAL lock_timeout = '5s'")
        .execute(&mut *tx)
        .await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(completion.lock_key())
        .execute(&mut *tx)
        .await?;

    let is_new = event_repo::insert_provider_event(
        &mut tx,
        completion.event_id.as_str(),
        &completion.session_id,
        &completion.event_type,
        completion.provider_ts,
        &completion.raw_event,
    )
    .await?;

    if !is_new {
        tx.commit().await?;
        return Ok(SyncOutcome::Duplicate);
    }

    let mut member = match completion.customer_id.as_deref() {
        Some(customer_id) => member_repo::find_by_customer(&mut tx, customer_id).await?,
        None => None,
    };
    if member.is_none() {
        if let Some(email) = completion.email.as_deref() {
            member = member_repo::find_by_email(&mut tx, email).await?;
        }
    }

    match member {
        Some(existing) => {
            // Known member checking out again — make sure the remote
            // customer is linked, no signup notification. Anything stored
            // that is not a real customer id gets overwritten.
            if let Some(customer_id) = completion.customer_id.as_deref() {
                let linked = matches!(
                    existing.stripe_customer_id.as_deref(),
                    Some(stored) if stored.starts_with("cus_")
                );
                if !linked {
                    member_repo::link_customer(&mut tx, existing.id, customer_id).await?;
                }
            }

            let mut entry = completion.member_event(actor, "checkout_completed");
            entry.member_id = Some(existing.id);
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(SyncOutcome::Updated(existing.id))
        }
        None => {
            let Some(email) = completion.email.clone() else {
                let mut entry = completion.member_event(actor, "event_received");
                entry.detail = serde_json::json!({
                    "event_type": completion.event_type,
                    "orphan": true,
                    "reason": "checkout session carries no email",
                });
                event_repo::insert_member_event(&mut tx, &entry).await?;
                tx.commit().await?;

                tracing::warn!(
                    session_id = %completion.session_id,
                    "checkout completed without email, no member created"
                );
                return Ok(SyncOutcome::Orphaned);
            };

            let new_member = NewMember::signup(
                email.clone(),
                completion.name.clone(),
                completion.customer_id.clone(),
            );
            member_repo::insert(&mut tx, &new_member).await?;

            let mut entry = completion.member_event(actor, "signup");
            entry.member_id = Some(new_member.id);
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;

            // Post-commit: delivery failures are logged, never retried —
            // retrying here is what double-sends emails.
            if let Err(e) = notifier.notify_signup(&email).await {
                tracing::error!(email = %email, error = %e, "signup notification failed");
            }

            Ok(SyncOutcome::Created(new_member.id))
        }
    }
}
