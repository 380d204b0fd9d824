use {
    crate::domain::{
        error::SyncError,
        event::SyncOutcome,
        member::{MemberStatus, derive_member_status},
        subscription::SubscriptionUpdate,
    },
    crate::infra::postgres::{event_repo, member_repo, subscription_repo},
    sqlx::PgPool,
};

/// Apply one subscription event: dedup, advisory lock, then insert or
/// update with a provider-timestamp stale guard. A later-timestamped state
/// is never overwritten by an earlier one, whatever the arrival order.
pub async fn process_subscription_event(
    pool: &PgPool,
    update: &SubscriptionUpdate,
    actor: &str,
) -> Result<SyncOutcome, SyncError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET LOCAL lock_timeout = '5s'")
        .execute(&mut *tx)
        .await?;

    // Serialize all processing for this subscription.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(update.subscription_id().as_str())
        .execute(&mut *tx)
        .await?;

    // Dedup: record the event. If already seen, bail early.
    let is_new = event_repo::insert_provider_event(
        &mut tx,
        update.event_id().as_str(),
        update.subscription_id().as_str(),
        update.event_type(),
        update.provider_ts(),
        update.raw_event(),
    )
    .await?;

    if !is_new {
        tx.commit().await?;
        return Ok(SyncOutcome::Duplicate);
    }

    let Some(member) = member_repo::find_by_customer(&mut tx, update.customer_id()).await? else {
        let mut entry = update.member_event(actor, "event_received");
        entry.detail = serde_json::json!({
            "event_type": update.event_type(),
            "customer_id": update.customer_id(),
            "orphan": true,
        });
        event_repo::insert_member_event(&mut tx, &entry).await?;
        tx.commit().await?;

        tracing::warn!(
            subscription_id = %update.subscription_id(),
            customer_id = %update.customer_id(),
            "no member for remote customer, event recorded only"
        );
        return Ok(SyncOutcome::Orphaned);
    };

    let member_status = MemberStatus::try_from(member.status.as_str())?;
    let existing = subscription_repo::find(&mut tx, update.subscription_id().as_str()).await?;

    match existing {
        None => {
            subscription_repo::insert(&mut tx, update, member.id).await?;
            sync_member_status(&mut tx, member.id, &member_status, update).await?;

            let mut entry = update.member_event(actor, "created");
            entry.member_id = Some(member.id);
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(SyncOutcome::Created(update.id()))
        }
        Some(row) => {
            let id = row.id;

            // Temporal check: strictly older events lose. Equal timestamps
            // fall through — Stripe events within one second share a ts.
            if update.provider_ts() < row.last_provider_ts {
                let mut entry = update.member_event(actor, "event_received");
                entry.member_id = Some(member.id);
                entry.detail = serde_json::json!({
                    "event_type": update.event_type(),
                    "current_status": row.status,
                    "incoming_status": update.status().as_str(),
                    "stale": true,
                });
                event_repo::insert_member_event(&mut tx, &entry).await?;

                // Watermark columns keep naming the newer event; the
                // member_events row above is the record of this delivery.
                tx.commit().await?;
                return Ok(SyncOutcome::Stale(id));
            }

            // Same observable state — track the event, change nothing.
            if row.status == update.status().as_str()
                && row.cancel_at_period_end == update.cancel_at_period_end()
            {
                subscription_repo::touch(
                    &mut tx,
                    id,
                    update.event_id().as_str(),
                    update.provider_ts(),
                )
                .await?;
                tx.commit().await?;
                return Ok(SyncOutcome::Stale(id));
            }

            subscription_repo::update(&mut tx, id, update).await?;
            sync_member_status(&mut tx, member.id, &member_status, update).await?;

            let mut entry = update.member_event(actor, "status_changed");
            entry.member_id = Some(member.id);
            entry.detail = serde_json::json!({
                "event_type": update.event_type(),
                "old_status": row.status,
                "new_status": update.status().as_str(),
            });
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(SyncOutcome::Updated(id))
        }
    }
}

async fn sync_member_status(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    member_id: uuid::Uuid,
    current: &MemberStatus,
    update: &SubscriptionUpdate,
) -> Result<(), SyncError> {
    let next = derive_member_status(current, update.status());
    if next != *current {
        member_repo::set_status(tx, member_id, next.as_str()).await?;
        tracing::info!(
            member_id = %member_id,
            from = %current,
            to = %next,
            "member status changed"
        );
    }
    Ok(())
}
