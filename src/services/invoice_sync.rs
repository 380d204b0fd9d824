use {
    crate::domain::{error::SyncError, event::SyncOutcome, invoice::InvoiceUpdate},
    crate::infra::postgres::{event_repo, invoice_repo, member_repo, product_repo},
    sqlx::PgPool,
};

/// Apply one invoice lifecycle event to the invoice history. Same pipeline
/// shape as subscriptions: dedup, lock, stale guard, upsert, audit.
pub async fn process_invoice_event(
    pool: &PgPool,
    update: &InvoiceUpdate,
    actor: &str,
) -> Result<SyncOutcome, SyncError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SET LOCAL lock_timeout = '5s'")
        .execute(&mut *tx)
        .await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(&update.invoice_id)
        .execute(&mut *tx)
        .await?;

    let is_new = event_repo::insert_provider_event(
        &mut tx,
        update.event_id.as_str(),
        &update.invoice_id,
        &update.event_type,
        update.provider_ts,
        &update.raw_event,
    )
    .await?;

    if !is_new {
        tx.commit().await?;
        return Ok(SyncOutcome::Duplicate);
    }

    // An invoice without a matching member is still history worth keeping.
    let member = match update.customer_id.as_deref() {
        Some(customer_id) => member_repo::find_by_customer(&mut tx, customer_id).await?,
        None => None,
    };

    // Resolve what was purchased for the audit trail.
    let product = match update.price_id.as_deref() {
        Some(price_id) => product_repo::find_by_price(&mut tx, price_id).await?,
        None => None,
    };

    let mut entry = update.member_event(actor, "invoice_received");
    entry.member_id = member.as_ref().map(|m| m.id);
    entry.detail = serde_json::json!({
        "event_type": update.event_type,
        "status": update.status.as_str(),
        "amount_paid": update.amount_paid,
        "currency": update.currency,
        "product": product.as_ref().map(|p| p.name.as_str()),
    });

    let existing = invoice_repo::find(&mut tx, &update.invoice_id).await?;

    match existing {
        None => {
            invoice_repo::insert(&mut tx, update, member.map(|m| m.id)).await?;
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(SyncOutcome::Created(update.id))
        }
        Some(row) => {
            let id = row.id;

            if update.provider_ts < row.last_provider_ts {
                entry.detail["stale"] = serde_json::json!(true);
                event_repo::insert_member_event(&mut tx, &entry).await?;
                // Watermark columns keep naming the newer event; the
                // member_events row above is the record of this delivery.
                tx.commit().await?;
                return Ok(SyncOutcome::Stale(id));
            }

            if row.status == update.status.as_str() {
                invoice_repo::touch(&mut tx, id, update.event_id.as_str(), update.provider_ts)
                    .await?;
                tx.commit().await?;
                return Ok(SyncOutcome::Stale(id));
            }

            invoice_repo::update(&mut tx, id, update).await?;
            event_repo::insert_member_event(&mut tx, &entry).await?;
            tx.commit().await?;
            Ok(SyncOutcome::Updated(id))
        }
    }
}
