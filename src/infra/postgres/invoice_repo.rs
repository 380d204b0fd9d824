use {
    crate::domain::{error::SyncError, invoice::InvoiceUpdate},
    sqlx::{Postgres, Transaction},
    uuid::Uuid,
};

pub struct InvoiceRow {
    pub id: Uuid,
    pub status: String,
    pub last_provider_ts: i64,
}

pub async fn find(
    tx: &mut Transaction<'_, Postgres>,
    stripe_invoice_id: &str,
) -> Result<Option<InvoiceRow>, SyncError> {
    let row = sqlx::query_as::<_, (Uuid, String, i64)>(
        "SELECT id, status, last_provider_ts FROM invoices WHERE stripe_invoice_id = $1",
    )
    .bind(stripe_invoice_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(id, status, last_provider_ts)| InvoiceRow {
        id,
        status,
        last_provider_ts,
    }))
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    update: &InvoiceUpdate,
    member_id: Option<Uuid>,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        INSERT INTO invoices
            (id, member_id, stripe_invoice_id, stripe_subscription_id, status,
             amount_paid, currency, last_event_id, last_provider_ts)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(update.id)
    .bind(member_id)
    .bind(&update.invoice_id)
    .bind(update.subscription_id.as_deref())
    .bind(update.status.as_str())
    .bind(update.amount_paid)
    .bind(update.currency.as_deref())
    .bind(update.event_id.as_str())
    .bind(update.provider_ts)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    update: &InvoiceUpdate,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        UPDATE invoices
        SET status = $1, amount_paid = $2, last_event_id = $3,
            last_provider_ts = $4, updated_at = now()
        WHERE id = $5
        "#,
    )
    .bind(update.status.as_str())
    .bind(update.amount_paid)
    .bind(update.event_id.as_str())
    .bind(update.provider_ts)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn touch(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    event_id: &str,
    provider_ts: i64,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        UPDATE invoices
        SET last_event_id = $1, last_provider_ts = GREATEST(last_provider_ts, $2),
            updated_at = now()
        WHERE id = $3
        "#,
    )
    .bind(event_id)
    .bind(provider_ts)
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
