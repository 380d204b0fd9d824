use {
    crate::domain::{error::SyncError, subscription::SubscriptionUpdate},
    sqlx::{Postgres, Transaction},
    uuid::Uuid,
};

pub struct SubscriptionRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub status: String,
    pub cancel_at_period_end: bool,
    pub last_provider_ts: i64,
}

pub async fn find(
    tx: &mut Transaction<'_, Postgres>,
    stripe_subscription_id: &str,
) -> Result<Option<SubscriptionRow>, SyncError> {
    let row = sqlx::query_as::<_, (Uuid, Uuid, String, bool, i64)>(
        r#"
        SELECT id, member_id, status, cancel_at_period_end, last_provider_ts
        FROM subscriptions WHERE stripe_subscription_id = $1
        "#,
    )
    .bind(stripe_subscription_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(
        |(id, member_id, status, cancel_at_period_end, last_provider_ts)| SubscriptionRow {
            id,
            member_id,
            status,
            cancel_at_period_end,
            last_provider_ts,
        },
    ))
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    update: &SubscriptionUpdate,
    member_id: Uuid,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        INSERT INTO subscriptions
            (id, member_id, stripe_subscription_id, stripe_price_id, status,
             cancel_at_period_end, current_period_end, last_event_id, last_provider_ts)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(update.id())
    .bind(member_id)
    .bind(update.subscription_id().as_str())
    .bind(update.price_id())
    .bind(update.status().as_str())
    .bind(update.cancel_at_period_end())
    .bind(update.current_period_end())
    .bind(update.event_id().as_str())
    .bind(update.provider_ts())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    update: &SubscriptionUpdate,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        UPDATE subscriptions
        SET status = $1, stripe_price_id = COALESCE($2, stripe_price_id),
            cancel_at_period_end = $3, current_period_end = COALESCE($4, current_period_end),
            last_event_id = $5, last_provider_ts = $6, updated_at = now()
        WHERE id = $7
        "#,
    )
    .bind(update.status().as_str())
    .bind(update.price_id())
    .bind(update.cancel_at_period_end())
    .bind(update.current_period_end())
    .bind(update.event_id().as_str())
    .bind(update.provider_ts())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Record that an event was seen without changing subscription state.
pub async fn touch(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    event_id: &str,
    provider_ts: i64,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        UPDATE subscriptions
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
