use {
    crate::domain::{error::SyncError, event::NewMemberEvent},
    sqlx::{PgPool, Postgres, Transaction},
    uuid::Uuid,
};

/// Dedup gate: record the provider event, return false if already seen.
pub async fn insert_provider_event(
    tx: &mut Transaction<'_, Postgres>,
    event_id: &str,
    object_id: &str,
    event_type: &str,
    provider_ts: i64,
    payload: &serde_json::Value,
) -> Result<bool, SyncError> {
    let inserted = sqlx::query_scalar::<_, bool>(
        r#"
        INSERT INTO provider_events (event_id, object_id, event_type, provider_ts, payload)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (event_id) DO NOTHING
        RETURNING true
        "#,
    )
    .bind(event_id)
    .bind(object_id)
    .bind(event_type)
    .bind(provider_ts)
    .bind(payload)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(inserted.is_some())
}

pub async fn insert_member_event(
    tx: &mut Transaction<'_, Postgres>,
    entry: &NewMemberEvent,
) -> Result<bool, SyncError> {
    let result = sqlx::query(
        r#"
        INSERT INTO member_events (id, member_id, external_id, event_id, action, actor, detail)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(entry.id)
    .bind(entry.member_id)
    .bind(entry.external_id.as_deref())
    .bind(&entry.event_id)
    .bind(&entry.action)
    .bind(&entry.actor)
    .bind(&entry.detail)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Record an event we don't translate (forward-compatibility: the provider's
/// catalog evolves independently). Dedup + history row, nothing else.
pub async fn log_passthrough(
    pool: &PgPool,
    external_id: Option<&str>,
    event_id: &str,
    event_type: &str,
    provider_ts: i64,
    payload: &serde_json::Value,
) -> Result<bool, SyncError> {
    let mut tx = pool.begin().await?;

    let is_new = insert_provider_event(
        &mut tx,
        event_id,
        external_id.unwrap_or(""),
        event_type,
        provider_ts,
        payload,
    )
    .await?;

    if !is_new {
        tx.commit().await?;
        return Ok(false);
    }

    let entry = NewMemberEvent {
        id: Uuid::now_v7(),
        member_id: None,
        external_id: external_id.map(|s| s.to_string()),
        event_id: event_id.to_string(),
        action: "event_received".to_string(),
        actor: "webhook:stripe".to_string(),
        detail: serde_json::json!({
            "event_type": event_type,
            "passthrough": true,
        }),
    };

    insert_member_event(&mut tx, &entry).await?;
    tx.commit().await?;
    Ok(true)
}
