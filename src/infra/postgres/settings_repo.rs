use {crate::domain::error::SyncError, sqlx::PgPool};

pub const BILLING_PORTAL_CONFIGURATION_ID: &str = "stripe_billing_portal_configuration_id";
pub const WEBHOOK_ENDPOINT_ID: &str = "stripe_webhook_endpoint_id";
pub const WEBHOOK_ENDPOINT_SECRET: &str = "stripe_webhook_endpoint_secret";
pub const SITE_TITLE: &str = "title";
pub const SITE_URL: &str = "site_url";

pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, SyncError> {
    let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(value)
}

pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_many(pool: &PgPool, entries: &[(&str, &str)]) -> Result<(), SyncError> {
    let mut tx = pool.begin().await?;
    for (key, value) in entries {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn delete_many(pool: &PgPool, keys: &[&str]) -> Result<(), SyncError> {
    sqlx::query("DELETE FROM settings WHERE key = ANY($1)")
        .bind(keys)
        .execute(pool)
        .await?;
    Ok(())
}
