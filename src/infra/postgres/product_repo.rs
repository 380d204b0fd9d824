use {
    crate::domain::error::SyncError,
    sqlx::{PgPool, Postgres, Transaction},
    uuid::Uuid,
};

pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
}

/// Resolve what was purchased from the remote price id.
pub async fn find_by_price(
    tx: &mut Transaction<'_, Postgres>,
    price_id: &str,
) -> Result<Option<ProductRow>, SyncError> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT id, name FROM products WHERE stripe_price_id = $1",
    )
    .bind(price_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(id, name)| ProductRow { id, name }))
}

/// Disconnect teardown: detach the catalog from remote prices.
pub async fn clear_price_links(pool: &PgPool) -> Result<u64, SyncError> {
    let result =
        sqlx::query("UPDATE products SET stripe_price_id = NULL WHERE stripe_price_id IS NOT NULL")
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
