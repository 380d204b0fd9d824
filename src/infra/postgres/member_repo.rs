use {
    crate::domain::{error::SyncError, member::NewMember},
    sqlx::{Postgres, Transaction},
    uuid::Uuid,
};

pub struct MemberRow {
    pub id: Uuid,
    pub email: String,
    pub status: String,
    pub stripe_customer_id: Option<String>,
}

pub async fn find_by_customer(
    tx: &mut Transaction<'_, Postgres>,
    customer_id: &str,
) -> Result<Option<MemberRow>, SyncError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, email, status, stripe_customer_id FROM members WHERE stripe_customer_id = $1",
    )
    .bind(customer_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(id, email, status, stripe_customer_id)| MemberRow {
        id,
        email,
        status,
        stripe_customer_id,
    }))
}

pub async fn find_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> Result<Option<MemberRow>, SyncError> {
    let row = sqlx::query_as::<_, (Uuid, String, String, Option<String>)>(
        "SELECT id, email, status, stripe_customer_id FROM members WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(|(id, email, status, stripe_customer_id)| MemberRow {
        id,
        email,
        status,
        stripe_customer_id,
    }))
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    member: &NewMember,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        INSERT INTO members (id, email, name, stripe_customer_id, status)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(member.id)
    .bind(&member.email)
    .bind(&member.name)
    .bind(&member.stripe_customer_id)
    .bind(member.status.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn link_customer(
    tx: &mut Transaction<'_, Postgres>,
    member_id: Uuid,
    customer_id: &str,
) -> Result<(), SyncError> {
    sqlx::query("UPDATE members SET stripe_customer_id = $1, updated_at = now() WHERE id = $2")
        .bind(customer_id)
        .bind(member_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    member_id: Uuid,
    status: &str,
) -> Result<(), SyncError> {
    sqlx::query("UPDATE members SET status = $1, updated_at = now() WHERE id = $2")
        .bind(status)
        .bind(member_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Disconnect teardown: forget which remote customer each member maps to.
pub async fn clear_customer_links(pool: &sqlx::PgPool) -> Result<u64, SyncError> {
    let result = sqlx::query(
        "UPDATE members SET stripe_customer_id = NULL, updated_at = now() WHERE stripe_customer_id IS NOT NULL",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
