//! Contracting-authority reference table operations

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use ttk_common::db::models::Authority;

/// Ids already present in the reference table
pub async fn existing_ids(pool: &SqlitePool) -> Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT id FROM authorities")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Insert a stub authority
///
/// Stubs carry the source-assigned id and the display name from one
/// representative raw row; tax id and URL await enrichment. Re-inserting an
/// existing id is a no-op.
pub async fn insert_stub(pool: &SqlitePool, id: i64, name: Option<&str>) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO authorities (id, name)
        VALUES (?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one authority by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Authority>> {
    let row = sqlx::query_as::<_, Authority>(
        "SELECT id, name, tax_id, url FROM authorities WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Count authorities
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM authorities")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
