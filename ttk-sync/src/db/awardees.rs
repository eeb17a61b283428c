//! Awardee reference table operations

use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use ttk_common::db::models::Awardee;

/// Names already present in the reference table
pub async fn existing_names(pool: &SqlitePool) -> Result<HashSet<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT name FROM awardees")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Insert a stub awardee keyed by display name
///
/// Re-inserting an existing name is a no-op.
pub async fn insert_stub(pool: &SqlitePool, name: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO awardees (name)
        VALUES (?)
        ON CONFLICT(name) DO NOTHING
        "#,
    )
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every awardee
pub async fn all(pool: &SqlitePool) -> Result<Vec<Awardee>> {
    let rows = sqlx::query_as::<_, Awardee>(
        "SELECT id, name, tax_id, url, similar_name_count, similar_names FROM awardees ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Store the similar-name annotation for one awardee
pub async fn update_similar_names(
    pool: &SqlitePool,
    id: i64,
    count: i64,
    names: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE awardees SET similar_name_count = ?, similar_names = ? WHERE id = ?")
        .bind(count)
        .bind(names)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Load one awardee by display name
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Awardee>> {
    let row = sqlx::query_as::<_, Awardee>(
        "SELECT id, name, tax_id, url, similar_name_count, similar_names FROM awardees WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
