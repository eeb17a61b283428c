//! Schema initialization for both stores
//!
//! Tables are created on first open. The raw ledger is append-only history;
//! its rows are never mutated except for the `current` flag. The canonical
//! store holds one normalized row per tender plus the two reference tables.

use crate::Result;
use sqlx::SqlitePool;

/// Initialize the raw ledger schema
pub async fn init_raw_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS raw_tenders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            detail_url TEXT NOT NULL,
            source_url TEXT NOT NULL,
            status TEXT NOT NULL,
            captured_at TEXT NOT NULL,
            current INTEGER NOT NULL DEFAULT 1,
            announcement_date TEXT,
            authority_name TEXT,
            authority_ref TEXT,
            contract_object TEXT,
            eu_funding TEXT,
            base_budget TEXT,
            estimated_value TEXT,
            contract_type TEXT,
            cpv_code TEXT,
            execution_location TEXT,
            procurement_system TEXT,
            procedure_type TEXT,
            processing_type TEXT,
            submission_method TEXT,
            offer_deadline TEXT,
            result TEXT,
            awardee_name TEXT,
            bidder_count TEXT,
            award_amount TEXT,
            application_deadline TEXT,
            page_snapshot BLOB
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_raw_tenders_name_current ON raw_tenders (name, current)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_raw_tenders_source_current ON raw_tenders (source_url, current)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Raw ledger schema initialized (raw_tenders)");

    Ok(())
}

/// Initialize the canonical store schema
pub async fn init_canonical_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authorities (
            id INTEGER PRIMARY KEY,
            name TEXT,
            tax_id TEXT,
            url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS awardees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            tax_id TEXT,
            url TEXT,
            similar_name_count INTEGER NOT NULL DEFAULT 0,
            similar_names TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tenders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            detail_url TEXT,
            status TEXT,
            last_merged_at TEXT NOT NULL,
            announcement_date TEXT,
            authority_id INTEGER REFERENCES authorities(id),
            authority_name TEXT,
            contract_object TEXT,
            eu_funding TEXT,
            base_budget REAL,
            estimated_value REAL,
            contract_type TEXT,
            cpv_code TEXT,
            execution_location TEXT,
            procurement_system TEXT,
            procedure_type TEXT,
            processing_type TEXT,
            submission_method TEXT,
            offer_deadline TEXT,
            result TEXT,
            awardee_name TEXT REFERENCES awardees(name),
            bidder_count INTEGER,
            award_amount REAL,
            application_deadline TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Canonical schema initialized (tenders, authorities, awardees)");

    Ok(())
}
