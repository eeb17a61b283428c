//! Raw ledger queries

use anyhow::Result;
use sqlx::SqlitePool;
use ttk_common::db::models::RawTender;

const RAW_COLUMNS: &str = "id, name, detail_url, source_url, status, captured_at, current, \
     announcement_date, authority_name, authority_ref, contract_object, eu_funding, \
     base_budget, estimated_value, contract_type, cpv_code, execution_location, \
     procurement_system, procedure_type, processing_type, submission_method, \
     offer_deadline, result, awardee_name, bidder_count, award_amount, \
     application_deadline, page_snapshot";

/// Load the current ledger rows observed on one authority profile endpoint
pub async fn current_for_source(pool: &SqlitePool, source_url: &str) -> Result<Vec<RawTender>> {
    let rows = sqlx::query_as::<_, RawTender>(&format!(
        "SELECT {RAW_COLUMNS} FROM raw_tenders WHERE current = 1 AND source_url = ? ORDER BY id"
    ))
    .bind(source_url)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Load every current ledger row
pub async fn current_rows(pool: &SqlitePool) -> Result<Vec<RawTender>> {
    let rows = sqlx::query_as::<_, RawTender>(&format!(
        "SELECT {RAW_COLUMNS} FROM raw_tenders WHERE current = 1 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count current rows for one natural key
pub async fn count_current(pool: &SqlitePool, name: &str) -> Result<i64> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM raw_tenders WHERE name = ? AND current = 1")
            .bind(name)
            .fetch_one(pool)
            .await?;

    Ok(count.0)
}

/// Count all rows (history included) for one natural key
pub async fn count_all(pool: &SqlitePool, name: &str) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM raw_tenders WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
