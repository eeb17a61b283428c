//! Raw ledger writes: stale marking and capture append
//!
//! The ledger is append-only history. A new capture for a natural key must
//! retire every previously-current row for that key before it becomes
//! current itself; both steps run in one transaction so the at-most-one-
//! current invariant holds even under partial failure. A fetch that never
//! reaches this point leaves the previous current row in place.

use crate::models::TenderDetail;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Append one fetched capture as the new current row for its natural key
///
/// Retires prior current rows for the key, then inserts the new snapshot
/// with `current = 1` and the given capture timestamp, atomically.
pub async fn record_capture(
    pool: &SqlitePool,
    detail: &TenderDetail,
    source_url: &str,
    captured_at: DateTime<Utc>,
) -> Result<i64> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to begin ledger transaction")?;

    // Stale marker: defensively retires every current row for the key,
    // not just the expected single one
    let retired = sqlx::query("UPDATE raw_tenders SET current = 0 WHERE name = ? AND current = 1")
        .bind(&detail.name)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if retired > 1 {
        tracing::warn!(
            name = %detail.name,
            retired,
            "Retired more than one current row for a single key"
        );
    }

    let result = sqlx::query(
        r#"
        INSERT INTO raw_tenders (
            name, detail_url, source_url, status, captured_at, current,
            announcement_date, authority_name, authority_ref, contract_object,
            eu_funding, base_budget, estimated_value, contract_type, cpv_code,
            execution_location, procurement_system, procedure_type,
            processing_type, submission_method, offer_deadline, result,
            awardee_name, bidder_count, award_amount, application_deadline,
            page_snapshot
        ) VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&detail.name)
    .bind(&detail.url)
    .bind(source_url)
    .bind(&detail.status)
    .bind(captured_at)
    .bind(&detail.announcement_date)
    .bind(&detail.authority_name)
    .bind(&detail.authority_ref)
    .bind(&detail.contract_object)
    .bind(&detail.eu_funding)
    .bind(&detail.base_budget)
    .bind(&detail.estimated_value)
    .bind(&detail.contract_type)
    .bind(&detail.cpv_code)
    .bind(&detail.execution_location)
    .bind(&detail.procurement_system)
    .bind(&detail.procedure_type)
    .bind(&detail.processing_type)
    .bind(&detail.submission_method)
    .bind(&detail.offer_deadline)
    .bind(&detail.result)
    .bind(&detail.awardee_name)
    .bind(&detail.bidder_count)
    .bind(&detail.award_amount)
    .bind(&detail.application_deadline)
    .bind(&detail.page_snapshot)
    .execute(&mut *tx)
    .await?;

    tx.commit()
        .await
        .context("Failed to commit ledger transaction")?;

    let row_id = result.last_insert_rowid();
    tracing::debug!(name = %detail.name, row_id, "Capture appended as current");

    Ok(row_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::raw_tenders;
    use ttk_common::db::Stores;

    fn detail(name: &str, status: &str) -> TenderDetail {
        TenderDetail {
            name: name.to_string(),
            url: format!("https://example.org/detail/{name}"),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_capture_becomes_current() {
        let stores = Stores::open_in_memory().await.unwrap();

        record_capture(
            &stores.raw,
            &detail("EXP-1", "Publicada"),
            "https://example.org/profile/1",
            Utc::now(),
        )
        .await
        .unwrap();

        assert_eq!(raw_tenders::count_current(&stores.raw, "EXP-1").await.unwrap(), 1);
        assert_eq!(raw_tenders::count_all(&stores.raw, "EXP-1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn recapture_retires_prior_row() {
        let stores = Stores::open_in_memory().await.unwrap();
        let source = "https://example.org/profile/1";

        record_capture(&stores.raw, &detail("EXP-1", "Publicada"), source, Utc::now())
            .await
            .unwrap();
        record_capture(&stores.raw, &detail("EXP-1", "Adjudicada"), source, Utc::now())
            .await
            .unwrap();

        // History is preserved, exactly one row stays current
        assert_eq!(raw_tenders::count_all(&stores.raw, "EXP-1").await.unwrap(), 2);
        assert_eq!(raw_tenders::count_current(&stores.raw, "EXP-1").await.unwrap(), 1);

        let current = raw_tenders::current_rows(&stores.raw).await.unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].status, "Adjudicada");
    }

    #[tokio::test]
    async fn keys_are_retired_independently() {
        let stores = Stores::open_in_memory().await.unwrap();
        let source = "https://example.org/profile/1";

        record_capture(&stores.raw, &detail("EXP-1", "Publicada"), source, Utc::now())
            .await
            .unwrap();
        record_capture(&stores.raw, &detail("EXP-2", "Publicada"), source, Utc::now())
            .await
            .unwrap();
        record_capture(&stores.raw, &detail("EXP-1", "Resuelta"), source, Utc::now())
            .await
            .unwrap();

        assert_eq!(raw_tenders::count_current(&stores.raw, "EXP-1").await.unwrap(), 1);
        assert_eq!(raw_tenders::count_current(&stores.raw, "EXP-2").await.unwrap(), 1);
    }
}
