//! Canonical merge, newest-wins
//!
//! For every current raw row: insert a normalized canonical row when the
//! natural key is unknown, overwrite it when the capture is strictly newer
//! than the canonical `last_merged_at`, no-op otherwise. Each key's
//! read-then-conditionally-write runs in its own transaction. The merge is
//! idempotent: a second pass over unchanged ledger state writes nothing.

use crate::db::{raw_tenders, tenders};
use crate::db::tenders::NormalizedTender;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use ttk_common::normalize;
use ttk_common::db::models::RawTender;

/// Merge counters for one authority profile endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceMergeCounts {
    /// Canonical rows inserted or overwritten
    pub merged: usize,
    /// No-ops: the canonical row already held equal-or-newer data
    pub skipped_stale: usize,
}

/// Outcome of one merge pass
#[derive(Debug, Default)]
pub struct MergeStats {
    pub per_source: HashMap<String, SourceMergeCounts>,
    /// Natural keys skipped because more than one current row existed
    pub integrity_violations: usize,
}

/// Canonical merger over the two stores
pub struct CanonicalMerger {
    raw: SqlitePool,
    canonical: SqlitePool,
}

impl CanonicalMerger {
    pub fn new(raw: SqlitePool, canonical: SqlitePool) -> Self {
        Self { raw, canonical }
    }

    /// Merge every current raw row into the canonical store
    pub async fn merge_all(&self) -> Result<MergeStats> {
        let rows = raw_tenders::current_rows(&self.raw).await?;

        // More than one current row for a key is a stale-marker ordering
        // bug: surface it loudly and leave that key's canonical row alone.
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for row in &rows {
            *occurrences.entry(row.name.as_str()).or_insert(0) += 1;
        }

        let mut stats = MergeStats::default();
        let mut flagged: HashSet<&str> = HashSet::new();

        for row in &rows {
            if occurrences[row.name.as_str()] > 1 {
                if flagged.insert(row.name.as_str()) {
                    tracing::error!(
                        name = %row.name,
                        rows = occurrences[row.name.as_str()],
                        "Integrity violation: multiple current ledger rows for one key"
                    );
                    stats.integrity_violations += 1;
                }
                continue;
            }

            let counts = stats.per_source.entry(row.source_url.clone()).or_default();
            if self.merge_one(row).await? {
                counts.merged += 1;
            } else {
                counts.skipped_stale += 1;
            }
        }

        Ok(stats)
    }

    /// Merge a single raw row; true when the canonical store was written
    async fn merge_one(&self, row: &RawTender) -> Result<bool> {
        let normalized = normalize_row(row);

        let mut tx = self
            .canonical
            .begin()
            .await
            .context("Failed to begin merge transaction")?;

        let existing = tenders::find_by_name(&mut *tx, &row.name).await?;

        let written = match existing {
            None => {
                tenders::insert(&mut *tx, &normalized).await?;
                tracing::debug!(name = %row.name, "Canonical tender inserted");
                true
            }
            Some(current) if normalized.last_merged_at > current.last_merged_at => {
                tenders::overwrite(&mut *tx, &normalized).await?;
                tracing::debug!(name = %row.name, "Canonical tender overwritten");
                true
            }
            Some(_) => false,
        };

        tx.commit()
            .await
            .context("Failed to commit merge transaction")?;

        Ok(written)
    }
}

/// Apply the field normalizer to one raw snapshot
fn normalize_row(row: &RawTender) -> NormalizedTender {
    NormalizedTender {
        name: row.name.clone(),
        detail_url: Some(row.detail_url.clone()),
        status: normalize::coerce_opt(Some(&row.status)),
        last_merged_at: row.captured_at,
        announcement_date: parse_date_opt(row.announcement_date.as_deref()),
        authority_id: row
            .authority_ref
            .as_deref()
            .and_then(normalize::coerce_sentinel)
            .and_then(normalize::parse_int),
        authority_name: normalize::coerce_opt(row.authority_name.as_deref()),
        contract_object: normalize::coerce_opt(row.contract_object.as_deref()),
        eu_funding: normalize::coerce_opt(row.eu_funding.as_deref()),
        base_budget: parse_float_opt(row.base_budget.as_deref()),
        estimated_value: parse_float_opt(row.estimated_value.as_deref()),
        contract_type: normalize::coerce_opt(row.contract_type.as_deref()),
        cpv_code: normalize::coerce_opt(row.cpv_code.as_deref()),
        execution_location: normalize::coerce_opt(row.execution_location.as_deref()),
        procurement_system: normalize::coerce_opt(row.procurement_system.as_deref()),
        procedure_type: normalize::coerce_opt(row.procedure_type.as_deref()),
        processing_type: normalize::coerce_opt(row.processing_type.as_deref()),
        submission_method: normalize::coerce_opt(row.submission_method.as_deref()),
        offer_deadline: parse_date_opt(row.offer_deadline.as_deref()),
        result: normalize::coerce_opt(row.result.as_deref()),
        awardee_name: normalize::coerce_opt(row.awardee_name.as_deref()),
        bidder_count: row
            .bidder_count
            .as_deref()
            .and_then(normalize::coerce_sentinel)
            .and_then(normalize::parse_int),
        award_amount: parse_float_opt(row.award_amount.as_deref()),
        application_deadline: parse_date_opt(row.application_deadline.as_deref()),
    }
}

fn parse_date_opt(field: Option<&str>) -> Option<NaiveDateTime> {
    field
        .and_then(normalize::coerce_sentinel)
        .and_then(normalize::parse_date)
}

fn parse_float_opt(field: Option<&str>) -> Option<f64> {
    field
        .and_then(normalize::coerce_sentinel)
        .and_then(normalize::parse_float)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenderDetail;
    use crate::services::ledger;
    use chrono::{DateTime, TimeZone, Utc};
    use ttk_common::db::Stores;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, min, 0).unwrap()
    }

    fn detail(name: &str, status: &str) -> TenderDetail {
        TenderDetail {
            name: name.to_string(),
            url: format!("https://example.org/detail/{name}"),
            status: status.to_string(),
            base_budget: Some("120000.50".to_string()),
            offer_deadline: Some("31/12/2023 10:00:00".to_string()),
            bidder_count: Some("3".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn first_merge_inserts_normalized_row() {
        let stores = Stores::open_in_memory().await.unwrap();
        let captured = at(10, 0);
        ledger::record_capture(&stores.raw, &detail("EXP-1", "Publicada"), "src", captured)
            .await
            .unwrap();

        let merger = CanonicalMerger::new(stores.raw.clone(), stores.canonical.clone());
        let stats = merger.merge_all().await.unwrap();
        assert_eq!(stats.per_source["src"].merged, 1);

        let tender = tenders::find_by_name(&stores.canonical, "EXP-1")
            .await
            .unwrap()
            .expect("canonical row should exist");
        assert_eq!(tender.status.as_deref(), Some("Publicada"));
        assert_eq!(tender.base_budget, Some(120000.50));
        assert_eq!(tender.bidder_count, Some(3));
        assert_eq!(
            tender.offer_deadline.map(|d| d.to_string()),
            Some("2023-12-31 10:00:00".to_string())
        );
        assert_eq!(tender.last_merged_at, captured);
    }

    #[tokio::test]
    async fn newer_capture_overwrites() {
        let stores = Stores::open_in_memory().await.unwrap();
        let t1 = at(10, 0);
        let t2 = at(10, 1);

        ledger::record_capture(&stores.raw, &detail("EXP-1", "Publicada"), "src", t1)
            .await
            .unwrap();
        let merger = CanonicalMerger::new(stores.raw.clone(), stores.canonical.clone());
        merger.merge_all().await.unwrap();

        ledger::record_capture(&stores.raw, &detail("EXP-1", "Adjudicada"), "src", t2)
            .await
            .unwrap();
        let stats = merger.merge_all().await.unwrap();
        assert_eq!(stats.per_source["src"].merged, 1);

        let tender = tenders::find_by_name(&stores.canonical, "EXP-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tender.status.as_deref(), Some("Adjudicada"));
        assert_eq!(tender.last_merged_at, t2);
    }

    #[tokio::test]
    async fn equal_or_older_capture_is_a_noop() {
        let stores = Stores::open_in_memory().await.unwrap();

        ledger::record_capture(&stores.raw, &detail("EXP-1", "Publicada"), "src", at(10, 0))
            .await
            .unwrap();
        let merger = CanonicalMerger::new(stores.raw.clone(), stores.canonical.clone());
        merger.merge_all().await.unwrap();

        // Same ledger state again: nothing to write
        let stats = merger.merge_all().await.unwrap();
        assert_eq!(stats.per_source["src"].merged, 0);
        assert_eq!(stats.per_source["src"].skipped_stale, 1);
    }

    #[tokio::test]
    async fn duplicate_current_rows_are_flagged_not_merged() {
        let stores = Stores::open_in_memory().await.unwrap();

        // Bypass the ledger writer to fabricate the invariant violation
        for status in ["Publicada", "Adjudicada"] {
            sqlx::query(
                "INSERT INTO raw_tenders (name, detail_url, source_url, status, captured_at, current)
                 VALUES ('EXP-1', 'url', 'src', ?, ?, 1)",
            )
            .bind(status)
            .bind(at(10, 0))
            .execute(&stores.raw)
            .await
            .unwrap();
        }

        let merger = CanonicalMerger::new(stores.raw.clone(), stores.canonical.clone());
        let stats = merger.merge_all().await.unwrap();

        assert_eq!(stats.integrity_violations, 1);
        assert!(tenders::find_by_name(&stores.canonical, "EXP-1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn sentinel_fields_merge_as_null() {
        let stores = Stores::open_in_memory().await.unwrap();
        let mut d = detail("EXP-1", "Publicada");
        d.awardee_name = Some(normalize::DETAIL_PLACEHOLDER.to_string());
        d.award_amount = Some(String::new());
        ledger::record_capture(&stores.raw, &d, "src", at(10, 0))
            .await
            .unwrap();

        let merger = CanonicalMerger::new(stores.raw.clone(), stores.canonical.clone());
        merger.merge_all().await.unwrap();

        let tender = tenders::find_by_name(&stores.canonical, "EXP-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tender.awardee_name, None);
        assert_eq!(tender.award_amount, None);
    }
}
