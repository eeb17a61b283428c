//! Canonical tender operations

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Executor, Sqlite};
use ttk_common::db::models::Tender;

/// Normalized field set for one canonical write (insert or overwrite)
#[derive(Debug, Clone)]
pub struct NormalizedTender {
    pub name: String,
    pub detail_url: Option<String>,
    pub status: Option<String>,
    pub last_merged_at: DateTime<Utc>,
    pub announcement_date: Option<NaiveDateTime>,
    pub authority_id: Option<i64>,
    pub authority_name: Option<String>,
    pub contract_object: Option<String>,
    pub eu_funding: Option<String>,
    pub base_budget: Option<f64>,
    pub estimated_value: Option<f64>,
    pub contract_type: Option<String>,
    pub cpv_code: Option<String>,
    pub execution_location: Option<String>,
    pub procurement_system: Option<String>,
    pub procedure_type: Option<String>,
    pub processing_type: Option<String>,
    pub submission_method: Option<String>,
    pub offer_deadline: Option<NaiveDateTime>,
    pub result: Option<String>,
    pub awardee_name: Option<String>,
    pub bidder_count: Option<i64>,
    pub award_amount: Option<f64>,
    pub application_deadline: Option<NaiveDateTime>,
}

/// Look up a canonical tender by natural key
pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Tender>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, Tender>(
        r#"
        SELECT id, name, detail_url, status, last_merged_at, announcement_date,
               authority_id, authority_name, contract_object, eu_funding,
               base_budget, estimated_value, contract_type, cpv_code,
               execution_location, procurement_system, procedure_type,
               processing_type, submission_method, offer_deadline, result,
               awardee_name, bidder_count, award_amount, application_deadline
        FROM tenders
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(executor)
    .await?;

    Ok(row)
}

/// Insert a new canonical tender
pub async fn insert<'e, E>(executor: E, tender: &NormalizedTender) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO tenders (
            name, detail_url, status, last_merged_at, announcement_date,
            authority_id, authority_name, contract_object, eu_funding,
            base_budget, estimated_value, contract_type, cpv_code,
            execution_location, procurement_system, procedure_type,
            processing_type, submission_method, offer_deadline, result,
            awardee_name, bidder_count, award_amount, application_deadline
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&tender.name)
    .bind(&tender.detail_url)
    .bind(&tender.status)
    .bind(tender.last_merged_at)
    .bind(tender.announcement_date)
    .bind(tender.authority_id)
    .bind(&tender.authority_name)
    .bind(&tender.contract_object)
    .bind(&tender.eu_funding)
    .bind(tender.base_budget)
    .bind(tender.estimated_value)
    .bind(&tender.contract_type)
    .bind(&tender.cpv_code)
    .bind(&tender.execution_location)
    .bind(&tender.procurement_system)
    .bind(&tender.procedure_type)
    .bind(&tender.processing_type)
    .bind(&tender.submission_method)
    .bind(tender.offer_deadline)
    .bind(&tender.result)
    .bind(&tender.awardee_name)
    .bind(tender.bidder_count)
    .bind(tender.award_amount)
    .bind(tender.application_deadline)
    .execute(executor)
    .await?;

    Ok(())
}

/// Overwrite every mapped field of an existing canonical tender
pub async fn overwrite<'e, E>(executor: E, tender: &NormalizedTender) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        UPDATE tenders SET
            detail_url = ?,
            status = ?,
            last_merged_at = ?,
            announcement_date = ?,
            authority_id = ?,
            authority_name = ?,
            contract_object = ?,
            eu_funding = ?,
            base_budget = ?,
            estimated_value = ?,
            contract_type = ?,
            cpv_code = ?,
            execution_location = ?,
            procurement_system = ?,
            procedure_type = ?,
            processing_type = ?,
            submission_method = ?,
            offer_deadline = ?,
            result = ?,
            awardee_name = ?,
            bidder_count = ?,
            award_amount = ?,
            application_deadline = ?
        WHERE name = ?
        "#,
    )
    .bind(&tender.detail_url)
    .bind(&tender.status)
    .bind(tender.last_merged_at)
    .bind(tender.announcement_date)
    .bind(tender.authority_id)
    .bind(&tender.authority_name)
    .bind(&tender.contract_object)
    .bind(&tender.eu_funding)
    .bind(tender.base_budget)
    .bind(tender.estimated_value)
    .bind(&tender.contract_type)
    .bind(&tender.cpv_code)
    .bind(&tender.execution_location)
    .bind(&tender.procurement_system)
    .bind(&tender.procedure_type)
    .bind(&tender.processing_type)
    .bind(&tender.submission_method)
    .bind(tender.offer_deadline)
    .bind(&tender.result)
    .bind(&tender.awardee_name)
    .bind(tender.bidder_count)
    .bind(tender.award_amount)
    .bind(tender.application_deadline)
    .bind(&tender.name)
    .execute(executor)
    .await?;

    Ok(())
}

/// Count canonical tenders
pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenders")
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}
