//! Row models for both stores

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable snapshot of a source tender, as captured at a point in time
///
/// At most one row per `name` has `current = true`; the rest are retired
/// history. Free-text fields are stored verbatim, unvalidated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RawTender {
    pub id: i64,
    /// Natural key: the tender name, unique among current rows only
    pub name: String,
    pub detail_url: String,
    /// Authority profile endpoint the header was observed on
    pub source_url: String,
    pub status: String,
    pub captured_at: DateTime<Utc>,
    pub current: bool,
    pub announcement_date: Option<String>,
    pub authority_name: Option<String>,
    /// Opaque authority id text pulled verbatim from the source
    pub authority_ref: Option<String>,
    pub contract_object: Option<String>,
    pub eu_funding: Option<String>,
    pub base_budget: Option<String>,
    pub estimated_value: Option<String>,
    pub contract_type: Option<String>,
    pub cpv_code: Option<String>,
    pub execution_location: Option<String>,
    pub procurement_system: Option<String>,
    pub procedure_type: Option<String>,
    pub processing_type: Option<String>,
    pub submission_method: Option<String>,
    pub offer_deadline: Option<String>,
    pub result: Option<String>,
    pub awardee_name: Option<String>,
    pub bidder_count: Option<String>,
    pub award_amount: Option<String>,
    pub application_deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_snapshot: Option<Vec<u8>>,
}

/// The single normalized row per tender exposed to downstream consumers
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tender {
    pub id: i64,
    /// Natural key, unique
    pub name: String,
    pub detail_url: Option<String>,
    pub status: Option<String>,
    /// Capture timestamp of the raw row last accepted by the merger;
    /// monotonically non-decreasing per tender
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

/// A contracting body, created lazily from raw references
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Authority {
    /// Source-assigned numeric id, not guaranteed sequential
    pub id: i64,
    pub name: Option<String>,
    pub tax_id: Option<String>,
    pub url: Option<String>,
}

/// An entity that can win a contract, keyed by display name
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Awardee {
    /// Internal surrogate id
    pub id: i64,
    pub name: String,
    pub tax_id: Option<String>,
    pub url: Option<String>,
    /// Count of likely-duplicate names found by the similar-name detector
    pub similar_name_count: i64,
    /// "; "-joined list of those names
    pub similar_names: Option<String>,
}
