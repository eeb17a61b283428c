//! Full tender detail as extracted from the detail page

use serde::{Deserialize, Serialize};

/// The complete field dictionary for one tender detail page
///
/// A closed struct rather than an open mapping: a renamed or missing source
/// field surfaces at the extraction boundary, not at merge time. Every
/// detail field is free text exactly as displayed; typing happens in the
/// canonical merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenderDetail {
    /// Tender name; the natural key
    pub name: String,
    /// Detail page link
    pub url: String,
    /// Licitation status at capture time
    pub status: String,
    /// Announcement date string from the page header block
    pub announcement_date: Option<String>,
    /// Raw page capture for audit/re-extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_snapshot: Option<Vec<u8>>,

    pub authority_name: Option<String>,
    /// Authority id text, verbatim and unvalidated
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
}
