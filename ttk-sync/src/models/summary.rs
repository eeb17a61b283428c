//! Run summary reporting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-authority stage counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthoritySummary {
    /// Authority profile endpoint
    pub source_url: String,
    /// Headers classified NEW
    pub new: usize,
    /// Headers classified CHANGED
    pub changed: usize,
    /// Headers dropped as UNCHANGED (no fetch)
    pub unchanged: usize,
    /// NEW/CHANGED headers whose detail fetch failed and was skipped
    pub fetch_failed: usize,
    /// Canonical rows inserted or overwritten from this authority's records
    pub merged: usize,
    /// Merge no-ops: the canonical row already held equal-or-newer data
    pub skipped_stale: usize,
}

impl AuthoritySummary {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }
}

/// Result of one full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub authorities: Vec<AuthoritySummary>,
    /// Endpoints whose header listing failed outright
    pub failed_endpoints: Vec<String>,
    /// Stub authorities created by the entity resolver
    pub authorities_created: usize,
    /// Stub awardees created by the entity resolver
    pub awardees_created: usize,
    /// Natural keys skipped at merge time due to a ledger integrity violation
    pub integrity_violations: usize,
}

impl RunSummary {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: None,
            authorities: Vec::new(),
            failed_endpoints: Vec::new(),
            authorities_created: 0,
            awardees_created: 0,
            integrity_violations: 0,
        }
    }

    /// Total canonical writes across all authorities
    pub fn total_merged(&self) -> usize {
        self.authorities.iter().map(|a| a.merged).sum()
    }

    /// Total headers re-fetched across all authorities
    pub fn total_fetched(&self) -> usize {
        self.authorities
            .iter()
            .map(|a| a.new + a.changed - a.fetch_failed)
            .sum()
    }
}
