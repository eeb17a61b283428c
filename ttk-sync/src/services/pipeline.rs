//! Full pipeline orchestration
//!
//! Per authority endpoint: header listing → change detection → detail fetch
//! for NEW/CHANGED headers → ledger append. Then once per run: entity
//! resolution, similar-name annotation, canonical merge. One failed detail
//! fetch skips that header only; a header listing that fails on every
//! endpoint aborts the run before any merge stage executes.

use crate::db::raw_tenders;
use crate::models::{AuthoritySummary, ChangeKind, RunSummary};
use crate::services::{change_detector, entity_resolver::EntityResolver, ledger, merger::CanonicalMerger, similar_names};
use crate::source::{DetailFetcher, HeaderSource};
use anyhow::{bail, Result};
use chrono::Utc;
use ttk_common::db::Stores;
use uuid::Uuid;

/// The sync pipeline over one source implementation
pub struct SyncPipeline<S> {
    stores: Stores,
    source: S,
}

impl<S> SyncPipeline<S>
where
    S: HeaderSource + DetailFetcher,
{
    pub fn new(stores: Stores, source: S) -> Self {
        Self { stores, source }
    }

    /// Run the full pipeline over the given authority endpoints
    pub async fn run(&self, links: &[String]) -> Result<RunSummary> {
        let mut summary = RunSummary::new(Uuid::new_v4(), Utc::now());
        tracing::info!(run_id = %summary.run_id, endpoints = links.len(), "Sync run started");

        for link in links {
            match self.sync_authority(link).await {
                Ok(authority) => summary.authorities.push(authority),
                Err(e) => {
                    tracing::error!(endpoint = %link, "Authority sync failed: {e}");
                    summary.failed_endpoints.push(link.clone());
                }
            }
        }

        // A fetch stage that produced nothing at all means the ledger state
        // is unknown; merging against it would canonize stale data.
        if !links.is_empty() && summary.failed_endpoints.len() == links.len() {
            bail!(
                "header stage failed for all {} endpoints; merge stages skipped",
                links.len()
            );
        }

        let resolver = EntityResolver::new(self.stores.raw.clone(), self.stores.canonical.clone());
        let resolution = resolver.resolve().await?;
        summary.authorities_created = resolution.authorities_created;
        summary.awardees_created = resolution.awardees_created;

        similar_names::annotate(&self.stores.canonical).await?;

        let merger = CanonicalMerger::new(self.stores.raw.clone(), self.stores.canonical.clone());
        let merge = merger.merge_all().await?;
        summary.integrity_violations = merge.integrity_violations;

        for authority in &mut summary.authorities {
            if let Some(counts) = merge.per_source.get(&authority.source_url) {
                authority.merged = counts.merged;
                authority.skipped_stale = counts.skipped_stale;
            }
        }

        summary.finished_at = Some(Utc::now());
        tracing::info!(
            run_id = %summary.run_id,
            fetched = summary.total_fetched(),
            merged = summary.total_merged(),
            "Sync run finished"
        );

        Ok(summary)
    }

    /// Fetch stage for one authority endpoint
    async fn sync_authority(&self, link: &str) -> Result<AuthoritySummary> {
        let headers = self.source.headers(link).await?;
        let current = raw_tenders::current_for_source(&self.stores.raw, link).await?;
        let changes = change_detector::classify(&headers, &current);

        let mut authority = AuthoritySummary::new(link);
        authority.new = changes.new_count();
        authority.changed = changes.changed_count();
        authority.unchanged = changes.unchanged;

        tracing::info!(
            endpoint = link,
            new = authority.new,
            changed = authority.changed,
            unchanged = authority.unchanged,
            "Headers classified"
        );

        for pending in &changes.to_fetch {
            let detail = match self.source.fetch(&pending.header).await {
                Ok(detail) => detail,
                Err(e) => {
                    // One failed fetch never aborts the batch
                    tracing::warn!(name = %pending.header.name, "Detail fetch failed, skipping: {e}");
                    authority.fetch_failed += 1;
                    continue;
                }
            };

            if pending.kind == ChangeKind::Changed {
                tracing::debug!(name = %pending.header.name, "Re-capturing changed tender");
            }
            ledger::record_capture(&self.stores.raw, &detail, link, Utc::now()).await?;
        }

        Ok(authority)
    }
}
