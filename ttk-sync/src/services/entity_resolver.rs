//! Lazy creation of referenced entities
//!
//! Scans current raw rows for authority ids and awardee names absent from
//! the reference tables and inserts stub rows for them, so the canonical
//! merger never has to create an entity as a side effect.

use crate::db::{authorities, awardees};
use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use ttk_common::normalize;

/// Entities created by one resolver pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub authorities_created: usize,
    pub awardees_created: usize,
}

/// Entity resolver over the two stores
pub struct EntityResolver {
    raw: SqlitePool,
    canonical: SqlitePool,
}

impl EntityResolver {
    pub fn new(raw: SqlitePool, canonical: SqlitePool) -> Self {
        Self { raw, canonical }
    }

    /// Run both passes; authorities and awardees are independent
    pub async fn resolve(&self) -> Result<ResolutionStats> {
        let authorities_created = self.resolve_authorities().await?;
        let awardees_created = self.resolve_awardees().await?;

        if authorities_created + awardees_created > 0 {
            tracing::info!(authorities_created, awardees_created, "Stub entities created");
        }

        Ok(ResolutionStats {
            authorities_created,
            awardees_created,
        })
    }

    /// Create stub authorities for ids referenced by current raw rows
    async fn resolve_authorities(&self) -> Result<usize> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT DISTINCT authority_ref FROM raw_tenders WHERE current = 1",
        )
        .fetch_all(&self.raw)
        .await?;

        let mut referenced: HashSet<i64> = HashSet::new();
        for (authority_ref,) in rows {
            let Some(text) = authority_ref else { continue };
            match normalize::parse_int(&text) {
                Some(id) => {
                    referenced.insert(id);
                }
                None => {
                    tracing::warn!(authority_ref = %text, "Dropping non-numeric authority ref");
                }
            }
        }

        let existing = authorities::existing_ids(&self.canonical).await?;
        let mut created = 0;

        for id in referenced.difference(&existing) {
            // One representative raw row supplies the display name
            let representative: Option<(Option<String>,)> = sqlx::query_as(
                r#"
                SELECT authority_name FROM raw_tenders
                WHERE current = 1 AND CAST(authority_ref AS INTEGER) = ?
                LIMIT 1
                "#,
            )
            .bind(*id)
            .fetch_optional(&self.raw)
            .await?;

            let name = representative.and_then(|(name,)| name);
            authorities::insert_stub(&self.canonical, *id, name.as_deref()).await?;
            tracing::debug!(id, name = ?name, "Stub authority created");
            created += 1;
        }

        Ok(created)
    }

    /// Create stub awardees for names referenced by current raw rows
    async fn resolve_awardees(&self) -> Result<usize> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT DISTINCT awardee_name FROM raw_tenders WHERE current = 1",
        )
        .fetch_all(&self.raw)
        .await?;

        // Placeholder and empty values mean "no awardee yet"
        let referenced: HashSet<String> = rows
            .into_iter()
            .filter_map(|(name,)| normalize::coerce_opt(name.as_deref()))
            .collect();

        let existing = awardees::existing_names(&self.canonical).await?;
        let mut created = 0;

        for name in referenced {
            if existing.contains(&name) {
                continue;
            }
            awardees::insert_stub(&self.canonical, &name).await?;
            tracing::debug!(name = %name, "Stub awardee created");
            created += 1;
        }

        Ok(created)
    }
}
