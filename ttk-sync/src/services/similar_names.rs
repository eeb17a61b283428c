//! Similar-name annotation for awardees
//!
//! Awardee identity is exact-match on the stored name, so trivially
//! different spellings produce distinct rows. This pass scores every pair
//! of awardee names with Jaro-Winkler over a punctuation-collapsed
//! comparison key and records likely duplicates on each row for human
//! review. It annotates only; rows are never merged.

use crate::db::awardees;
use anyhow::Result;
use sqlx::SqlitePool;

/// Jaro-Winkler score at or above which two names are considered similar
const SIMILARITY_THRESHOLD: f64 = 0.93;

/// Comparison key: uppercase with punctuation collapsed to single spaces
///
/// Exact identity stays on the stored name; this key exists only for
/// scoring, so "PÉREZ, S.L." and "PEREZ SL" land close together.
fn comparison_key(name: &str) -> String {
    let upper = name.to_uppercase();
    let mut key = String::with_capacity(upper.len());
    let mut last_was_space = true;

    for c in upper.chars() {
        if c.is_alphanumeric() {
            key.push(c);
            last_was_space = false;
        } else if !last_was_space {
            key.push(' ');
            last_was_space = true;
        }
    }

    key.trim_end().to_string()
}

/// Annotate every awardee with its similar names; returns rows rewritten
///
/// Only rows whose computed annotation differs from the stored one are
/// written, so an unchanged reference table produces zero writes.
pub async fn annotate(pool: &SqlitePool) -> Result<usize> {
    let all = awardees::all(pool).await?;
    let keys: Vec<String> = all.iter().map(|a| comparison_key(&a.name)).collect();

    let mut updated = 0;

    for (i, awardee) in all.iter().enumerate() {
        let mut similar: Vec<&str> = Vec::new();

        for (j, other) in all.iter().enumerate() {
            if i == j {
                continue;
            }
            let score = strsim::jaro_winkler(&keys[i], &keys[j]);
            if score >= SIMILARITY_THRESHOLD {
                similar.push(other.name.as_str());
            }
        }

        let count = similar.len() as i64;
        let names = if similar.is_empty() {
            None
        } else {
            Some(similar.join("; "))
        };

        if awardee.similar_name_count != count || awardee.similar_names != names {
            awardees::update_similar_names(pool, awardee.id, count, names.as_deref()).await?;
            if count > 0 {
                tracing::debug!(name = %awardee.name, count, "Similar names recorded");
            }
            updated += 1;
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttk_common::db::Stores;

    #[test]
    fn comparison_key_collapses_punctuation() {
        assert_eq!(
            comparison_key("Construcciones Pérez, S.L."),
            "CONSTRUCCIONES PÉREZ S L"
        );
        assert_eq!(comparison_key("  obras--y  servicios  "), "OBRAS Y SERVICIOS");
    }

    #[test]
    fn near_duplicates_score_above_threshold() {
        let a = comparison_key("CONSTRUCCIONES PEREZ S.L.");
        let b = comparison_key("CONSTRUCCIONES PEREZ, SL");
        assert!(strsim::jaro_winkler(&a, &b) >= SIMILARITY_THRESHOLD);

        let c = comparison_key("FERROVIAL SERVICIOS SA");
        assert!(strsim::jaro_winkler(&a, &c) < SIMILARITY_THRESHOLD);
    }

    #[tokio::test]
    async fn annotates_both_members_of_a_pair() {
        let stores = Stores::open_in_memory().await.unwrap();
        awardees::insert_stub(&stores.canonical, "CONSTRUCCIONES PEREZ S.L.")
            .await
            .unwrap();
        awardees::insert_stub(&stores.canonical, "CONSTRUCCIONES PEREZ, SL")
            .await
            .unwrap();
        awardees::insert_stub(&stores.canonical, "FERROVIAL SERVICIOS SA")
            .await
            .unwrap();

        annotate(&stores.canonical).await.unwrap();

        let first = awardees::find_by_name(&stores.canonical, "CONSTRUCCIONES PEREZ S.L.")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.similar_name_count, 1);
        assert_eq!(first.similar_names.as_deref(), Some("CONSTRUCCIONES PEREZ, SL"));

        let third = awardees::find_by_name(&stores.canonical, "FERROVIAL SERVICIOS SA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(third.similar_name_count, 0);
    }

    #[tokio::test]
    async fn second_pass_writes_nothing() {
        let stores = Stores::open_in_memory().await.unwrap();
        awardees::insert_stub(&stores.canonical, "CONSTRUCCIONES PEREZ S.L.")
            .await
            .unwrap();
        awardees::insert_stub(&stores.canonical, "CONSTRUCCIONES PEREZ, SL")
            .await
            .unwrap();

        let first = annotate(&stores.canonical).await.unwrap();
        assert_eq!(first, 2);

        let second = annotate(&stores.canonical).await.unwrap();
        assert_eq!(second, 0);
    }
}
