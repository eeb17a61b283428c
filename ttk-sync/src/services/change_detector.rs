//! Header change detection
//!
//! Compares a profile's header listing against the current ledger rows for
//! that profile and keeps only the headers that must be re-fetched. This is
//! the optimization the whole pipeline exists to provide: UNCHANGED headers
//! never trigger a fetch.

use crate::models::{ChangeKind, ChangeSet, PendingFetch, TenderHeader};
use std::collections::HashMap;
use ttk_common::db::models::RawTender;

/// Classify each header as NEW, CHANGED or UNCHANGED
///
/// NEW: natural key absent from the current rows. CHANGED: present with a
/// differing status. UNCHANGED: present with an equal status, dropped.
/// Output order follows the source listing order.
pub fn classify(headers: &[TenderHeader], current_rows: &[RawTender]) -> ChangeSet {
    let stored: HashMap<&str, &RawTender> = current_rows
        .iter()
        .map(|row| (row.name.as_str(), row))
        .collect();

    let mut set = ChangeSet::default();

    for header in headers {
        match stored.get(header.name.as_str()) {
            None => {
                tracing::debug!(name = %header.name, "Header is new");
                set.to_fetch.push(PendingFetch {
                    header: header.clone(),
                    kind: ChangeKind::New,
                });
            }
            Some(row) if row.status != header.status => {
                tracing::debug!(
                    name = %header.name,
                    stored = %row.status,
                    observed = %header.status,
                    "Header status changed"
                );
                set.to_fetch.push(PendingFetch {
                    header: header.clone(),
                    kind: ChangeKind::Changed,
                });
            }
            Some(_) => {
                set.unchanged += 1;
            }
        }
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn header(name: &str, status: &str) -> TenderHeader {
        TenderHeader {
            name: name.to_string(),
            url: format!("https://example.org/detail/{name}"),
            status: status.to_string(),
            observed_at: Utc::now(),
        }
    }

    fn current_row(name: &str, status: &str) -> RawTender {
        RawTender {
            id: 1,
            name: name.to_string(),
            detail_url: String::new(),
            source_url: "https://example.org/profile/1".to_string(),
            status: status.to_string(),
            captured_at: Utc::now(),
            current: true,
            announcement_date: None,
            authority_name: None,
            authority_ref: None,
            contract_object: None,
            eu_funding: None,
            base_budget: None,
            estimated_value: None,
            contract_type: None,
            cpv_code: None,
            execution_location: None,
            procurement_system: None,
            procedure_type: None,
            processing_type: None,
            submission_method: None,
            offer_deadline: None,
            result: None,
            awardee_name: None,
            bidder_count: None,
            award_amount: None,
            application_deadline: None,
            page_snapshot: None,
        }
    }

    #[test]
    fn unknown_header_is_new() {
        let set = classify(&[header("EXP-1", "Publicada")], &[]);
        assert_eq!(set.new_count(), 1);
        assert_eq!(set.changed_count(), 0);
        assert_eq!(set.unchanged, 0);
    }

    #[test]
    fn differing_status_is_changed() {
        let set = classify(
            &[header("EXP-1", "Adjudicada")],
            &[current_row("EXP-1", "Publicada")],
        );
        assert_eq!(set.new_count(), 0);
        assert_eq!(set.changed_count(), 1);
    }

    #[test]
    fn equal_status_is_dropped() {
        let set = classify(
            &[header("EXP-1", "Publicada")],
            &[current_row("EXP-1", "Publicada")],
        );
        assert!(set.to_fetch.is_empty());
        assert_eq!(set.unchanged, 1);
    }

    #[test]
    fn source_order_is_preserved() {
        let headers = vec![
            header("EXP-3", "Publicada"),
            header("EXP-1", "Adjudicada"),
            header("EXP-2", "Publicada"),
        ];
        let set = classify(&headers, &[current_row("EXP-1", "Publicada")]);

        let names: Vec<&str> = set.to_fetch.iter().map(|p| p.header.name.as_str()).collect();
        assert_eq!(names, vec!["EXP-3", "EXP-1", "EXP-2"]);
        assert_eq!(set.to_fetch[1].kind, ChangeKind::Changed);
    }
}
