//! Pipeline value types

pub mod detail;
pub mod header;
pub mod summary;

pub use detail::TenderDetail;
pub use header::TenderHeader;
pub use summary::{AuthoritySummary, RunSummary};

/// Classification of one header against the current ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Natural key absent from the current ledger rows
    New,
    /// Present, but the source status differs from the stored current row
    Changed,
}

/// One header that must be re-fetched, with its classification
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub header: TenderHeader,
    pub kind: ChangeKind,
}

/// Change detection output for one authority
///
/// `to_fetch` preserves source iteration order; UNCHANGED headers are
/// dropped here and never reach the fetcher.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub to_fetch: Vec<PendingFetch>,
    pub unchanged: usize,
}

impl ChangeSet {
    pub fn new_count(&self) -> usize {
        self.to_fetch
            .iter()
            .filter(|p| p.kind == ChangeKind::New)
            .count()
    }

    pub fn changed_count(&self) -> usize {
        self.to_fetch
            .iter()
            .filter(|p| p.kind == ChangeKind::Changed)
            .count()
    }
}
