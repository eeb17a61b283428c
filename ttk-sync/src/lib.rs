//! # TenderTrack Sync Pipeline
//!
//! Incremental synchronization of public-procurement records from
//! contracting-authority profiles into a normalized canonical store.
//!
//! Stages, leaves first:
//! 1. Header listing per authority (external, behind [`source::HeaderSource`])
//! 2. Change detection against the current raw ledger rows
//! 3. Detail fetch for NEW/CHANGED headers only ([`source::DetailFetcher`])
//! 4. Retire-then-append ledger write, one transaction per natural key
//! 5. Entity resolution (authorities, awardees) into the reference tables
//! 6. Newest-wins canonical merge
//!
//! Unchanged headers never trigger a fetch; re-running the pipeline over an
//! unchanged source performs zero writes.

pub mod db;
pub mod models;
pub mod services;
pub mod source;
