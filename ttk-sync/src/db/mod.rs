//! Store operations for the pipeline
//!
//! Free async functions per table, in the manner of the shared library's
//! db modules. Writes that must be atomic per natural key (retire-then-
//! append, conditional merge) live with their owning service.

pub mod authorities;
pub mod awardees;
pub mod raw_tenders;
pub mod tenders;
