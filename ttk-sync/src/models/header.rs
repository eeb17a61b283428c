//! Lightweight tender headers from the authority profile listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the profile's tender listing
///
/// Headers are cheap: name, detail link and licitation status only. The
/// change detector decides from these alone whether the full detail page
/// must be fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderHeader {
    /// Tender name; the natural key across time
    pub name: String,
    /// Detail page link
    pub url: String,
    /// Licitation status as displayed in the listing
    pub status: String,
    /// When the listing row was observed
    pub observed_at: DateTime<Utc>,
}
