//! External source boundary
//!
//! The pipeline consumes extracted header listings and detail field
//! dictionaries; it never drives a browser itself. Implementations of the
//! two traits here supply that data. The built-in [`ReplaySource`] reads a
//! capture file exported by a browser-automation front end; a live driver
//! plugs in behind the same traits.

pub mod replay;

pub use replay::ReplaySource;

use crate::models::{TenderDetail, TenderHeader};
use std::time::Duration;
use thiserror::Error;

/// Source access errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The header listing for one endpoint could not be retrieved
    #[error("Header listing failed for {endpoint}: {reason}")]
    Listing { endpoint: String, reason: String },

    /// One tender's detail page could not be retrieved
    #[error("Detail fetch failed for {name}: {reason}")]
    Detail { name: String, reason: String },

    /// Capture file access error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Capture file did not parse
    #[error("Malformed capture file: {0}")]
    Capture(#[from] serde_json::Error),
}

/// Hints passed through to source implementations
///
/// `patience` bounds per-element waits in a live driver; `headless` hides
/// its browser window. Replay ignores both.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub patience: Duration,
    pub headless: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            patience: Duration::from_secs(5),
            headless: false,
        }
    }
}

/// Yields the lightweight tender headers for one authority profile endpoint
#[allow(async_fn_in_trait)]
pub trait HeaderSource {
    async fn headers(&self, endpoint: &str) -> Result<Vec<TenderHeader>, FetchError>;
}

/// Returns the full detail field dictionary for one header
#[allow(async_fn_in_trait)]
pub trait DetailFetcher {
    async fn fetch(&self, header: &TenderHeader) -> Result<TenderDetail, FetchError>;
}
