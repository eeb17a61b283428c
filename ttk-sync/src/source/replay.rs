//! Capture-file replay source
//!
//! A capture file is the JSON export of one browser-extraction session:
//! per endpoint, the header listing plus the detail dictionary of every
//! tender that was opened. Replaying a capture exercises the full pipeline
//! without a browser round-trip.

use super::{DetailFetcher, FetchError, HeaderSource, SourceOptions};
use crate::models::{TenderDetail, TenderHeader};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything captured for one authority profile endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointCapture {
    /// Authority profile endpoint
    pub url: String,
    /// Header listing in source iteration order
    pub headers: Vec<TenderHeader>,
    /// Detail dictionaries keyed by tender name
    #[serde(default)]
    pub details: HashMap<String, TenderDetail>,
}

/// One exported extraction session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureFile {
    pub endpoints: Vec<EndpointCapture>,
}

/// Replay source over a capture file
#[derive(Debug, Clone)]
pub struct ReplaySource {
    capture: CaptureFile,
}

impl ReplaySource {
    /// Load a capture file from disk
    pub fn load(path: &Path, options: SourceOptions) -> Result<Self, FetchError> {
        tracing::debug!(
            path = %path.display(),
            headless = options.headless,
            "Loading capture file"
        );
        let content = std::fs::read_to_string(path)?;
        let capture: CaptureFile = serde_json::from_str(&content)?;
        Ok(Self { capture })
    }

    /// Build directly from an in-memory capture (test fixtures)
    pub fn from_capture(capture: CaptureFile) -> Self {
        Self { capture }
    }

    fn endpoint(&self, endpoint: &str) -> Option<&EndpointCapture> {
        self.capture.endpoints.iter().find(|e| e.url == endpoint)
    }
}

impl HeaderSource for ReplaySource {
    async fn headers(&self, endpoint: &str) -> Result<Vec<TenderHeader>, FetchError> {
        match self.endpoint(endpoint) {
            Some(capture) => Ok(capture.headers.clone()),
            None => Err(FetchError::Listing {
                endpoint: endpoint.to_string(),
                reason: "endpoint not present in capture".to_string(),
            }),
        }
    }
}

impl DetailFetcher for ReplaySource {
    async fn fetch(&self, header: &TenderHeader) -> Result<TenderDetail, FetchError> {
        for endpoint in &self.capture.endpoints {
            if let Some(detail) = endpoint.details.get(&header.name) {
                return Ok(detail.clone());
            }
        }
        Err(FetchError::Detail {
            name: header.name.clone(),
            reason: "no detail captured for this tender".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::io::Write;

    fn sample_capture() -> CaptureFile {
        let header = TenderHeader {
            name: "EXP-1".to_string(),
            url: "https://example.org/detail/1".to_string(),
            status: "Publicada".to_string(),
            observed_at: Utc::now(),
        };
        let detail = TenderDetail {
            name: "EXP-1".to_string(),
            url: "https://example.org/detail/1".to_string(),
            status: "Publicada".to_string(),
            contract_object: Some("Obras de pavimentación".to_string()),
            ..Default::default()
        };
        CaptureFile {
            endpoints: vec![EndpointCapture {
                url: "https://example.org/profile/1".to_string(),
                headers: vec![header],
                details: HashMap::from([("EXP-1".to_string(), detail)]),
            }],
        }
    }

    #[tokio::test]
    async fn replays_headers_and_details() {
        let source = ReplaySource::from_capture(sample_capture());

        let headers = source
            .headers("https://example.org/profile/1")
            .await
            .unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].status, "Publicada");

        let detail = source.fetch(&headers[0]).await.unwrap();
        assert_eq!(detail.contract_object.as_deref(), Some("Obras de pavimentación"));
    }

    #[tokio::test]
    async fn unknown_endpoint_is_a_listing_error() {
        let source = ReplaySource::from_capture(sample_capture());
        let err = source.headers("https://example.org/other").await.unwrap_err();
        assert!(matches!(err, FetchError::Listing { .. }));
    }

    #[tokio::test]
    async fn missing_detail_is_a_detail_error() {
        let source = ReplaySource::from_capture(sample_capture());
        let header = TenderHeader {
            name: "EXP-MISSING".to_string(),
            url: String::new(),
            status: "Publicada".to_string(),
            observed_at: Utc::now(),
        };
        let err = source.fetch(&header).await.unwrap_err();
        assert!(matches!(err, FetchError::Detail { .. }));
    }

    #[test]
    fn loads_capture_from_disk() {
        let capture = sample_capture();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&capture).unwrap().as_bytes())
            .unwrap();

        let source = ReplaySource::load(file.path(), SourceOptions::default()).unwrap();
        assert_eq!(source.capture.endpoints.len(), 1);
    }
}
