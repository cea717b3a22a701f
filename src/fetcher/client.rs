//! pico-search API client.
//!
//! One blocking-style round trip per concept: build the URL, GET it with
//! `Accept: application/json`, read `search.totalResults`.

use crate::config::ApiConfig;
use crate::error::{CoverageError, Result};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the search client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub endpoint: String,
    pub facet_size: u32,
    pub facets: Vec<String>,
    pub content_type: String,
    pub page_size: u32,
    pub page_no: u32,
    pub timeout_seconds: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for FetchConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            facet_size: config.facet_size,
            facets: config.facets.clone(),
            content_type: config.content_type.clone(),
            page_size: config.page_size,
            page_no: config.page_no,
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// Client for the coverage counts of the pico-search API.
#[derive(Debug, Clone)]
pub struct CoverageClient {
    config: FetchConfig,
    http_client: reqwest::Client,
}

impl CoverageClient {
    /// Create a client. The endpoint is validated up front.
    pub fn new(config: FetchConfig) -> Result<Self> {
        Url::parse(&config.endpoint).map_err(|e| CoverageError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Full request URL for a query fragment.
    ///
    /// Only the content type is form-encoded. Facets keep their literal
    /// commas, and the fragment is appended as-is since population fragments
    /// already carry the encoded OR separator.
    pub fn search_url(&self, fragment: &str) -> Result<String> {
        let mut url =
            Url::parse(&self.config.endpoint).map_err(|e| CoverageError::InvalidEndpoint {
                endpoint: self.config.endpoint.clone(),
                reason: e.to_string(),
            })?;

        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("contentType", &self.config.content_type);
        let content_type = url.query().unwrap_or_default().to_string();

        // set_query leaves ',' and existing %-escapes untouched
        url.set_query(Some(&format!(
            "facetSize={}&facets={}&{}",
            self.config.facet_size,
            self.config.facets.join(","),
            content_type
        )));

        Ok(format!(
            "{}&{}&pageSize={}&pageNo={}",
            url, fragment, self.config.page_size, self.config.page_no
        ))
    }

    /// Fetch the coverage count for one concept.
    pub async fn fetch_coverage(&self, concept: &str, fragment: &str) -> Result<u64> {
        let url = self.search_url(fragment)?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Request for '{}' timed out", concept);
                } else if e.is_connect() {
                    warn!("Cannot connect to {}", self.config.endpoint);
                }
                CoverageError::Http(e)
            })?;

        let status = response.status();
        debug!("Response {} for '{}'", status, concept);

        if !status.is_success() {
            return Err(CoverageError::Status { status, url });
        }

        let body = response.text().await?;
        parse_total_results(concept, &body)
    }
}

/// Extract `search.totalResults` from a response body.
pub fn parse_total_results(concept: &str, body: &str) -> Result<u64> {
    let json: Value =
        serde_json::from_str(body).map_err(|source| CoverageError::MalformedResponse {
            concept: concept.to_string(),
            source,
        })?;

    json.get("search")
        .and_then(|search| search.get("totalResults"))
        .and_then(Value::as_u64)
        .ok_or_else(|| CoverageError::MissingTotal {
            concept: concept.to_string(),
        })
}
