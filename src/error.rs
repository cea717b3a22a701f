//! Error types for the coverage pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading concepts, building queries or fetching counts.
///
/// Every variant is fatal for the run: the pipeline never substitutes a
/// default count or skips a concept.
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to read concept file {path}: {source}")]
    ConceptFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse concept file {path}: {source}")]
    ConceptFileParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("concept '{label}' has unclassifiable link suffix '{suffix}' (expected a leading 'p', 'i' or 'o')")]
    UnclassifiedConcept { label: String, suffix: String },

    #[error("invalid search endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("malformed search response for '{concept}': {source}")]
    MalformedResponse {
        concept: String,
        source: serde_json::Error,
    },

    #[error("search response for '{concept}' has no integer search.totalResults")]
    MissingTotal { concept: String },
}

pub type Result<T> = std::result::Result<T, CoverageError>;
