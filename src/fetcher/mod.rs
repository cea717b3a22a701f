//! Search API access.
//!
//! This module provides the HTTP client that turns query fragments into
//! coverage counts.

pub mod client;

pub use client::{CoverageClient, FetchConfig};
