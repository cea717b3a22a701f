//! Test helpers: a local stand-in for the pico-search API and concept files on disk.

use axum::extract::RawQuery;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

/// How the mock search API answers.
#[derive(Debug, Clone, Copy)]
pub enum MockSearch {
    /// Same total for every query.
    Total(u64),
    /// 1 for population, 2 for intervention, 3 for outcome queries.
    ByCategory,
    /// Bare status code, empty body.
    Status(u16),
    /// Raw body with a JSON content type.
    Body(&'static str),
}

async fn search(mock: MockSearch, headers: HeaderMap, query: Option<String>) -> Response {
    if headers.get(ACCEPT).and_then(|v| v.to_str().ok()) != Some("application/json") {
        return StatusCode::NOT_ACCEPTABLE.into_response();
    }

    match mock {
        MockSearch::Total(total) => total_body(total),
        MockSearch::ByCategory => {
            let query = query.unwrap_or_default();
            let total = if query.contains("&p=") {
                1
            } else if query.contains("&i=") {
                2
            } else if query.contains("&o=") {
                3
            } else {
                0
            };
            total_body(total)
        }
        MockSearch::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        MockSearch::Body(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
    }
}

fn total_body(total: u64) -> Response {
    Json(json!({ "search": { "totalResults": total, "results": [] } })).into_response()
}

/// Start the mock API on an ephemeral port and return its endpoint URL.
pub async fn spawn_search_api(mock: MockSearch) -> String {
    let app = Router::new().route(
        "/pico-search",
        get(move |headers: HeaderMap, RawQuery(query): RawQuery| search(mock, headers, query)),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/pico-search", addr)
}

/// Write a concept file with the given `(label, linkSuffix)` pairs.
pub fn write_concepts(entries: &[(&str, &str)]) -> NamedTempFile {
    let results: Vec<_> = entries
        .iter()
        .map(|(label, suffix)| json!({ "label": label, "linkSuffix": suffix }))
        .collect();

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json!({ "results": results }).to_string().as_bytes())
        .unwrap();
    file
}

/// A small mixed concept list: two population, one intervention, one outcome.
pub fn sample_concepts() -> NamedTempFile {
    write_concepts(&[
        ("Adults", "p=http://x/adult,http://x/aged"),
        ("Surgery", "i=http://x/surgery"),
        ("Children", "p=http://x/child"),
        ("Mortality", "o=http://x/mortality"),
    ])
}
