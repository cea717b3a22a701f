//! Dashboard HTTP server.
//!
//! Every dashboard load reruns the whole pipeline (concept file, fetch loop,
//! partition) and renders the result; nothing is cached between requests.

pub mod gate;

use crate::analysis::{generate_dataset, partition};
use crate::concepts::load_concepts;
use crate::fetcher::CoverageClient;
use crate::models::{CoverageTable, CoverageViews};
use crate::report::dashboard::escape_html;
use crate::report::{render_dashboard, DashboardOptions};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use gate::{expired_cookie, session_cookie, PasswordGate};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared server state.
pub struct AppState {
    pub client: CoverageClient,
    pub concepts_path: PathBuf,
    pub gate: PasswordGate,
}

impl AppState {
    /// Run the pipeline once and return the table.
    async fn fetch_table(&self) -> crate::error::Result<CoverageTable> {
        let concepts = load_concepts(&self.concepts_path)?;
        generate_dataset(&self.client, &concepts, &ProgressBar::hidden()).await
    }

    async fn fetch_views(&self) -> crate::error::Result<CoverageViews> {
        Ok(partition(&self.fetch_table().await?))
    }
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    password: String,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Create the dashboard router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/api/coverage", get(coverage_json))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind: &str, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .await
        .context("Dashboard server failed")
}

async fn dashboard(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !state.gate.is_authorized(&headers) {
        return Html(render_login(None)).into_response();
    }

    match state.fetch_views().await {
        Ok(views) => {
            let options = DashboardOptions {
                show_logout: state.gate.is_enabled(),
            };
            Html(render_dashboard(&views, options)).into_response()
        }
        Err(e) => {
            error!("Dashboard run failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(render_error())).into_response()
        }
    }
}

async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    if !state.gate.verify(&form.password) {
        return (
            StatusCode::UNAUTHORIZED,
            Html(render_login(Some("Password incorrect"))),
        )
            .into_response();
    }

    if !state.gate.is_enabled() {
        return redirect_home(None);
    }

    let token = state.gate.create_session();
    redirect_home(Some(session_cookie(&token)))
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    state.gate.end_session(&headers);
    redirect_home(Some(expired_cookie()))
}

async fn coverage_json(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !state.gate.is_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "login required").into_response();
    }

    match state.fetch_table().await {
        Ok(table) => Json(table).into_response(),
        Err(e) => {
            error!("Coverage run failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn redirect_home(cookie: Option<String>) -> Response {
    match cookie {
        Some(cookie) => (
            StatusCode::SEE_OTHER,
            [(LOCATION, "/".to_string()), (SET_COOKIE, cookie)],
        )
            .into_response(),
        None => (StatusCode::SEE_OTHER, [(LOCATION, "/".to_string())]).into_response(),
    }
}

fn render_login(error: Option<&str>) -> String {
    let message = error
        .map(|e| format!("<p class=\"error\">😕 {}</p>", escape_html(e)))
        .unwrap_or_default();

    LOGIN_HTML.replace("{{error}}", &message)
}

fn render_error() -> String {
    ERROR_HTML.to_string()
}

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>PICO Coverage</title>
<style>
body { font-family: "Source Sans Pro", sans-serif; max-width: 420px; margin: 4rem auto; color: #31333f; }
input { width: 100%; padding: 0.5rem; margin: 0.5rem 0; box-sizing: border-box; }
button { padding: 0.4rem 1rem; }
.error { background: #ffe9e9; color: #7d353b; padding: 0.6rem; border-radius: 4px; }
</style>
</head>
<body>
<h1>PICO Coverage</h1>
<form method="post" action="/login">
<label for="password">Password</label>
<input type="password" id="password" name="password" autofocus>
<button type="submit">Enter</button>
</form>
{{error}}
</body>
</html>
"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>PICO Coverage</title></head>
<body>
<h1>PICO Coverage</h1>
<p>Something went wrong while building the dashboard. Check the server log and reload the page.</p>
</body>
</html>
"#;
