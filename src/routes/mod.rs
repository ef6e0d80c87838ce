//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves three surfaces: the JSON API under `/api/v1`,
//! the built SPA as static files with an `index.html` fallback for
//! client-side routes, and the entrance gate that decides whether page
//! requests see the SPA at all. Security headers are applied to every
//! response on the way out.

pub mod auth;
pub mod entrance;
pub mod security;
pub mod settings;
pub mod system;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{any, get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState, dist_dir: &Path) -> Router {
    // Unknown non-API paths fall back to the SPA shell so client-side
    // routing owns them. `fallback` keeps the shell's own 200 status;
    // deep links are not errors.
    let spa = ServeDir::new(dist_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(dist_dir.join("index.html")));

    Router::new()
        .route("/api/v1/health", get(system::health))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/system/info", get(system::info))
        .route("/api/v1/system/current", get(system::current))
        .route("/api/v1/config", get(settings::get_config).post(settings::update_config))
        .route("/api/v1/config/initialized", get(settings::initialized))
        .route("/api/v1/server/restart", post(settings::restart))
        .route("/api/{*rest}", any(api_not_found))
        .fallback_service(spa)
        .layer(axum::middleware::from_fn_with_state(state.clone(), entrance::gate))
        .layer(axum::middleware::from_fn(security::headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn api_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "API not found" })))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
