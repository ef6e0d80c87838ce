//! Health and system-information routes.

use axum::http::StatusCode;
use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::system;

type ApiError = (StatusCode, Json<serde_json::Value>);

/// `GET /api/v1/health` — public liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "message": "gatepost API is running" }))
}

/// `GET /api/v1/system/info` — host facts plus a live snapshot.
pub async fn info(_auth: AuthUser) -> Result<Json<system::SystemInfo>, ApiError> {
    system::system_info().await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "system info collection failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "Failed to get system info" })))
    })
}

/// `GET /api/v1/system/current` — live cpu/memory/disk/load/network.
pub async fn current(_auth: AuthUser) -> Result<Json<system::CurrentInfo>, ApiError> {
    system::current_info().await.map(Json).map_err(|e| {
        tracing::error!(error = %e, "system snapshot failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "Failed to get current info" })))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn health_reports_ok() {
        let body = health().await.0;
        assert_eq!(body["status"], "ok");
    }
}
