//! Settings and server-management routes. All require an authenticated
//! session.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::routes::auth::AuthUser;
use crate::services::settings;
use crate::state::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn internal_error(message: &str) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": message })))
}

/// `GET /api/v1/config` — the full settings map from the cache.
pub async fn get_config(State(state): State<AppState>, _auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "settings": state.settings.all() }))
}

/// `POST /api/v1/config` — upsert a batch of settings and refresh the
/// cached values. The cache version is left alone; the periodic reload
/// decides when existing sessions go stale.
pub async fn update_config(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(updates): Json<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    for (key, value) in &updates {
        settings::upsert(&state.pool, key, value).await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "setting update failed");
            internal_error(&format!("Failed to update setting: {key}"))
        })?;
        state.settings.set(key, value);
    }
    tracing::info!(updated = updates.len(), "settings updated");
    Ok(Json(serde_json::json!({ "message": "System settings updated successfully" })))
}

/// `GET /api/v1/config/initialized` — whether first-run setup completed.
pub async fn initialized(State(state): State<AppState>, _auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "initialized": state.settings.initialized() }))
}

// =============================================================================
// RESTART
// =============================================================================

/// `POST /api/v1/server/restart` — acknowledge, then replace the process
/// image after a short grace period so the response gets out first.
pub async fn restart(_auth: AuthUser) -> Json<serde_json::Value> {
    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        tracing::info!("restarting");
        reexec();
    });
    Json(serde_json::json!({ "message": "Server will restart in 2 seconds" }))
}

/// Replace the current process with a fresh copy of itself, preserving
/// arguments and environment.
fn reexec() {
    let Ok(exe) = std::env::current_exe() else {
        tracing::error!("current_exe unavailable, cannot restart");
        std::process::exit(1);
    };
    let args: Vec<String> = std::env::args().skip(1).collect();
    replace_process(&exe, &args);
}

#[cfg(unix)]
fn replace_process(exe: &std::path::Path, args: &[String]) -> ! {
    use std::os::unix::process::CommandExt;
    // exec only returns on failure.
    let err = std::process::Command::new(exe).args(args).exec();
    tracing::error!(error = %err, "re-exec failed");
    std::process::exit(1);
}

#[cfg(not(unix))]
fn replace_process(exe: &std::path::Path, args: &[String]) -> ! {
    match std::process::Command::new(exe).args(args).spawn() {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            tracing::error!(error = %e, "restart spawn failed");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "settings_route_test.rs"]
mod tests;
