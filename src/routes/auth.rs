//! Auth routes — login, logout, and the bearer-token extractor.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::http::header::{AUTHORIZATION, HeaderMap};
use axum::response::Json;
use serde::Deserialize;

use crate::services::session::{self, SessionCheck, sha256_hex};
use crate::state::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_body(status: StatusCode, message: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": message })))
}

/// Pull the bearer token out of the `Authorization` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Err("Authorization header required");
    };
    let raw = raw.to_str().map_err(|_| "Invalid authorization format")?;
    match raw.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token),
        _ => Err("Invalid authorization format"),
    }
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated panel operator, proven by a live session token. Use as a
/// handler parameter to require authentication.
pub struct AuthUser {
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).map_err(|msg| error_body(StatusCode::UNAUTHORIZED, msg))?;

        let app_state = AppState::from_ref(state);
        let check = session::validate_session(&app_state.pool, token, &app_state.settings.version())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session lookup failed");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, "Session lookup failed")
            })?;

        match check {
            SessionCheck::Valid => Ok(Self { token: token.to_owned() }),
            SessionCheck::Stale => Err(error_body(
                StatusCode::UNAUTHORIZED,
                "Configuration has been changed, please login again",
            )),
            SessionCheck::Unknown => {
                Err(error_body(StatusCode::UNAUTHORIZED, "Token expired or invalid, please login again"))
            }
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/v1/auth/login` — verify credentials against the settings
/// cache and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_ok = req.username == state.settings.panel_user();
    let password_ok = sha256_hex(&req.password) == sha256_hex(&state.settings.panel_password());
    if !user_ok || !password_ok {
        tracing::warn!(username = %req.username, "login rejected");
        return Err(error_body(StatusCode::UNAUTHORIZED, "Invalid username or password"));
    }

    let token = session::create_session(&state.pool, &state.settings.version(), state.settings.session_timeout_secs())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "session creation failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
        })?;

    tracing::info!(username = %req.username, "login succeeded");
    Ok(Json(serde_json::json!({ "token": token })))
}

/// `POST /api/v1/auth/logout` — delete the presented session.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> StatusCode {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(error = %e, "logout session delete failed");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
