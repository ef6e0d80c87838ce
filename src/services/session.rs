//! Login-session management.
//!
//! ARCHITECTURE
//! ============
//! Sessions are opaque random hex tokens stored server-side with an
//! absolute expiry and the settings-cache version current at issue time.
//! The client keeps the token in origin-scoped persistent storage and
//! presents it as a bearer header; there is nothing to decode client-side.
//! A session whose recorded version no longer matches the live cache is
//! reported stale so the client re-authenticates after configuration
//! changes.

use std::fmt::Write;
use std::time::Duration;

use rand::Rng;
use sqlx::SqlitePool;

use crate::state::AppState;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token. Used both for
/// login sessions and for the entrance `sessionkey` cookie.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Lowercase hex SHA-256 digest. Login compares digests rather than raw
/// strings.
#[must_use]
pub fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(input.as_bytes());
    bytes_to_hex(&digest)
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

// =============================================================================
// SESSION CRUD
// =============================================================================

/// Result of validating a presented token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// Token known, unexpired, and issued under the current configuration.
    Valid,
    /// Token known and unexpired, but configuration changed since issue.
    Stale,
    /// Token unknown or expired.
    Unknown,
}

/// Create a session under the given settings-cache version, returning the
/// token.
pub async fn create_session(pool: &SqlitePool, config_version: &str, ttl_secs: i64) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, config_version, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(config_version)
        .bind(now_unix() + ttl_secs)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a presented token against expiry and the current cache version.
pub async fn validate_session(
    pool: &SqlitePool,
    token: &str,
    current_version: &str,
) -> Result<SessionCheck, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT config_version FROM sessions WHERE token = ? AND expires_at > ?")
            .bind(token)
            .bind(now_unix())
            .fetch_optional(pool)
            .await?;

    Ok(match row {
        Some((version,)) if version == current_version => SessionCheck::Valid,
        Some(_) => SessionCheck::Stale,
        None => SessionCheck::Unknown,
    })
}

/// Delete a session by token.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Remove expired sessions, returning how many were dropped.
pub async fn purge_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now_unix())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// =============================================================================
// PURGE TASK
// =============================================================================

/// Periodically drop expired session rows.
pub fn spawn_purge_task(state: AppState, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match purge_expired(&state.pool).await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "expired sessions purged"),
                Err(e) => tracing::warn!(error = %e, "session purge failed"),
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
