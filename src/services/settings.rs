//! Settings repository and versioned in-memory cache.
//!
//! ARCHITECTURE
//! ============
//! Settings live in a flat key/value table. Handlers never read the table
//! directly: they go through [`SettingsCache`], which is loaded at startup
//! and refreshed by a background task. The cache carries a version stamp
//! that changes on every reload; sessions record the stamp they were issued
//! under, so a reload after a configuration change forces re-login.
//!
//! TRADE-OFFS
//! ==========
//! In-place updates (`set`) deliberately do not bump the version — only a
//! reload does. The operator who just changed a setting keeps their own
//! session until the next reload tick.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::state::AppState;

// Well-known setting keys.
pub const KEY_SERVER_PORT: &str = "ServerPort";
pub const KEY_SERVER_MODE: &str = "ServerMode";
pub const KEY_SECURITY_ENTRANCE: &str = "SecurityEntrance";
pub const KEY_INITIALIZED: &str = "Initialized";
pub const KEY_LANGUAGE: &str = "Language";
pub const KEY_TIMEZONE: &str = "Timezone";
pub const KEY_PANEL_USER: &str = "PanelUser";
pub const KEY_PANEL_PASSWORD: &str = "PanelPassword";
pub const KEY_SESSION_TIMEOUT: &str = "SessionTimeout";

const DEFAULT_SESSION_TIMEOUT_SECS: i64 = 86_400;

// =============================================================================
// REPOSITORY
// =============================================================================

/// One settings row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub about: String,
}

/// List all settings.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Setting>, sqlx::Error> {
    sqlx::query_as("SELECT key, value, about FROM settings ORDER BY key")
        .fetch_all(pool)
        .await
}

/// Fetch one setting by key.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<Setting>, sqlx::Error> {
    sqlx::query_as("SELECT key, value, about FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Insert or update a setting, preserving `about` on update.
pub async fn upsert(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT (key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a setting only if the key does not exist yet.
pub async fn insert_if_absent(pool: &SqlitePool, key: &str, value: &str, about: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO settings (key, value, about) VALUES (?, ?, ?)")
        .bind(key)
        .bind(value)
        .bind(about)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a setting by key.
pub async fn delete(pool: &SqlitePool, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Seed first-run defaults. Existing keys are left untouched, so this is
/// safe to run on every startup. The security entrance defaults to a
/// random 8-char path rather than `/` so a fresh install is gated until
/// the operator decides otherwise.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let entrance = generate_entrance();
    let defaults: &[(&str, &str, &str)] = &[
        (KEY_SERVER_PORT, "8080", "HTTP listen port"),
        (KEY_SERVER_MODE, "debug", "Server run mode"),
        (KEY_SECURITY_ENTRANCE, entrance.as_str(), "Secret entrance path"),
        (KEY_INITIALIZED, "true", "Whether first-run setup completed"),
        (KEY_LANGUAGE, "zh-CN", "UI language"),
        (KEY_TIMEZONE, "Asia/Shanghai", "Panel timezone"),
        (KEY_PANEL_USER, "admin", "Panel login user"),
        (KEY_PANEL_PASSWORD, "admin123", "Panel login password"),
        (KEY_SESSION_TIMEOUT, "86400", "Session lifetime in seconds"),
    ];
    for (key, value, about) in defaults {
        insert_if_absent(pool, key, value, about).await?;
    }
    Ok(())
}

/// Random 8-char lowercase alphanumeric entrance path.
#[must_use]
pub fn generate_entrance() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..8)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect();
    format!("/{suffix}")
}

// =============================================================================
// CACHE
// =============================================================================

struct CacheInner {
    values: HashMap<String, String>,
    version: String,
}

/// Read-mostly in-memory view of the settings table. Clone is cheap; all
/// clones share the same inner map. The lock is `std::sync` because no
/// await happens while it is held.
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<RwLock<CacheInner>>,
}

fn version_stamp() -> String {
    // Nanosecond resolution so back-to-back reloads still get distinct
    // stamps.
    time::OffsetDateTime::now_utc().unix_timestamp_nanos().to_string()
}

impl SettingsCache {
    /// Empty cache with a fresh version stamp. Typed accessors fall back
    /// to their defaults.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CacheInner { values: HashMap::new(), version: version_stamp() })),
        }
    }

    /// Load the cache from the settings table.
    pub async fn load(pool: &SqlitePool) -> Result<Self, sqlx::Error> {
        let cache = Self::empty();
        cache.reload(pool).await?;
        Ok(cache)
    }

    /// Re-read every setting and bump the version stamp.
    pub async fn reload(&self, pool: &SqlitePool) -> Result<(), sqlx::Error> {
        let rows = list(pool).await?;
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.values = rows.into_iter().map(|s| (s.key, s.value)).collect();
        inner.version = version_stamp();
        tracing::debug!(settings = inner.values.len(), version = %inner.version, "settings cache reloaded");
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.values.get(key).cloned()
    }

    /// Update one cached value in place. Does not bump the version.
    pub fn set(&self, key: &str, value: &str) {
        let mut inner = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.values.insert(key.to_owned(), value.to_owned());
    }

    #[must_use]
    pub fn all(&self) -> HashMap<String, String> {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.values.clone()
    }

    #[must_use]
    pub fn version(&self) -> String {
        let inner = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.version.clone()
    }

    // Typed accessors with the documented defaults.

    #[must_use]
    pub fn panel_user(&self) -> String {
        self.get(KEY_PANEL_USER).unwrap_or_else(|| "admin".to_owned())
    }

    #[must_use]
    pub fn panel_password(&self) -> String {
        self.get(KEY_PANEL_PASSWORD).unwrap_or_else(|| "admin123".to_owned())
    }

    #[must_use]
    pub fn security_entrance(&self) -> String {
        self.get(KEY_SECURITY_ENTRANCE).unwrap_or_else(|| "/".to_owned())
    }

    #[must_use]
    pub fn session_timeout_secs(&self) -> i64 {
        self.get(KEY_SESSION_TIMEOUT)
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SESSION_TIMEOUT_SECS)
    }

    #[must_use]
    pub fn initialized(&self) -> bool {
        self.get(KEY_INITIALIZED).as_deref() == Some("true")
    }

    #[must_use]
    pub fn language(&self) -> String {
        self.get(KEY_LANGUAGE).unwrap_or_else(|| "zh-CN".to_owned())
    }

    #[must_use]
    pub fn timezone(&self) -> String {
        self.get(KEY_TIMEZONE).unwrap_or_else(|| "Asia/Shanghai".to_owned())
    }
}

// =============================================================================
// RELOAD TASK
// =============================================================================

/// Periodically reload the settings cache so out-of-band edits (CLI, direct
/// DB changes) become visible and stale sessions get invalidated. An
/// `interval` of zero disables the task.
pub fn spawn_reload_task(state: AppState, interval: Duration) -> Option<tokio::task::JoinHandle<()>> {
    if interval.is_zero() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            ticker.tick().await;
            if let Err(e) = state.settings.reload(&state.pool).await {
                tracing::warn!(error = %e, "settings cache reload failed");
            }
        }
    }))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
