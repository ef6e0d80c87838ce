//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the SQLite pool and the settings cache; both are cheaply
//! clonable handles over shared storage, so `AppState` itself is `Clone`
//! as Axum requires.

use sqlx::SqlitePool;

use crate::services::settings::SettingsCache;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub settings: SettingsCache,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool, settings: SettingsCache) -> Self {
        Self { pool, settings }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
