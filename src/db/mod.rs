//! Database initialization and migration runner.
//!
//! SYSTEM CONTEXT
//! ==============
//! The panel keeps its settings and sessions in a single SQLite file under
//! the data directory. Startup creates the shared SQLx pool and enforces
//! schema migrations before the listener accepts traffic.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 4;

fn db_max_connections() -> u32 {
    std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
}

/// Initialize the SQLite pool at `<data_dir>/gatepost.db` and run
/// migrations. The data directory is created if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, the connection
/// fails, or migrations fail.
pub async fn init_pool(data_dir: &Path) -> Result<SqlitePool, sqlx::Error> {
    std::fs::create_dir_all(data_dir).map_err(sqlx::Error::Io)?;

    let options = SqliteConnectOptions::new()
        .filename(data_dir.join("gatepost.db"))
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(db_max_connections())
        .connect_with(options)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
