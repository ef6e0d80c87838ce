use std::time::Duration;

use gatepost::{config, db, routes, services, state};
use tracing_subscriber::EnvFilter;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::Config::load(None).expect("config load failed");

    let pool = db::init_pool(&config.data_dir)
        .await
        .expect("database init failed");
    services::settings::seed_defaults(&pool)
        .await
        .expect("settings seed failed");

    let settings = services::settings::SettingsCache::load(&pool)
        .await
        .expect("settings cache load failed");
    let state = state::AppState::new(pool, settings);

    // Background maintenance: settings reload and session purge.
    let _reload = services::settings::spawn_reload_task(state.clone(), config.reload_interval());
    let _purge = services::session::spawn_purge_task(state.clone(), SESSION_PURGE_INTERVAL);

    let entrance = state.settings.security_entrance();
    let app = routes::app(state, &config.dist_dir);
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, %entrance, "gatepost listening");
    axum::serve(listener, app).await.expect("server failed");
}
