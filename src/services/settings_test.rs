use super::*;
use crate::state::test_helpers::{seeded_state, test_state};

// =============================================================================
// repository
// =============================================================================

#[tokio::test]
async fn upsert_then_get_round_trips() {
    let (_dir, state) = test_state().await;
    upsert(&state.pool, "Language", "en-US").await.unwrap();
    let setting = get(&state.pool, "Language").await.unwrap().unwrap();
    assert_eq!(setting.value, "en-US");
}

#[tokio::test]
async fn upsert_overwrites_existing_value() {
    let (_dir, state) = test_state().await;
    upsert(&state.pool, "ServerMode", "debug").await.unwrap();
    upsert(&state.pool, "ServerMode", "release").await.unwrap();
    let setting = get(&state.pool, "ServerMode").await.unwrap().unwrap();
    assert_eq!(setting.value, "release");
}

#[tokio::test]
async fn insert_if_absent_does_not_clobber() {
    let (_dir, state) = test_state().await;
    insert_if_absent(&state.pool, "PanelUser", "admin", "login user").await.unwrap();
    insert_if_absent(&state.pool, "PanelUser", "other", "login user").await.unwrap();
    let setting = get(&state.pool, "PanelUser").await.unwrap().unwrap();
    assert_eq!(setting.value, "admin");
    assert_eq!(setting.about, "login user");
}

#[tokio::test]
async fn delete_removes_setting() {
    let (_dir, state) = test_state().await;
    upsert(&state.pool, "Doomed", "x").await.unwrap();
    delete(&state.pool, "Doomed").await.unwrap();
    assert!(get(&state.pool, "Doomed").await.unwrap().is_none());
}

#[tokio::test]
async fn list_is_sorted_by_key() {
    let (_dir, state) = test_state().await;
    upsert(&state.pool, "Zeta", "1").await.unwrap();
    upsert(&state.pool, "Alpha", "2").await.unwrap();
    let keys: Vec<String> = list(&state.pool).await.unwrap().into_iter().map(|s| s.key).collect();
    assert_eq!(keys, vec!["Alpha".to_owned(), "Zeta".to_owned()]);
}

// =============================================================================
// seeding
// =============================================================================

#[tokio::test]
async fn seed_defaults_populates_well_known_keys() {
    let (_dir, state) = seeded_state().await;
    for key in [
        KEY_SERVER_PORT,
        KEY_SERVER_MODE,
        KEY_SECURITY_ENTRANCE,
        KEY_INITIALIZED,
        KEY_LANGUAGE,
        KEY_TIMEZONE,
        KEY_PANEL_USER,
        KEY_PANEL_PASSWORD,
        KEY_SESSION_TIMEOUT,
    ] {
        assert!(state.settings.get(key).is_some(), "missing seeded key {key}");
    }
}

#[tokio::test]
async fn seed_defaults_preserves_existing_values() {
    let (_dir, state) = test_state().await;
    upsert(&state.pool, KEY_PANEL_USER, "operator").await.unwrap();
    seed_defaults(&state.pool).await.unwrap();
    let setting = get(&state.pool, KEY_PANEL_USER).await.unwrap().unwrap();
    assert_eq!(setting.value, "operator");
}

#[tokio::test]
async fn seeded_entrance_is_gated_by_default() {
    let (_dir, state) = seeded_state().await;
    let entrance = state.settings.security_entrance();
    assert_ne!(entrance, "/");
}

#[test]
fn generate_entrance_shape() {
    let entrance = generate_entrance();
    assert_eq!(entrance.len(), 9);
    assert!(entrance.starts_with('/'));
    assert!(
        entrance[1..].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()),
        "unexpected entrance {entrance}"
    );
}

#[test]
fn generate_entrance_varies() {
    // 36^8 possibilities; a collision here means the RNG is broken.
    assert_ne!(generate_entrance(), generate_entrance());
}

// =============================================================================
// cache
// =============================================================================

#[test]
fn empty_cache_uses_documented_defaults() {
    let cache = SettingsCache::empty();
    assert_eq!(cache.panel_user(), "admin");
    assert_eq!(cache.panel_password(), "admin123");
    assert_eq!(cache.security_entrance(), "/");
    assert_eq!(cache.session_timeout_secs(), 86_400);
    assert_eq!(cache.language(), "zh-CN");
    assert_eq!(cache.timezone(), "Asia/Shanghai");
    assert!(!cache.initialized());
}

#[test]
fn session_timeout_rejects_garbage_and_nonpositive() {
    let cache = SettingsCache::empty();
    cache.set(KEY_SESSION_TIMEOUT, "not-a-number");
    assert_eq!(cache.session_timeout_secs(), 86_400);
    cache.set(KEY_SESSION_TIMEOUT, "0");
    assert_eq!(cache.session_timeout_secs(), 86_400);
    cache.set(KEY_SESSION_TIMEOUT, "7200");
    assert_eq!(cache.session_timeout_secs(), 7200);
}

#[test]
fn set_updates_value_without_bumping_version() {
    let cache = SettingsCache::empty();
    let before = cache.version();
    cache.set(KEY_LANGUAGE, "en-US");
    assert_eq!(cache.get(KEY_LANGUAGE).as_deref(), Some("en-US"));
    assert_eq!(cache.version(), before);
}

#[tokio::test]
async fn reload_bumps_version_and_picks_up_db_changes() {
    let (_dir, state) = seeded_state().await;
    let before = state.settings.version();

    upsert(&state.pool, KEY_LANGUAGE, "en-US").await.unwrap();
    state.settings.reload(&state.pool).await.unwrap();

    assert_eq!(state.settings.language(), "en-US");
    assert_ne!(state.settings.version(), before);
}

#[tokio::test]
async fn clones_share_storage() {
    let (_dir, state) = seeded_state().await;
    let clone = state.settings.clone();
    state.settings.set(KEY_LANGUAGE, "fr-FR");
    assert_eq!(clone.language(), "fr-FR");
    assert_eq!(clone.version(), state.settings.version());
}
