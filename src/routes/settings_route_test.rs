use std::collections::HashMap;

use axum::extract::State;

use super::*;
use crate::services::settings::{KEY_INITIALIZED, KEY_LANGUAGE, get};
use crate::state::test_helpers::seeded_state;

fn auth() -> AuthUser {
    AuthUser { token: "test-token".to_owned() }
}

#[tokio::test]
async fn get_config_returns_the_cached_map() {
    let (_dir, state) = seeded_state().await;
    let body = get_config(State(state), auth()).await.0;
    let settings = body["settings"].as_object().expect("settings object");
    assert_eq!(settings["PanelUser"], "admin");
    assert_eq!(settings["ServerPort"], "8080");
}

#[tokio::test]
async fn update_config_writes_db_and_cache() {
    let (_dir, state) = seeded_state().await;
    let updates: HashMap<String, String> =
        [(KEY_LANGUAGE.to_owned(), "en-US".to_owned()), ("Custom".to_owned(), "42".to_owned())].into();

    let body = update_config(State(state.clone()), auth(), Json(updates)).await.unwrap().0;
    assert_eq!(body["message"], "System settings updated successfully");

    // Cache sees the change immediately.
    assert_eq!(state.settings.language(), "en-US");
    assert_eq!(state.settings.get("Custom").as_deref(), Some("42"));

    // And it is durable.
    let row = get(&state.pool, KEY_LANGUAGE).await.unwrap().unwrap();
    assert_eq!(row.value, "en-US");
}

#[tokio::test]
async fn update_config_does_not_bump_cache_version() {
    let (_dir, state) = seeded_state().await;
    let before = state.settings.version();
    let updates: HashMap<String, String> = [(KEY_LANGUAGE.to_owned(), "en-GB".to_owned())].into();
    update_config(State(state.clone()), auth(), Json(updates)).await.unwrap();
    assert_eq!(state.settings.version(), before);
}

#[tokio::test]
async fn initialized_reflects_the_seeded_flag() {
    let (_dir, state) = seeded_state().await;
    let body = initialized(State(state.clone()), auth()).await.0;
    assert_eq!(body["initialized"], true);

    state.settings.set(KEY_INITIALIZED, "false");
    let body = initialized(State(state), auth()).await.0;
    assert_eq!(body["initialized"], false);
}
