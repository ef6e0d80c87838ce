use super::*;
use crate::state::test_helpers::test_state;

// =============================================================================
// bytes_to_hex / generate_token / sha256_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn generate_token_is_64_lowercase_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

#[test]
fn sha256_hex_known_vector() {
    assert_eq!(sha256_hex("abc"), "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}

#[test]
fn sha256_hex_empty_input() {
    assert_eq!(sha256_hex(""), "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
}

// =============================================================================
// session lifecycle
// =============================================================================

#[tokio::test]
async fn created_session_validates_under_same_version() {
    let (_dir, state) = test_state().await;
    let token = create_session(&state.pool, "v1", 3600).await.unwrap();
    let check = validate_session(&state.pool, &token, "v1").await.unwrap();
    assert_eq!(check, SessionCheck::Valid);
}

#[tokio::test]
async fn session_under_old_version_is_stale() {
    let (_dir, state) = test_state().await;
    let token = create_session(&state.pool, "v1", 3600).await.unwrap();
    let check = validate_session(&state.pool, &token, "v2").await.unwrap();
    assert_eq!(check, SessionCheck::Stale);
}

#[tokio::test]
async fn unknown_token_is_unknown() {
    let (_dir, state) = test_state().await;
    let check = validate_session(&state.pool, "no-such-token", "v1").await.unwrap();
    assert_eq!(check, SessionCheck::Unknown);
}

#[tokio::test]
async fn expired_session_is_unknown() {
    let (_dir, state) = test_state().await;
    let token = create_session(&state.pool, "v1", -1).await.unwrap();
    let check = validate_session(&state.pool, &token, "v1").await.unwrap();
    assert_eq!(check, SessionCheck::Unknown);
}

#[tokio::test]
async fn deleted_session_no_longer_validates() {
    let (_dir, state) = test_state().await;
    let token = create_session(&state.pool, "v1", 3600).await.unwrap();
    delete_session(&state.pool, &token).await.unwrap();
    let check = validate_session(&state.pool, &token, "v1").await.unwrap();
    assert_eq!(check, SessionCheck::Unknown);
}

#[tokio::test]
async fn purge_drops_only_expired_sessions() {
    let (_dir, state) = test_state().await;
    let live = create_session(&state.pool, "v1", 3600).await.unwrap();
    let _dead = create_session(&state.pool, "v1", -1).await.unwrap();

    let purged = purge_expired(&state.pool).await.unwrap();
    assert_eq!(purged, 1);

    let check = validate_session(&state.pool, &live, "v1").await.unwrap();
    assert_eq!(check, SessionCheck::Valid);
}

#[tokio::test]
async fn purge_on_empty_table_is_zero() {
    let (_dir, state) = test_state().await;
    assert_eq!(purge_expired(&state.pool).await.unwrap(), 0);
}
