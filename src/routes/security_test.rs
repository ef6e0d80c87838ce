use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::get;
use tower::ServiceExt;

use super::*;

fn app() -> Router {
    Router::new()
        .route("/", get(|| async { "page" }))
        .route("/api/v1/health", get(|| async { "ok" }))
        .layer(axum::middleware::from_fn(headers))
}

async fn send(uri: &str, proto: Option<(&str, &str)>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some((name, value)) = proto {
        builder = builder.header(name, value);
    }
    app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

// =============================================================================
// build_csp
// =============================================================================

#[test]
fn api_csp_is_connect_only() {
    let csp = build_csp("/api/v1/config");
    assert!(csp.contains("frame-ancestors 'none'"));
    assert!(!csp.contains("script-src"));
}

#[test]
fn page_csp_allows_inline_assets() {
    let csp = build_csp("/dashboard");
    assert!(csp.contains("script-src 'self' 'unsafe-inline' 'unsafe-eval'"));
    assert!(csp.contains("style-src 'self' 'unsafe-inline'"));
}

// =============================================================================
// is_https
// =============================================================================

#[test]
fn is_https_reads_forwarded_proto() {
    let mut h = HeaderMap::new();
    assert!(!is_https(&h));
    h.insert("x-forwarded-proto", HeaderValue::from_static("https"));
    assert!(is_https(&h));
}

#[test]
fn is_https_reads_real_proto_case_insensitively() {
    let mut h = HeaderMap::new();
    h.insert("x-real-proto", HeaderValue::from_static("HTTPS"));
    assert!(is_https(&h));
}

#[test]
fn is_https_ignores_plain_http() {
    let mut h = HeaderMap::new();
    h.insert("x-forwarded-proto", HeaderValue::from_static("http"));
    assert!(!is_https(&h));
}

// =============================================================================
// middleware
// =============================================================================

#[tokio::test]
async fn every_response_carries_the_baseline_headers() {
    let resp = send("/", None).await;
    let h = resp.headers();
    assert_eq!(h.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(h.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(h.get("x-xss-protection").unwrap(), "1; mode=block");
    assert_eq!(h.get("referrer-policy").unwrap(), "strict-origin-when-cross-origin");
    assert_eq!(h.get("permissions-policy").unwrap(), "geolocation=(), microphone=(), camera=()");
    assert_eq!(h.get("server").unwrap(), "gatepost");
}

#[tokio::test]
async fn csp_differs_between_page_and_api() {
    let page = send("/", None).await;
    let api = send("/api/v1/health", None).await;
    let page_csp = page.headers().get("content-security-policy").unwrap();
    let api_csp = api.headers().get("content-security-policy").unwrap();
    assert_ne!(page_csp, api_csp);
}

#[tokio::test]
async fn hsts_only_on_https() {
    let plain = send("/", None).await;
    assert!(plain.headers().get("strict-transport-security").is_none());

    let proxied = send("/", Some(("x-forwarded-proto", "https"))).await;
    assert_eq!(
        proxied.headers().get("strict-transport-security").unwrap(),
        "max-age=31536000; includeSubDomains; preload"
    );
}
