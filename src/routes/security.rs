//! Security response headers.
//!
//! Applied to every response. The CSP differs by path: API responses get a
//! tight connect-only policy, pages get the relaxed policy the bundled SPA
//! needs (inline styles, eval'd chunks). HSTS is only sent when the
//! request demonstrably arrived over HTTPS, directly or via a proxy.

use axum::extract::Request;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

const PAGE_CSP: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' 'unsafe-eval'; \
    style-src 'self' 'unsafe-inline'; \
    img-src 'self' data: https:; \
    font-src 'self' data:; \
    connect-src 'self'; \
    object-src 'none'; \
    base-uri 'self'; \
    form-action 'self';";

const API_CSP: &str = "default-src 'self'; connect-src 'self'; frame-ancestors 'none';";

/// Content-Security-Policy for the given request path.
#[must_use]
pub fn build_csp(path: &str) -> &'static str {
    if path.starts_with("/api") { API_CSP } else { PAGE_CSP }
}

fn forwarded_https(headers: &HeaderMap, name: &str) -> bool {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("https"))
}

/// Whether the request arrived over HTTPS. TLS terminates upstream, so
/// only the proxy headers can tell.
#[must_use]
pub fn is_https(headers: &HeaderMap) -> bool {
    forwarded_https(headers, "x-forwarded-proto") || forwarded_https(headers, "x-real-proto")
}

/// Security-headers middleware.
pub async fn headers(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let https = is_https(req.headers());

    let mut resp = next.run(req).await;
    let h = resp.headers_mut();
    h.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    h.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    h.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    h.insert(header::CONTENT_SECURITY_POLICY, HeaderValue::from_static(build_csp(&path)));
    h.insert(header::REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));
    h.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
    h.insert(header::SERVER, HeaderValue::from_static("gatepost"));
    if https {
        h.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains; preload"),
        );
    }
    resp
}

#[cfg(test)]
#[path = "security_test.rs"]
mod tests;
