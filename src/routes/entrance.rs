//! HTTP adapter for the security-entrance gate.
//!
//! The decision lives in [`crate::nav::entrance`]; this middleware only
//! reads the request, issues the cookie, and renders the outcomes.

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::nav::entrance::{EntranceAction, decide};
use crate::nav::{LOGIN_PATH, SESSION_COOKIE_NAME};
use crate::services::session;
use crate::state::AppState;

/// Lifetime of the `sessionkey` cookie.
const SESSION_KEY_MAX_AGE: Duration = Duration::minutes(30);

/// Served with status 200 so a keyless visitor learns nothing about the
/// SPA; the page deliberately looks like a generic unavailability notice.
const BLOCK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>暂时无法访问</title>
    <style>
        body {
            font-family: -apple-system, 'PingFang SC', 'Microsoft YaHei', sans-serif;
            background: #F5F5F5;
            min-height: 100vh;
            margin: 0;
            display: flex;
            align-items: center;
            justify-content: center;
        }
        .card {
            background: #FFFFFF;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0, 0, 0, 0.05);
            padding: 32px 40px;
            max-width: 500px;
            text-align: center;
        }
        h1 { font-size: 22px; color: #333; margin: 0 0 16px; }
        p { font-size: 15px; color: #666; line-height: 1.6; margin: 0 0 12px; }
        code {
            background: #EFEFEF;
            border-radius: 4px;
            padding: 4px 8px;
            font-size: 14px;
        }
    </style>
</head>
<body>
    <div class="card">
        <h1>暂时无法访问</h1>
        <p>当前环境已经开启了安全入口登录</p>
        <p>请通过配置的安全入口地址访问面板，或在服务器上查看 <code>SecurityEntrance</code> 设置</p>
    </div>
</body>
</html>"#;

/// Entrance middleware: runs before routing for every request.
pub async fn gate(State(state): State<AppState>, jar: CookieJar, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let entrance = state.settings.security_entrance();
    let has_session_cookie = jar.get(SESSION_COOKIE_NAME).is_some();

    match decide(&path, &entrance, has_session_cookie) {
        EntranceAction::Bypass | EntranceAction::Pass => next.run(req).await,
        EntranceAction::IssueKeyAndRedirect => {
            // Fresh key on every entrance hit. Not HttpOnly: the SPA guard
            // reads the cookie's presence from the document cookie string.
            let cookie = Cookie::build((SESSION_COOKIE_NAME, session::generate_token()))
                .path("/")
                .same_site(SameSite::Lax)
                .max_age(SESSION_KEY_MAX_AGE);
            tracing::info!(%path, "entrance hit, session key issued");
            // Plain 302 rather than axum's Redirect (303).
            (StatusCode::FOUND, jar.add(cookie), [(header::LOCATION, LOGIN_PATH)]).into_response()
        }
        EntranceAction::BlockPage => {
            tracing::debug!(%path, "page request without session key blocked");
            Html(BLOCK_PAGE).into_response()
        }
    }
}

#[cfg(test)]
#[path = "entrance_test.rs"]
mod tests;
