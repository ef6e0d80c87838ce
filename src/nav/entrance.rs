//! Security-entrance decision.
//!
//! The panel can hide itself behind a secret path. Hitting that path issues
//! the `sessionkey` cookie and bounces to `/login`; every other page
//! request without the cookie gets a static block page instead of the SPA
//! shell. API and asset requests are never gated — the API has its own
//! bearer-token auth.
//!
//! The decision is pure; the middleware in `routes` adapts it to HTTP.

/// Outcome of the entrance check for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceAction {
    /// API/asset request, or the gate is disabled: never gated.
    Bypass,
    /// Request hit the entrance path: issue a fresh `sessionkey` cookie
    /// and redirect to `/login`.
    IssueKeyAndRedirect,
    /// Page request without a `sessionkey` cookie: serve the block page.
    BlockPage,
    /// Page request with a `sessionkey` cookie: pass through.
    Pass,
}

/// Normalize a configured entrance to a leading-slash path.
#[must_use]
pub fn normalize_entrance(entrance: &str) -> String {
    if entrance.starts_with('/') {
        entrance.to_owned()
    } else {
        format!("/{entrance}")
    }
}

/// Decide how one request fares against the entrance gate.
///
/// An entrance of `/` disables the gate entirely: every path is reachable
/// and the `sessionkey` cookie is never required.
#[must_use]
pub fn decide(path: &str, entrance: &str, has_session_cookie: bool) -> EntranceAction {
    if path.starts_with("/api") || path.starts_with("/assets") {
        return EntranceAction::Bypass;
    }

    let entrance = normalize_entrance(entrance);
    if entrance == "/" {
        return EntranceAction::Bypass;
    }

    if path == entrance {
        return EntranceAction::IssueKeyAndRedirect;
    }

    if has_session_cookie {
        EntranceAction::Pass
    } else {
        EntranceAction::BlockPage
    }
}

#[cfg(test)]
#[path = "entrance_test.rs"]
mod tests;
