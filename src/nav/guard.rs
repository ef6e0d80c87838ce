//! Pre-navigation guard for the panel SPA.
//!
//! DESIGN
//! ======
//! The guard runs once per transition, synchronously, before the transition
//! commits. It reads two pieces of ambient state fresh on every call — the
//! persisted login token and the `sessionkey` liveness cookie — and returns
//! exactly one action. Browser storage and the blocking warning dialog are
//! behind the [`SessionState`] and [`Notifier`] ports so the decision table
//! is testable without a browser.
//!
//! TRADE-OFFS
//! ==========
//! A stale token (token present, cookie absent) is only detected when the
//! user navigates to `/login`; guarded pages stay reachable client-side
//! until a real API call fails server-side. Known gap, kept as-is so the
//! client and server agree on observed behavior.

use super::route_table::ResolvedTarget;
use super::{DASHBOARD_PATH, LOGIN_PATH};

/// Warning shown when the token outlived the session cookie. The backend
/// then serves its block page instead of the SPA shell, so the guard leaves
/// the transition pending rather than redirecting.
pub const STALE_SESSION_WARNING: &str = "登录已失效，请重新从安全入口进入登录页面";

// =============================================================================
// PORTS
// =============================================================================

/// Ambient client session state. Backed by origin-scoped persistent storage
/// plus the document cookie string in a real browser; by plain fields in
/// tests.
pub trait SessionState {
    /// The persisted login token, if any. Presence is the sole "logged in"
    /// signal.
    fn token(&self) -> Option<String>;

    /// Remove the persisted token. Called when the guard deems it stale.
    fn clear_token(&mut self);

    /// Whether the `sessionkey` cookie is present. Presence only — the
    /// value is never inspected.
    fn has_session_cookie(&self) -> bool;
}

/// Sink for the one user-visible warning the guard can emit. A blocking
/// modal in the browser; a recording double in tests.
pub trait Notifier {
    fn warn(&mut self, message: &str);
}

// =============================================================================
// DECISION
// =============================================================================

/// Outcome of one guard invocation. `Block` means the navigation
/// continuation is never invoked: the transition is left pending so the
/// server-rendered fallback page shows instead of an SPA view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Allow,
    Redirect(&'static str),
    Block,
}

/// Session health derived fresh per call from (token?, cookie?).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionHealth {
    /// No token. Cookie state is irrelevant.
    Unauthenticated,
    /// Token and session cookie both present.
    Valid,
    /// Token present but the session cookie is gone: the server has expired
    /// the session out from under the client.
    Stale,
}

#[must_use]
pub fn classify(token_present: bool, cookie_present: bool) -> SessionHealth {
    match (token_present, cookie_present) {
        (false, _) => SessionHealth::Unauthenticated,
        (true, true) => SessionHealth::Valid,
        (true, false) => SessionHealth::Stale,
    }
}

/// Strict guard: token plus session cookie, first matching rule wins.
///
/// 1. Guarded target, no token → redirect to `/login`.
/// 2. `/login` with a live session → redirect to `/dashboard`.
/// 3. `/login` with a stale token → warn once, clear the token, block.
/// 4. Otherwise allow unchanged.
pub fn decide<S, N>(target: &ResolvedTarget, from: &str, session: &mut S, notifier: &mut N) -> GuardAction
where
    S: SessionState,
    N: Notifier,
{
    let token = session.token();
    let health = classify(token.is_some(), session.has_session_cookie());
    tracing::trace!(from, to = %target.path, requires_auth = target.requires_auth, ?health, "guard");

    if target.requires_auth && token.is_none() {
        return GuardAction::Redirect(LOGIN_PATH);
    }

    if target.path == LOGIN_PATH && token.is_some() {
        if session.has_session_cookie() {
            return GuardAction::Redirect(DASHBOARD_PATH);
        }
        notifier.warn(STALE_SESSION_WARNING);
        session.clear_token();
        return GuardAction::Block;
    }

    GuardAction::Allow
}

/// Lenient guard: token only, no cookie read and no stale branch. Used
/// when the entrance gate is disabled and the `sessionkey` cookie is never
/// issued.
pub fn decide_lenient<S>(target: &ResolvedTarget, from: &str, session: &S) -> GuardAction
where
    S: SessionState,
{
    let token = session.token();
    tracing::trace!(from, to = %target.path, requires_auth = target.requires_auth, "guard (lenient)");

    if target.requires_auth && token.is_none() {
        return GuardAction::Redirect(LOGIN_PATH);
    }

    if target.path == LOGIN_PATH && token.is_some() {
        return GuardAction::Redirect(DASHBOARD_PATH);
    }

    GuardAction::Allow
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
