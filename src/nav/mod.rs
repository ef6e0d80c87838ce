//! Navigation policy engine for the panel SPA.
//!
//! SYSTEM CONTEXT
//! ==============
//! The frontend is a single-page app; every route transition and every page
//! request is subject to session policy. This module holds that policy as
//! pure decision functions, with side effects pushed behind ports:
//!
//! - [`guard`]: the client-side navigation guard. Given a target route and
//!   ambient session state (token, session cookie), decide whether a
//!   transition is allowed, redirected, or blocked.
//! - [`route_table`]: the static route table the guard resolves targets
//!   against, including which routes require authentication.
//! - [`entrance`]: the server-side security-entrance gate that issues the
//!   session cookie the guard treats as the liveness authority.
//!
//! DESIGN
//! ======
//! Decisions are infallible: a missing token or cookie is ordinary state,
//! not an error, so everything returns plain action enums rather than
//! `Result`. Handlers and middleware stay thin adapters over these
//! functions so the policy is testable without a browser or a socket.

pub mod entrance;
pub mod guard;
pub mod route_table;

pub use guard::{GuardAction, Notifier, SessionState};
pub use route_table::{ResolvedTarget, Route, route_table};

/// Cookie the entrance gate issues and the guard checks for liveness.
pub const SESSION_COOKIE_NAME: &str = "sessionkey";

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

/// Path the guard bounces already-authenticated users to.
pub const DASHBOARD_PATH: &str = "/dashboard";
