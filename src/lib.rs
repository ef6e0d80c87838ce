//! gatepost — a small self-hosted control panel with an entrance-gated
//! session model.
//!
//! The crate splits into the pure navigation-policy engine ([`nav`]) the
//! SPA frontend relies on, and the HTTP backend ([`routes`], [`services`])
//! that issues the tokens and cookies that policy inspects.

pub mod config;
pub mod db;
pub mod nav;
pub mod routes;
pub mod services;
pub mod state;
