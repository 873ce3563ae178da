//! Edge access gate.
//!
//! Runs on every request and redirects navigation on cookie *presence* only.
//! The token is not verified here; protected API routes do that through
//! [`crate::auth::protect_api`], so pages must still call an authenticated API
//! before trusting that a user exists.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::session_token;

/// What the gate does with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    RedirectToDashboard,
    RedirectToLogin,
    PassThrough,
}

/// Login page and protected prefix, both including the base path.
#[derive(Debug, Clone)]
pub struct GatePaths {
    pub login: String,
    pub dashboard: String,
}

impl GatePaths {
    pub fn new(base: &str) -> Self {
        Self {
            login: format!("{}/login", base),
            dashboard: format!("{}/dashboard", base),
        }
    }

    /// Decide what to do with a request for `path`.
    pub fn decide(&self, path: &str, has_session_cookie: bool) -> GateDecision {
        if has_session_cookie && is_under(path, &self.login) {
            GateDecision::RedirectToDashboard
        } else if !has_session_cookie && is_under(path, &self.dashboard) {
            GateDecision::RedirectToLogin
        } else {
            GateDecision::PassThrough
        }
    }
}

/// `path` is `prefix` itself or below it. `/dashboards` is not under `/dashboard`.
fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Middleware applying [`GatePaths::decide`] to every request.
pub async fn access_gate(
    State(paths): State<Arc<GatePaths>>,
    request: Request,
    next: Next,
) -> Response {
    let has_cookie = session_token(request.headers()).is_some();

    match paths.decide(request.uri().path(), has_cookie) {
        GateDecision::RedirectToDashboard => Redirect::temporary(&paths.dashboard).into_response(),
        GateDecision::RedirectToLogin => Redirect::temporary(&paths.login).into_response(),
        GateDecision::PassThrough => next.run(request).await,
    }
}
