mod dashboard;
mod error;
mod session;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::TokenCodec;
use crate::rate_limit::RateLimitConfig;

pub use error::{ApiError, ResultExt};

/// Create the API router.
pub fn create_api_router(
    db: Database,
    tokens: Arc<TokenCodec>,
    secure_cookies: bool,
    rate_limit: Arc<RateLimitConfig>,
) -> Router {
    let session_state = session::SessionState {
        db: db.clone(),
        tokens: tokens.clone(),
        secure_cookies,
        rate_limit,
    };

    let dashboard_state = dashboard::DashboardState {
        db,
        tokens,
        secure_cookies,
    };

    Router::new()
        .nest("/auth", session::router(session_state))
        .merge(dashboard::router(dashboard_state))
}
