pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod gate;
pub mod jwt;
pub mod pages;
pub mod password;
pub mod rate_limit;

use api::create_api_router;
use axum::{Router, middleware, response::Redirect, routing::get};
use db::Database;
use gate::{GatePaths, access_gate};
use jwt::{JwtError, TokenCodec};
use pages::{PagesState, dashboard_page, login_page};
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct ServerConfig {
    /// Base path for the application (e.g., "/app" or "/finance")
    pub base: Option<String>,
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing session tokens (at least 32 bytes)
    pub jwt_secret: Vec<u8>,
    /// How long an issued session token stays valid
    pub token_validity: Duration,
    /// Whether to set Secure flag on cookies (true in production)
    pub secure_cookies: bool,
    /// Login and signup requests allowed per minute per client IP
    pub auth_requests_per_minute: NonZeroU32,
    /// Take the client IP from X-Forwarded-For
    pub trust_proxy: bool,
}

/// Create the application router with the given configuration.
///
/// Fails if the JWT secret or token validity is unusable.
pub fn create_app(config: &ServerConfig) -> Result<Router, JwtError> {
    let tokens = Arc::new(TokenCodec::new(&config.jwt_secret, config.token_validity)?);

    let rate_limit = Arc::new(RateLimitConfig::new(
        config.auth_requests_per_minute,
        config.trust_proxy,
    ));

    let base = config.base.as_deref().unwrap_or("");
    let paths = Arc::new(GatePaths::new(base));

    let api_router = create_api_router(
        config.db.clone(),
        tokens,
        config.secure_cookies,
        rate_limit,
    );

    // Page shells; access is filtered by the gate below
    let page_routes = Router::new()
        .route(&paths.login, get(login_page))
        .route(&paths.dashboard, get(dashboard_page))
        .route(&format!("{}/{{*path}}", paths.dashboard), get(dashboard_page))
        .with_state(PagesState::new(base));

    let root_path = if base.is_empty() { "/" } else { base };

    Ok(Router::new()
        .route(root_path, get(Redirect::temporary(&paths.dashboard)))
        .route(&format!("{}/health", base), get(health))
        .nest(&format!("{}/api", base), api_router)
        .merge(page_routes)
        .layer(middleware::from_fn_with_state(paths, access_gate)))
}

async fn health() -> &'static str {
    "ok"
}

/// Serve the app until SIGINT/SIGTERM, then close the database.
pub async fn serve(app: Router, listener: TcpListener, db: Database) -> Result<(), std::io::Error> {
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let result = axum::serve(listener, make_service)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    info!("Database closed");

    result
}

/// Resolves when the process receives SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
