//! Rate limiting for login and signup.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down credential
//! stuffing and signup spam.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use serde_json::json;
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc};

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Requests per minute per IP allowed on login and signup by default.
pub const DEFAULT_AUTH_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Key used when the client address cannot be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiting configuration for authentication endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter shared by login and signup
    pub auth: Arc<IpLimiter>,
    /// Take the client IP from `X-Forwarded-For` (only behind a trusted proxy)
    pub trust_proxy: bool,
}

impl RateLimitConfig {
    pub fn new(per_minute: NonZeroU32, trust_proxy: bool) -> Self {
        Self {
            auth: Arc::new(RateLimiter::keyed(Quota::per_minute(per_minute))),
            trust_proxy,
        }
    }
}

/// Client IP from `X-Forwarded-For` (if trusted) or the connection address.
pub fn client_ip(request: &Request, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return Some(ip.to_string());
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
}

/// Middleware for rate limiting login and signup.
pub async fn rate_limit_auth(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request, config.trust_proxy).unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match config.auth.check_key(&ip) {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(json!({ "error": "Too many attempts. Please wait before trying again." })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_client_ip_from_connect_info() {
        let mut request = Request::new(Body::empty());
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));

        assert_eq!(client_ip(&request, false), Some("10.0.0.1".to_string()));
    }

    #[test]
    fn test_forwarded_for_ignored_unless_trusted() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.2")
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));

        assert_eq!(client_ip(&request, false), Some("10.0.0.1".to_string()));
        assert_eq!(client_ip(&request, true), Some("203.0.113.9".to_string()));
    }

    #[test]
    fn test_no_client_ip() {
        let request = Request::new(Body::empty());
        assert_eq!(client_ip(&request, true), None);
    }

    #[test]
    fn test_limiter_blocks_after_quota() {
        let config = RateLimitConfig::new(NonZeroU32::new(2).unwrap(), false);
        let ip = "10.0.0.1".to_string();

        assert!(config.auth.check_key(&ip).is_ok());
        assert!(config.auth.check_key(&ip).is_ok());
        assert!(config.auth.check_key(&ip).is_err());
        assert!(config.auth.check_key(&"10.0.0.2".to_string()).is_ok());
    }
}
