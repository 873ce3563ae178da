#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use finboard::{
    ServerConfig, create_app,
    db::Database,
    jwt::{DEFAULT_TOKEN_VALIDITY, TokenCodec},
};
use std::num::NonZeroU32;
use tower::ServiceExt;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-for-testing-0123456789";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub tokens: TokenCodec,
}

pub async fn setup() -> TestApp {
    TestSetup::new().build().await
}

/// Builder for test setup with various options
pub struct TestSetup<'a> {
    base: Option<&'a str>,
    secure_cookies: bool,
    auth_requests_per_minute: u32,
}

impl<'a> TestSetup<'a> {
    pub fn new() -> Self {
        Self {
            base: None,
            secure_cookies: false,
            auth_requests_per_minute: 1000,
        }
    }

    pub fn with_base(mut self, base: &'a str) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_secure_cookies(mut self) -> Self {
        self.secure_cookies = true;
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.auth_requests_per_minute = per_minute;
        self
    }

    pub async fn build(self) -> TestApp {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");

        let config = ServerConfig {
            base: self.base.map(|s| s.to_string()),
            db: db.clone(),
            jwt_secret: TEST_SECRET.to_vec(),
            token_validity: DEFAULT_TOKEN_VALIDITY,
            secure_cookies: self.secure_cookies,
            auth_requests_per_minute: NonZeroU32::new(self.auth_requests_per_minute)
                .expect("rate limit must be non-zero"),
            trust_proxy: false,
        };

        TestApp {
            app: create_app(&config).expect("Failed to create app"),
            db,
            tokens: TokenCodec::new(TEST_SECRET, DEFAULT_TOKEN_VALIDITY).unwrap(),
        }
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Insert a user directly (password login is not possible for it).
    pub async fn create_user(&self, email: &str) -> i64 {
        self.db
            .users()
            .create(email, "not-a-password-hash")
            .await
            .unwrap()
    }

    pub fn token_for(&self, user_id: i64) -> String {
        self.tokens.issue(user_id).unwrap().token
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn credentials(email: &str, password: &str) -> String {
    serde_json::json!({ "email": email, "password": password }).to_string()
}

/// Extract Set-Cookie headers from response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Check if cookies contain the session token being cleared
pub fn has_cleared_token(cookies: &[String]) -> bool {
    cookies.iter().any(|c| {
        c.starts_with("token=;") && c.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT")
    })
}

/// The token value from a `token=<jwt>; ...` Set-Cookie header, if one was issued
pub fn issued_token(cookies: &[String]) -> Option<String> {
    cookies.iter().find_map(|c| {
        let value = c.strip_prefix("token=")?.split(';').next()?;
        (!value.is_empty()).then(|| value.to_string())
    })
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
