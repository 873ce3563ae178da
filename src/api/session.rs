//! Session API endpoints.
//!
//! - POST `/signup` - Create an account and start a session
//! - POST `/login` - Check credentials and start a session
//! - GET|POST `/logout` - Clear the session cookie
//! - GET `/me` - Current user (protected)

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, header::SET_COOKIE},
    middleware,
    response::{AppendHeaders, IntoResponse, Response},
    routing::{any, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::auth::{CurrentUser, Identity, clearing_cookie, protect_api, session_cookie};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::TokenCodec;
use crate::password::{hash_password, verify_dummy, verify_password};
use crate::rate_limit::{RateLimitConfig, rate_limit_auth};

const MAX_EMAIL_LENGTH: usize = 254;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Clone)]
pub struct SessionState {
    pub db: Database,
    pub tokens: Arc<TokenCodec>,
    pub secure_cookies: bool,
    pub rate_limit: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(SessionState);

pub fn router(state: SessionState) -> Router {
    let credentials_router = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit.clone(),
            rate_limit_auth,
        ));

    let protected_router = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            protect_api::<SessionState>,
        ))
        .with_state(state.clone());

    let logout_router = Router::new()
        .route("/logout", any(logout))
        .with_state(state);

    Router::new()
        .merge(credentials_router)
        .merge(protected_router)
        .merge(logout_router)
}

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct UserResponse {
    user: Identity,
}

fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ApiError::bad_request("Email is too long"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(ApiError::bad_request("Invalid email address"));
    }

    Ok(email)
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password cannot be longer than {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Issue a token for `identity` and build the response carrying its cookie.
fn start_session(
    state: &SessionState,
    status: StatusCode,
    identity: Identity,
) -> Result<Response, ApiError> {
    let issued = state
        .tokens
        .issue(identity.id)
        .internal_err("Failed to issue session token")?;

    let cookie = session_cookie(&issued.token, issued.duration, state.secure_cookies);

    Ok((
        status,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserResponse { user: identity }),
    )
        .into_response())
}

async fn signup(
    State(state): State<SessionState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email)?;
    validate_password(&payload.password)?;

    let existing = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to check email availability")?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email is already registered"));
    }

    // Argon2 runs on the blocking pool.
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .internal_err("Password hashing task failed")?
        .internal_err("Failed to hash password")?;

    let id = match state.db.users().create(&email, &password_hash).await {
        Ok(id) => id,
        // Lost a race with a concurrent signup for the same address.
        Err(e)
            if e.as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation()) =>
        {
            return Err(ApiError::conflict("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    tracing::info!(user_id = id, "User signed up");

    start_session(&state, StatusCode::CREATED, Identity { id, email })
}

async fn login(
    State(state): State<SessionState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let email = payload.email.trim().to_lowercase();

    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to get user")?;

    let Some(user) = user else {
        tokio::task::spawn_blocking(move || verify_dummy(&payload.password))
            .await
            .internal_err("Password verification task failed")?;
        return Err(invalid());
    };

    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&hash, &payload.password))
        .await
        .internal_err("Password verification task failed")?
        .internal_err("Failed to verify password")?;
    if !matches {
        tracing::debug!(user_id = user.id, "Login with wrong password");
        return Err(invalid());
    }

    tracing::info!(user_id = user.id, "User logged in");

    start_session(&state, StatusCode::OK, Identity::from(user))
}

/// Logout - always clears the cookie, whether or not a session existed.
async fn logout(
    State(state): State<SessionState>,
    method: Method,
) -> Result<impl IntoResponse, ApiError> {
    if method != Method::GET && method != Method::POST {
        return Err(ApiError::method_not_allowed("GET, POST"));
    }

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clearing_cookie(state.secure_cookies))]),
        Json(json!({ "success": true })),
    ))
}

async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse { user })
}
