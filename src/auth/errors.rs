//! Authentication rejection types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::clearing_cookie;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    Expired,
    InvalidSignature,
    UserNotFound,
    Internal,
}

impl RejectReason {
    /// Whether the session cookie is useless and should be expired on the client.
    pub fn clears_cookie(self) -> bool {
        matches!(
            self,
            Self::Expired | Self::InvalidSignature | Self::UserNotFound
        )
    }

    pub fn status_code(self) -> StatusCode {
        match self {
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to the client.
    pub fn message(self) -> &'static str {
        match self {
            Self::MissingToken => "Not authenticated",
            Self::Expired => "Session expired",
            Self::InvalidSignature => "Invalid session token",
            Self::UserNotFound => "User not found",
            Self::Internal => "Internal server error",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::MissingToken => "missing-token",
            Self::Expired => "expired",
            Self::InvalidSignature => "invalid-signature",
            Self::UserNotFound => "user-not-found",
            Self::Internal => "internal-error",
        };
        f.write_str(code)
    }
}

/// API authentication error (JSON body, clears the cookie when the reason calls for it).
#[derive(Debug)]
pub struct ApiAuthError {
    pub reason: RejectReason,
    secure_cookies: bool,
}

impl ApiAuthError {
    pub fn new(reason: RejectReason, secure_cookies: bool) -> Self {
        Self {
            reason,
            secure_cookies,
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let mut response = (
            self.reason.status_code(),
            Json(ErrorResponse {
                error: self.reason.message(),
            }),
        )
            .into_response();

        if self.reason.clears_cookie() {
            if let Ok(value) = HeaderValue::from_str(&clearing_cookie(self.secure_cookies)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        response
    }
}
