//! Resolves a request's session cookie into an identity.

use axum::http::HeaderMap;

use super::cookie::session_token;
use super::errors::RejectReason;
use super::state::HasAuthBackend;
use super::types::Identity;
use crate::jwt::VerifyError;

/// Authenticate a request from its headers.
///
/// Verifies the session token and looks its user up in the store. Whether the
/// rejection should also expire the client's cookie is decided by
/// [`RejectReason::clears_cookie`].
pub async fn authenticate<S>(headers: &HeaderMap, state: &S) -> Result<Identity, RejectReason>
where
    S: HasAuthBackend + Sync,
{
    let token = session_token(headers).ok_or(RejectReason::MissingToken)?;

    let user_id = state.tokens().verify(token).map_err(|e| match e {
        VerifyError::Expired => RejectReason::Expired,
        VerifyError::Malformed => RejectReason::InvalidSignature,
    })?;

    let user = state
        .db()
        .users()
        .get_by_id(user_id)
        .await
        .map_err(|e| {
            tracing::error!(user_id, error = %e, "Failed to look up session user");
            RejectReason::Internal
        })?
        .ok_or(RejectReason::UserNotFound)?;

    Ok(Identity::from(user))
}
