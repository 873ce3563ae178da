//! Route guard for protected API handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::authenticator::authenticate;
use super::errors::{ApiAuthError, RejectReason};
use super::state::HasAuthBackend;
use super::types::Identity;

/// Middleware that authenticates the request once before the handler runs.
///
/// Install with `route_layer(middleware::from_fn_with_state(state, protect_api::<S>))`.
/// On success the [`Identity`] is stored in the request extensions, where
/// [`CurrentUser`] picks it up. On failure the handler never runs.
pub async fn protect_api<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    match authenticate(request.headers(), &state).await {
        Ok(identity) => {
            tracing::debug!(user_id = identity.id, "Authenticated request");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(reason) => {
            tracing::debug!(%reason, path = %request.uri().path(), "Rejected request");
            ApiAuthError::new(reason, state.secure_cookies()).into_response()
        }
    }
}

/// Extractor for the identity established by [`protect_api`].
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                tracing::error!(
                    path = %parts.uri.path(),
                    "CurrentUser used on a route without protect_api"
                );
                ApiAuthError::new(RejectReason::Internal, false)
            })
    }
}
