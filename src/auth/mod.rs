//! Cookie-based session authentication.
//!
//! A single signed session token lives in the `token` cookie. Protected API
//! routes verify it with [`protect_api`]; navigation is filtered earlier by
//! the cheaper presence check in [`crate::gate`].

mod authenticator;
mod cookie;
mod errors;
mod guard;
mod state;
mod types;

pub use authenticator::authenticate;
pub use cookie::{
    TOKEN_COOKIE_NAME, clearing_cookie, get_cookie, session_cookie, session_token,
};
pub use errors::{ApiAuthError, RejectReason};
pub use guard::{CurrentUser, protect_api};
pub use state::HasAuthBackend;
pub use types::Identity;
