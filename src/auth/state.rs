//! Authentication state trait and macro.

use crate::db::Database;
use crate::jwt::TokenCodec;

/// Trait for state types that provide what authentication needs.
pub trait HasAuthBackend {
    fn tokens(&self) -> &TokenCodec;
    fn db(&self) -> &Database;
    fn secure_cookies(&self) -> bool;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `tokens: Arc<TokenCodec>`
/// - `db: Database`
/// - `secure_cookies: bool`
///
/// # Example
/// ```ignore
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub tokens: Arc<TokenCodec>,
///     pub secure_cookies: bool,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn tokens(&self) -> &$crate::jwt::TokenCodec {
                &self.tokens
            }
            fn db(&self) -> &$crate::db::Database {
                &self.db
            }
            fn secure_cookies(&self) -> bool {
                self.secure_cookies
            }
        }
    };
}
