//! Session cookie parsing and formatting.

use axum::http::{HeaderMap, header};

/// Cookie name for the session token.
pub const TOKEN_COOKIE_NAME: &str = "token";

const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// The session token from the request, if a non-empty one was sent.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    get_cookie(headers, TOKEN_COOKIE_NAME).filter(|token| !token.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(token: &str, max_age: u64, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax{}; Max-Age={}",
        TOKEN_COOKIE_NAME,
        token,
        secure_attr(secure),
        max_age
    )
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clearing_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; Path=/; Expires={}; SameSite=Lax{}",
        TOKEN_COOKIE_NAME,
        EXPIRED_DATE,
        secure_attr(secure)
    )
}

fn secure_attr(secure: bool) -> &'static str {
    if secure { "; Secure" } else { "" }
}
