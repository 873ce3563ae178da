//! Session token signing and verification.
//!
//! Tokens are HS256 JWTs carrying the user id and an expiry. Expiry is checked
//! against an explicit clock so that the boundary can be pinned in tests: a
//! token is still valid at the exact second it expires.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Minimum length of the signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Session token validity: 1 day
pub const DEFAULT_TOKEN_VALIDITY: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest accepted token validity: 1 year
pub const MAX_TOKEN_VALIDITY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub uid: i64,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Result of issuing a session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Signs and verifies session tokens with a shared secret.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_secs: u64,
}

impl TokenCodec {
    /// Create a codec from the signing secret and the token validity window.
    pub fn new(secret: &[u8], validity: Duration) -> Result<Self, JwtError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(JwtError::SecretTooShort { len: secret.len() });
        }
        if validity.as_secs() == 0 {
            return Err(JwtError::ZeroValidity);
        }
        if validity > MAX_TOKEN_VALIDITY {
            return Err(JwtError::ValidityTooLong {
                secs: validity.as_secs(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validity_secs: validity.as_secs(),
        })
    }

    /// Token validity window in seconds.
    pub fn validity_secs(&self) -> u64 {
        self.validity_secs
    }

    /// Issue a token for a user, valid from now.
    pub fn issue(&self, user_id: i64) -> Result<IssuedToken, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();
        self.issue_at(user_id, now)
    }

    /// Issue a token for a user as if the current time were `now`.
    pub fn issue_at(&self, user_id: i64, now: u64) -> Result<IssuedToken, JwtError> {
        let exp = now
            .checked_add(self.validity_secs)
            .ok_or(JwtError::TimeError)?;

        let claims = SessionClaims {
            uid: user_id,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            token,
            expires_at: exp,
            duration: self.validity_secs,
        })
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<i64, VerifyError> {
        // A clock before the epoch treats every token as expired.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(u64::MAX);
        self.verify_at(token, now)
    }

    /// Verify a token against the given current time.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<i64, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked below against `now` instead of the library clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let token_data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
                .map_err(|_| VerifyError::Malformed)?;

        if now > token_data.claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(token_data.claims.uid)
    }
}

/// Errors that can occur while building a codec or issuing tokens.
#[derive(Debug)]
pub enum JwtError {
    /// Signing secret is shorter than [`MIN_SECRET_LENGTH`]
    SecretTooShort { len: usize },
    /// Token validity window is zero seconds
    ZeroValidity,
    /// Token validity window is longer than [`MAX_TOKEN_VALIDITY`]
    ValidityTooLong { secs: u64 },
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::SecretTooShort { len } => write!(
                f,
                "JWT secret is {} bytes, at least {} are required",
                len, MIN_SECRET_LENGTH
            ),
            JwtError::ZeroValidity => write!(f, "Token validity must be at least one second"),
            JwtError::ValidityTooLong { secs } => write!(
                f,
                "Token validity of {} seconds exceeds the maximum of {}",
                secs,
                MAX_TOKEN_VALIDITY.as_secs()
            ),
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}

/// Reasons a presented token is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// Token was valid but its expiry has passed
    Expired,
    /// Bad structure, bad signature or unexpected algorithm
    Malformed,
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Expired => write!(f, "Token has expired"),
            VerifyError::Malformed => write!(f, "Token is malformed"),
        }
    }
}

impl std::error::Error for VerifyError {}
