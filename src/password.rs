//! Argon2 password hashing.

use argon2::Config;

const SALT_LENGTH: usize = 16;

/// Encoded hash that no password matches, verified when an email is unknown
/// so that both login failure paths cost one Argon2 verification.
const TIMING_DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$ZmluYm9hcmQtdGltaW5nIQ$xNtpV0gu2pv1EOIfoAW8xrIbIoGPkwDuOf2geAjjxFY";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::Error> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::RngCore::fill_bytes(&mut rand::rng(), &mut salt);
    argon2::hash_encoded(password.as_bytes(), &salt, &Config::default())
}

/// Check a password against an encoded hash.
pub fn verify_password(hash: &str, password: &str) -> Result<bool, argon2::Error> {
    argon2::verify_encoded(hash, password.as_bytes())
}

/// Spend the same work as a real verification and discard the result.
pub fn verify_dummy(password: &str) {
    let _ = verify_password(TIMING_DUMMY_HASH, password);
}
