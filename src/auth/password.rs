use crate::config;

/// Hash a password for storage using bcrypt with the configured cost.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, config::config().security.bcrypt_cost)
}

/// Verify a password against a stored bcrypt hash. A hash that fails to
/// parse counts as a mismatch rather than an error, so a corrupt stored
/// hash behaves like any other bad credential.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}
