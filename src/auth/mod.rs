use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::user::{Role, User};

pub mod password;

/// Session claims carried in the signed token: identity id, display name
/// and role. Nothing else leaves the credential check.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        Self {
            sub: user.id,
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    TokenGeneration(String),
    InvalidToken,
    InvalidSecret,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::TokenGeneration(msg) => write!(f, "token generation error: {}", msg),
            AuthError::InvalidToken => write!(f, "invalid or expired token"),
            AuthError::InvalidSecret => write!(f, "invalid JWT secret"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Issue a signed session token for a verified identity.
pub fn issue_token(claims: &Claims) -> Result<String, AuthError> {
    encode_with_secret(claims, &config::config().security.jwt_secret)
}

/// Verify a session token. Expired, malformed and tampered tokens are all
/// collapsed into `InvalidToken`; callers must not distinguish them.
pub fn verify_token(token: &str) -> Result<Claims, AuthError> {
    decode_with_secret(token, &config::config().security.jwt_secret)
}

fn encode_with_secret(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|_| AuthError::InvalidToken)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn claims(exp_offset_secs: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            name: "Dr. Example".to_string(),
            role: Role::Doctor,
            iat: now,
            exp: now + exp_offset_secs,
        }
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let original = claims(3600);
        let token = encode_with_secret(&original, SECRET).unwrap();
        let decoded = decode_with_secret(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.name, original.name);
        assert_eq!(decoded.role, Role::Doctor);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = encode_with_secret(&claims(3600), SECRET).unwrap();
        let mut tampered = token.clone();
        // Flip a character inside the payload segment
        let idx = token.len() / 2;
        let replacement = if &token[idx..idx + 1] == "a" { "b" } else { "a" };
        tampered.replace_range(idx..idx + 1, replacement);

        assert!(matches!(
            decode_with_secret(&tampered, SECRET),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = encode_with_secret(&claims(3600), SECRET).unwrap();
        assert!(matches!(
            decode_with_secret(&token, "another-secret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway
        let token = encode_with_secret(&claims(-3600), SECRET).unwrap();
        assert!(matches!(
            decode_with_secret(&token, SECRET),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(
            encode_with_secret(&claims(3600), ""),
            Err(AuthError::InvalidSecret)
        ));
    }
}
