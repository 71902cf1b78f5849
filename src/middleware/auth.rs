use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, Claims};
use crate::database::models::user::Role;
use crate::error::ApiError;

/// Authenticated caller context extracted from the session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl AuthUser {
    /// Role authorization gate: handlers call this before any data access.
    /// The outward failure is indistinguishable from an unauthenticated
    /// request so wrong-role callers learn nothing about the resource.
    pub fn require_role(&self, required: Role) -> Result<(), ApiError> {
        if self.role == required {
            Ok(())
        } else {
            Err(ApiError::unauthorized("Unauthorized"))
        }
    }
}

/// JWT authentication middleware: validates the Bearer token and injects
/// an `AuthUser` extension for the downstream handler.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    // Expired and invalid tokens map to the same generic failure
    let claims = auth::verify_token(&token)
        .map_err(|_| ApiError::unauthorized("Unauthorized"))?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        _ => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
