use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{self, password, Claims};
use crate::config;
use crate::database::models::user::{Role, UserInfo};
use crate::database::service;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    pub expires_in: u64,
}

/// POST /auth/login - validate an (email, password, role) triple and issue
/// a session token.
///
/// Every failure mode (unknown email, wrong role, wrong password) returns
/// the identical 401 body so nothing about stored accounts leaks.
pub async fn login_post(ApiJson(body): ApiJson<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || ApiError::unauthorized("Invalid credentials");

    let user = service::find_user_for_login(&body.email, body.role)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&body.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = auth::issue_token(&Claims::for_user(&user))?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
        expires_in,
    }))
}
