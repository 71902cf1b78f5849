use axum::{http::StatusCode, Json};
use serde::Deserialize;

use super::utils;
use crate::auth::password;
use crate::database::models::user::{Role, UserInfo};
use crate::database::service;
use crate::error::{ApiError, ApiJson};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

/// POST /auth/register - create a user account. The role is fixed at
/// creation; duplicate emails yield 409.
pub async fn register_post(
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    utils::validate_email_format(&body.email)
        .map_err(|msg| ApiError::validation(msg, Some("email".to_string())))?;
    utils::validate_password(&body.password)
        .map_err(|msg| ApiError::validation(msg, Some("password".to_string())))?;
    if body.name.trim().is_empty() {
        return Err(ApiError::validation(
            "Name cannot be empty",
            Some("name".to_string()),
        ));
    }

    let password_hash = password::hash_password(&body.password)?;
    let user = service::insert_user(&body.email, &password_hash, body.name.trim(), body.role).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}
