use axum::{Extension, Json};

use crate::database::models::user::Role;
use crate::database::service::{self, AdminStats};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /admin/stats - global aggregates: entity counts, sales grouped by
/// month, medicine counts grouped by category.
pub async fn admin_stats_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AdminStats>, ApiError> {
    auth.require_role(Role::Admin)?;

    let stats = service::admin_stats().await?;
    Ok(Json(stats))
}
