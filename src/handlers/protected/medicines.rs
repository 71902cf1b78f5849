use axum::{Extension, Json};

use crate::database::models::medicine::MedicineListItem;
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /medicines - browse the catalogue. Any authenticated role; only
/// medicines with stock > 0 are listed.
pub async fn medicines_get(
    Extension(_auth): Extension<AuthUser>,
) -> Result<Json<Vec<MedicineListItem>>, ApiError> {
    let medicines = service::list_available_medicines().await?;
    Ok(Json(medicines))
}
