use axum::{http::StatusCode, Extension, Json};
use rust_decimal::Decimal;

use crate::database::models::medicine::{Medicine, NewMedicine};
use crate::database::models::user::Role;
use crate::database::service;
use crate::error::{ApiError, ApiJson};
use crate::middleware::AuthUser;

/// GET /supplier/medicines - the caller's own inventory.
pub async fn supplier_medicines_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Medicine>>, ApiError> {
    auth.require_role(Role::Supplier)?;

    let medicines = service::list_supplier_medicines(auth.user_id).await?;
    Ok(Json(medicines))
}

/// POST /supplier/medicines - create a medicine. The supplier reference is
/// stamped from the session, never read from the body.
pub async fn supplier_medicines_post(
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewMedicine>,
) -> Result<(StatusCode, Json<Medicine>), ApiError> {
    auth.require_role(Role::Supplier)?;

    if body.name.trim().is_empty() {
        return Err(ApiError::validation("Name cannot be empty", Some("name".to_string())));
    }
    if body.price < Decimal::ZERO {
        return Err(ApiError::validation(
            "Price cannot be negative",
            Some("price".to_string()),
        ));
    }
    if body.stock < 0 {
        return Err(ApiError::validation(
            "Stock cannot be negative",
            Some("stock".to_string()),
        ));
    }

    let medicine = service::insert_medicine(auth.user_id, &body).await?;

    tracing::info!(medicine_id = %medicine.id, supplier_id = %auth.user_id, "medicine created");

    Ok((StatusCode::CREATED, Json(medicine)))
}
