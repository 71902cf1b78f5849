use axum::{http::StatusCode, Extension, Json};

use crate::database::models::order::{NewOrder, OrderView};
use crate::database::models::user::Role;
use crate::database::service;
use crate::error::{ApiError, ApiJson};
use crate::middleware::AuthUser;

/// GET /customer/orders - the caller's orders, newest first, with medicine
/// names resolved.
pub async fn customer_orders_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    auth.require_role(Role::Customer)?;

    let orders = service::list_customer_orders(auth.user_id).await?;
    Ok(Json(orders))
}

/// POST /customer/orders - place an order. Customer reference, `pending`
/// status and the total are all derived server-side.
pub async fn customer_orders_post(
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewOrder>,
) -> Result<(StatusCode, Json<OrderView>), ApiError> {
    auth.require_role(Role::Customer)?;

    if body.items.is_empty() {
        return Err(ApiError::validation(
            "Order must contain at least one item",
            Some("items".to_string()),
        ));
    }
    if body.items.iter().any(|i| i.quantity <= 0) {
        return Err(ApiError::validation(
            "Quantity must be positive",
            Some("items.quantity".to_string()),
        ));
    }

    let order = service::create_order(auth.user_id, &body.items).await?;

    tracing::info!(order_id = %order.id, customer_id = %auth.user_id, "order created");

    Ok((StatusCode::CREATED, Json(order)))
}
