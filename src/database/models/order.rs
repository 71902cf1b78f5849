use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Closed status set. Creation only ever produces `Pending`; no transition
/// endpoint exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Line item joined with its medicine name for read-time denormalization.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub order_id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl From<OrderItemRow> for OrderItemView {
    fn from(row: OrderItemRow) -> Self {
        Self {
            medicine_id: row.medicine_id,
            medicine_name: row.medicine_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Denormalized order returned to the customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub items: Vec<OrderItemView>,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Create payload. Only medicine references and quantities are accepted;
/// customer, status and total are all server-derived.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub medicine_id: Uuid,
    pub quantity: i32,
}
