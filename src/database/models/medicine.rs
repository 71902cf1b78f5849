use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full medicine record as stored, returned to the owning supplier.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub manufacturer: String,
    pub category: String,
    pub requires_prescription: bool,
    pub supplier_id: Uuid,
    pub expiry_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Catalogue view for `GET /medicines`: no supplier or manufacturer detail.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MedicineListItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category: String,
    pub requires_prescription: bool,
}

/// Create payload. The supplier is never read from the body; it is
/// stamped from the session identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMedicine {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub manufacturer: String,
    pub category: String,
    #[serde(default)]
    pub requires_prescription: bool,
    pub expiry_date: NaiveDate,
}
