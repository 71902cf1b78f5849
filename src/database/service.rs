use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::medicine::{Medicine, MedicineListItem, NewMedicine};
use crate::database::models::order::{
    NewOrderItem, Order, OrderItemRow, OrderItemView, OrderView,
};
use crate::database::models::prescription::{
    NewPrescription, Prescription, PrescriptionItemRow, PrescriptionItemView,
    PrescriptionListRow, PrescriptionStatus, PrescriptionView,
};
use crate::database::models::user::{PatientSummary, Role, User};

// ---------------------------------------------------------------------------
// Users

/// Credential lookup keyed on the (email, role) pair. A role mismatch is
/// indistinguishable from an unknown email at this layer.
pub async fn find_user_for_login(email: &str, role: Role) -> Result<Option<User>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash, name, role, created_at
         FROM users
         WHERE email = $1 AND role = $2",
    )
    .bind(email)
    .bind(role)
    .fetch_optional(&pool)
    .await?;

    Ok(user)
}

pub async fn insert_user(
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
) -> Result<User, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let result = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash, name, role)
         VALUES ($1, $2, $3, $4)
         RETURNING id, email, password_hash, name, role, created_at",
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role)
    .fetch_one(&pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(DatabaseError::Conflict("Email already registered".to_string()))
        }
        Err(other) => Err(other.into()),
    }
}

pub async fn list_patients() -> Result<Vec<PatientSummary>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let patients = sqlx::query_as::<_, PatientSummary>(
        "SELECT id, name, email FROM users WHERE role = $1 ORDER BY name",
    )
    .bind(Role::Customer)
    .fetch_all(&pool)
    .await?;

    Ok(patients)
}

// ---------------------------------------------------------------------------
// Medicines

/// Catalogue listing: in-stock medicines only.
pub async fn list_available_medicines() -> Result<Vec<MedicineListItem>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let medicines = sqlx::query_as::<_, MedicineListItem>(
        "SELECT id, name, description, price, stock, category, requires_prescription
         FROM medicines
         WHERE stock > 0
         ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(medicines)
}

pub async fn list_supplier_medicines(supplier_id: Uuid) -> Result<Vec<Medicine>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let medicines = sqlx::query_as::<_, Medicine>(
        "SELECT id, name, description, price, stock, manufacturer, category,
                requires_prescription, supplier_id, expiry_date, created_at
         FROM medicines
         WHERE supplier_id = $1
         ORDER BY name",
    )
    .bind(supplier_id)
    .fetch_all(&pool)
    .await?;

    Ok(medicines)
}

pub async fn insert_medicine(
    supplier_id: Uuid,
    new: &NewMedicine,
) -> Result<Medicine, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let medicine = sqlx::query_as::<_, Medicine>(
        "INSERT INTO medicines
            (name, description, price, stock, manufacturer, category,
             requires_prescription, supplier_id, expiry_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id, name, description, price, stock, manufacturer, category,
                   requires_prescription, supplier_id, expiry_date, created_at",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.stock)
    .bind(&new.manufacturer)
    .bind(&new.category)
    .bind(new.requires_prescription)
    .bind(supplier_id)
    .bind(new.expiry_date)
    .fetch_one(&pool)
    .await?;

    Ok(medicine)
}

// ---------------------------------------------------------------------------
// Orders

pub async fn list_customer_orders(customer_id: Uuid) -> Result<Vec<OrderView>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let orders = sqlx::query_as::<_, Order>(
        "SELECT id, customer_id, total_amount, status, created_at
         FROM orders
         WHERE customer_id = $1
         ORDER BY created_at DESC",
    )
    .bind(customer_id)
    .fetch_all(&pool)
    .await?;

    attach_order_items(&pool, orders).await
}

/// Create an order for the caller. The customer reference and the
/// `pending` status are stamped here; the total is recomputed from stored
/// prices so a client-supplied amount is never trusted. The order row and
/// its line items commit in one transaction.
pub async fn create_order(
    customer_id: Uuid,
    items: &[NewOrderItem],
) -> Result<OrderView, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let ids: Vec<Uuid> = items.iter().map(|i| i.medicine_id).collect();
    let priced = sqlx::query_as::<_, (Uuid, Decimal)>(
        "SELECT id, price FROM medicines WHERE id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(&pool)
    .await?;
    let prices: HashMap<Uuid, Decimal> = priced.into_iter().collect();

    let mut total = Decimal::ZERO;
    for item in items {
        let price = prices
            .get(&item.medicine_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Medicine {} not found", item.medicine_id)))?;
        total += *price * Decimal::from(item.quantity);
    }

    let mut tx = pool.begin().await?;

    let order = sqlx::query_as::<_, Order>(
        "INSERT INTO orders (customer_id, total_amount, status)
         VALUES ($1, $2, 'pending')
         RETURNING id, customer_id, total_amount, status, created_at",
    )
    .bind(customer_id)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, medicine_id, quantity, unit_price)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(order.id)
        .bind(item.medicine_id)
        .bind(item.quantity)
        .bind(prices[&item.medicine_id])
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let views = attach_order_items(&pool, vec![order]).await?;
    views
        .into_iter()
        .next()
        .ok_or_else(|| DatabaseError::NotFound("Order not found".to_string()))
}

async fn attach_order_items(
    pool: &PgPool,
    orders: Vec<Order>,
) -> Result<Vec<OrderView>, DatabaseError> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let rows = sqlx::query_as::<_, OrderItemRow>(
        "SELECT oi.order_id, oi.medicine_id, m.name AS medicine_name,
                oi.quantity, oi.unit_price
         FROM order_items oi
         JOIN medicines m ON m.id = oi.medicine_id
         WHERE oi.order_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut items_by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
    for row in rows {
        items_by_order
            .entry(row.order_id)
            .or_default()
            .push(row.into());
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderView {
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            id: order.id,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Prescriptions

const PRESCRIPTION_SELECT: &str =
    "SELECT p.id, p.patient_id, pu.name AS patient_name,
            p.doctor_id, du.name AS doctor_name,
            p.notes, p.status, p.valid_until, p.created_at
     FROM prescriptions p
     JOIN users pu ON pu.id = p.patient_id
     JOIN users du ON du.id = p.doctor_id";

pub async fn list_doctor_prescriptions(
    doctor_id: Uuid,
) -> Result<Vec<PrescriptionView>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let rows = sqlx::query_as::<_, PrescriptionListRow>(&format!(
        "{PRESCRIPTION_SELECT} WHERE p.doctor_id = $1 ORDER BY p.created_at DESC"
    ))
    .bind(doctor_id)
    .fetch_all(&pool)
    .await?;

    attach_prescription_items(&pool, rows).await
}

pub async fn list_patient_prescriptions(
    patient_id: Uuid,
) -> Result<Vec<PrescriptionView>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let rows = sqlx::query_as::<_, PrescriptionListRow>(&format!(
        "{PRESCRIPTION_SELECT} WHERE p.patient_id = $1 ORDER BY p.created_at DESC"
    ))
    .bind(patient_id)
    .fetch_all(&pool)
    .await?;

    attach_prescription_items(&pool, rows).await
}

/// Raw row fetch used for the ownership check before a status update.
pub async fn find_prescription(id: Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let prescription = sqlx::query_as::<_, Prescription>(
        "SELECT id, patient_id, doctor_id, notes, status, valid_until, created_at
         FROM prescriptions
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?;

    Ok(prescription)
}

/// Create a prescription issued by the caller, status `active`. The
/// prescription row and its medicine lines commit in one transaction.
pub async fn create_prescription(
    doctor_id: Uuid,
    new: &NewPrescription,
) -> Result<PrescriptionView, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let mut tx = pool.begin().await?;

    let prescription = sqlx::query_as::<_, Prescription>(
        "INSERT INTO prescriptions (patient_id, doctor_id, notes, status, valid_until)
         VALUES ($1, $2, $3, 'active', $4)
         RETURNING id, patient_id, doctor_id, notes, status, valid_until, created_at",
    )
    .bind(new.patient_id)
    .bind(doctor_id)
    .bind(&new.notes)
    .bind(new.valid_until)
    .fetch_one(&mut *tx)
    .await?;

    for item in &new.medicines {
        sqlx::query(
            "INSERT INTO prescription_items (prescription_id, medicine_id, dosage, duration)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(prescription.id)
        .bind(item.medicine_id)
        .bind(&item.dosage)
        .bind(&item.duration)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    load_prescription_view(&pool, prescription.id).await
}

pub async fn update_prescription_status(
    id: Uuid,
    status: PrescriptionStatus,
) -> Result<PrescriptionView, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    sqlx::query("UPDATE prescriptions SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&pool)
        .await?;

    load_prescription_view(&pool, id).await
}

async fn load_prescription_view(
    pool: &PgPool,
    id: Uuid,
) -> Result<PrescriptionView, DatabaseError> {
    let row = sqlx::query_as::<_, PrescriptionListRow>(&format!(
        "{PRESCRIPTION_SELECT} WHERE p.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Prescription not found".to_string()))?;

    let mut views = attach_prescription_items(pool, vec![row]).await?;
    views
        .pop()
        .ok_or_else(|| DatabaseError::NotFound("Prescription not found".to_string()))
}

async fn attach_prescription_items(
    pool: &PgPool,
    rows: Vec<PrescriptionListRow>,
) -> Result<Vec<PrescriptionView>, DatabaseError> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let item_rows = sqlx::query_as::<_, PrescriptionItemRow>(
        "SELECT pi.prescription_id, pi.medicine_id, m.name AS medicine_name,
                pi.dosage, pi.duration
         FROM prescription_items pi
         JOIN medicines m ON m.id = pi.medicine_id
         WHERE pi.prescription_id = ANY($1)",
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut items_by_prescription: HashMap<Uuid, Vec<PrescriptionItemView>> = HashMap::new();
    for row in item_rows {
        items_by_prescription
            .entry(row.prescription_id)
            .or_default()
            .push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| PrescriptionView {
            medicines: items_by_prescription.remove(&row.id).unwrap_or_default(),
            id: row.id,
            patient_id: row.patient_id,
            patient_name: row.patient_name,
            doctor_id: row.doctor_id,
            doctor_name: row.doctor_name,
            notes: row.notes,
            status: row.status,
            valid_until: row.valid_until,
            created_at: row.created_at,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Admin stats

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_medicines: i64,
    pub total_orders: i64,
    pub total_prescriptions: i64,
    pub monthly_sales: Vec<MonthlySales>,
    pub medicine_categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlySales {
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

pub async fn admin_stats() -> Result<AdminStats, DatabaseError> {
    let pool = DatabaseManager::pool().await?;

    let total_users = count_table(&pool, "users").await?;
    let total_medicines = count_table(&pool, "medicines").await?;
    let total_orders = count_table(&pool, "orders").await?;
    let total_prescriptions = count_table(&pool, "prescriptions").await?;

    let monthly_sales = sqlx::query_as::<_, MonthlySales>(
        "SELECT to_char(date_trunc('month', created_at), 'YYYY-MM') AS month,
                SUM(total_amount) AS total
         FROM orders
         GROUP BY 1
         ORDER BY 1",
    )
    .fetch_all(&pool)
    .await?;

    let medicine_categories = sqlx::query_as::<_, CategoryCount>(
        "SELECT category, COUNT(*) AS count
         FROM medicines
         GROUP BY category
         ORDER BY count DESC, category",
    )
    .fetch_all(&pool)
    .await?;

    Ok(AdminStats {
        total_users,
        total_medicines,
        total_orders,
        total_prescriptions,
        monthly_sales,
        medicine_categories,
    })
}

async fn count_table(pool: &PgPool, table: &str) -> Result<i64, DatabaseError> {
    // Table names come from the fixed list above, never from input
    let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}
