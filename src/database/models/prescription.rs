use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Active,
    Completed,
    Expired,
}

/// Raw prescription row; used for the fetch-then-ownership-check step
/// before a status update.
#[derive(Debug, Clone, FromRow)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub notes: String,
    pub status: PrescriptionStatus,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Prescription joined with patient and doctor names.
#[derive(Debug, Clone, FromRow)]
pub struct PrescriptionListRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub notes: String,
    pub status: PrescriptionStatus,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Line item joined with its medicine name.
#[derive(Debug, Clone, FromRow)]
pub struct PrescriptionItemRow {
    pub prescription_id: Uuid,
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItemView {
    pub medicine_id: Uuid,
    pub medicine_name: String,
    pub dosage: String,
    pub duration: String,
}

impl From<PrescriptionItemRow> for PrescriptionItemView {
    fn from(row: PrescriptionItemRow) -> Self {
        Self {
            medicine_id: row.medicine_id,
            medicine_name: row.medicine_name,
            dosage: row.dosage,
            duration: row.duration,
        }
    }
}

/// Denormalized prescription: names resolved at read time, foreign keys
/// kept alongside so the referenced entities stay the source of truth.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionView {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub medicines: Vec<PrescriptionItemView>,
    pub notes: String,
    pub status: PrescriptionStatus,
    pub valid_until: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Create payload. The doctor is stamped from the session identity and the
/// status always starts as `Active`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescription {
    pub patient_id: Uuid,
    pub medicines: Vec<NewPrescriptionItem>,
    #[serde(default)]
    pub notes: String,
    pub valid_until: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrescriptionItem {
    pub medicine_id: Uuid,
    pub dosage: String,
    pub duration: String,
}

/// Status update payload for `PATCH /prescriptions/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionStatusUpdate {
    pub status: PrescriptionStatus,
}
