use axum::{Extension, Json};

use crate::database::models::user::PatientSummary;
use crate::database::service;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// GET /patients - id/name/email of every patient-role user. Doctors use
/// this to pick a prescription recipient; any authenticated role may read
/// it.
pub async fn patients_get(
    Extension(_auth): Extension<AuthUser>,
) -> Result<Json<Vec<PatientSummary>>, ApiError> {
    let patients = service::list_patients().await?;
    Ok(Json(patients))
}
