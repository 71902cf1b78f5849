use axum::{extract::Path, http::StatusCode, Extension, Json};
use uuid::Uuid;

use crate::database::models::prescription::{
    NewPrescription, PrescriptionStatusUpdate, PrescriptionView,
};
use crate::database::models::user::Role;
use crate::database::service;
use crate::error::{ApiError, ApiJson};
use crate::middleware::AuthUser;

/// GET /doctor/prescriptions - prescriptions issued by the caller, newest
/// first, with patient and medicine names resolved.
pub async fn doctor_prescriptions_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PrescriptionView>>, ApiError> {
    auth.require_role(Role::Doctor)?;

    let prescriptions = service::list_doctor_prescriptions(auth.user_id).await?;
    Ok(Json(prescriptions))
}

/// POST /doctor/prescriptions - issue a prescription. The doctor reference
/// is stamped from the session and the status always starts `active`.
pub async fn doctor_prescriptions_post(
    Extension(auth): Extension<AuthUser>,
    ApiJson(body): ApiJson<NewPrescription>,
) -> Result<(StatusCode, Json<PrescriptionView>), ApiError> {
    auth.require_role(Role::Doctor)?;

    if body.medicines.is_empty() {
        return Err(ApiError::validation(
            "Prescription must contain at least one medicine",
            Some("medicines".to_string()),
        ));
    }

    let prescription = service::create_prescription(auth.user_id, &body).await?;

    tracing::info!(
        prescription_id = %prescription.id,
        doctor_id = %auth.user_id,
        "prescription created"
    );

    Ok((StatusCode::CREATED, Json(prescription)))
}

/// PATCH /prescriptions/:id - update a prescription's status.
///
/// Fixed check order: role, then fetch, then ownership, then write. A
/// wrong-role caller is rejected before any lookup, so resource existence
/// never leaks outside the doctor role.
pub async fn prescription_patch(
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<PrescriptionStatusUpdate>,
) -> Result<Json<PrescriptionView>, ApiError> {
    auth.require_role(Role::Doctor)?;

    let prescription = service::find_prescription(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription not found"))?;

    // Only the issuing doctor may mutate it
    if prescription.doctor_id != auth.user_id {
        return Err(ApiError::unauthorized("Unauthorized"));
    }

    let updated = service::update_prescription_status(id, body.status).await?;
    Ok(Json(updated))
}

/// GET /customer/prescriptions - prescriptions received by the caller,
/// newest first, with doctor and medicine names resolved.
pub async fn patient_prescriptions_get(
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PrescriptionView>>, ApiError> {
    auth.require_role(Role::Customer)?;

    let prescriptions = service::list_patient_prescriptions(auth.user_id).await?;
    Ok(Json(prescriptions))
}
