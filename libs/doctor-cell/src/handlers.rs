use std::sync::Arc;

use axum::extract::{Path, State};
use serde::Deserialize;

use shared_models::error::AppError;
use shared_models::response::ApiResponse;
use shared_utils::extractor::{JsonOrDefault, ValidatedJson, ValidatedQuery};

use crate::models::{
    CreateDoctorRequest, Doctor, DoctorFilter, DoctorPatch, PopulatedDoctor, ResolvedDoctor,
};
use crate::services::DoctorService;
use crate::state::DoctorCellState;

#[derive(Debug, Default, Deserialize)]
pub struct DoctorSearchQuery {
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub hospital: Option<String>,
}

impl From<DoctorSearchQuery> for DoctorFilter {
    fn from(query: DoctorSearchQuery) -> Self {
        DoctorFilter {
            specialization: query.specialization,
            location: query.location,
            hospital: query.hospital,
        }
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<DoctorCellState>>,
) -> Result<ApiResponse<Vec<PopulatedDoctor>>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service.list_all().await?;
    Ok(ApiResponse::ok(doctors))
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(state): State<Arc<DoctorCellState>>,
    ValidatedQuery(query): ValidatedQuery<DoctorSearchQuery>,
) -> Result<ApiResponse<Vec<PopulatedDoctor>>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctors = doctor_service.search(query.into()).await?;
    Ok(ApiResponse::ok(doctors))
}

/// Upsert-by-GET: provisions a default profile on first access for doctor accounts.
#[axum::debug_handler]
pub async fn get_doctor_by_user(
    State(state): State<Arc<DoctorCellState>>,
    Path(user_id): Path<String>,
) -> Result<ApiResponse<ResolvedDoctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.find_or_provision(&user_id).await?;
    Ok(ApiResponse::ok(doctor))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<DoctorCellState>>,
    ValidatedJson(request): ValidatedJson<CreateDoctorRequest>,
) -> Result<ApiResponse<Doctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.create(request).await?;
    Ok(ApiResponse::created(doctor).with_message("Doctor profile created successfully"))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
) -> Result<ApiResponse<PopulatedDoctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.get(&doctor_id).await?;
    Ok(ApiResponse::ok(doctor))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
    JsonOrDefault(patch): JsonOrDefault<DoctorPatch>,
) -> Result<ApiResponse<Doctor>, AppError> {
    let doctor_service = DoctorService::new(&state);
    let doctor = doctor_service.update(&doctor_id, patch).await?;
    Ok(ApiResponse::ok(doctor).with_message("Doctor profile updated successfully"))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<DoctorCellState>>,
    Path(doctor_id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let doctor_service = DoctorService::new(&state);
    doctor_service.delete(&doctor_id).await?;
    Ok(ApiResponse::message("Doctor profile deleted successfully"))
}
