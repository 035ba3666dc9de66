//! HTTP handlers for the REST API.
//!
//! Each handler validates its input with [`crate::validation`] and
//! delegates to the service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use super::dto::*;
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{
    Appointment, AppointmentId, Doctor, DoctorId, Patient, PatientId, QueueEntryId, User, UserId,
};
use crate::validation;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn created<T>(value: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Queue
// =============================================================================

/// GET /v1/queue
///
/// Ranked queue: urgent first, then by arrival, then by queue number.
pub async fn list_queue(
    State(state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> HandlerResult<Page<QueueEntryResponse>> {
    let (filter, page) = validation::validate_queue_query(query)?;
    let page = db_services::list_queue(state.repository.as_ref(), &filter, page).await?;
    Ok(Json(page))
}

/// POST /v1/queue
///
/// Check a patient in.
pub async fn check_in(
    State(state): State<AppState>,
    Json(request): Json<CreateQueueEntryRequest>,
) -> CreatedResult<QueueEntryResponse> {
    let entry = validation::validate_check_in(request)?;
    let view = db_services::check_in(state.repository.as_ref(), entry).await?;
    info!(
        queue_entry = %view.entry.id,
        queue_number = view.entry.queue_number,
        "patient checked in"
    );
    created(view)
}

/// GET /v1/queue/{id}
pub async fn get_queue_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<QueueEntryResponse> {
    let view =
        db_services::get_queue_entry(state.repository.as_ref(), QueueEntryId::new(id)).await?;
    Ok(Json(view))
}

/// PATCH /v1/queue/{id}
///
/// Staff update of status, priority and estimated wait time.
pub async fn update_queue_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateQueueEntryRequest>,
) -> HandlerResult<QueueEntryResponse> {
    let changes = validation::validate_update_queue_entry(request)?;
    let view = db_services::update_queue_entry(
        state.repository.as_ref(),
        QueueEntryId::new(id),
        changes,
    )
    .await?;
    Ok(Json(view))
}

/// PATCH /v1/queue/{id}/status
pub async fn update_queue_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateQueueStatusRequest>,
) -> HandlerResult<QueueEntryResponse> {
    let status = validation::validate_queue_status(&request.status)?;
    let view = db_services::update_queue_status(
        state.repository.as_ref(),
        QueueEntryId::new(id),
        status,
    )
    .await?;
    Ok(Json(view))
}

/// PATCH /v1/queue/{id}/priority
pub async fn update_queue_priority(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateQueuePriorityRequest>,
) -> HandlerResult<QueueEntryResponse> {
    let priority = validation::validate_queue_priority(&request.priority)?;
    let view = db_services::update_queue_priority(
        state.repository.as_ref(),
        QueueEntryId::new(id),
        priority,
    )
    .await?;
    Ok(Json(view))
}

/// DELETE /v1/queue/{id}
pub async fn remove_queue_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::remove_queue_entry(state.repository.as_ref(), QueueEntryId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Patients
// =============================================================================

/// GET /v1/patients
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientQuery>,
) -> HandlerResult<Page<Patient>> {
    let (filter, page) = validation::validate_patient_query(query)?;
    let page = db_services::list_patients(state.repository.as_ref(), &filter, page).await?;
    Ok(Json(page))
}

/// POST /v1/patients
pub async fn create_patient(
    State(state): State<AppState>,
    Json(request): Json<CreatePatientRequest>,
) -> CreatedResult<Patient> {
    let patient = validation::validate_create_patient(request)?;
    created(db_services::create_patient(state.repository.as_ref(), patient).await?)
}

/// GET /v1/patients/{id}
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Patient> {
    let patient = db_services::get_patient(state.repository.as_ref(), PatientId::new(id)).await?;
    Ok(Json(patient))
}

/// PATCH /v1/patients/{id}
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> HandlerResult<Patient> {
    let changes = validation::validate_update_patient(request)?;
    let patient =
        db_services::update_patient(state.repository.as_ref(), PatientId::new(id), changes)
            .await?;
    Ok(Json(patient))
}

/// DELETE /v1/patients/{id}
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_patient(state.repository.as_ref(), PatientId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Doctors
// =============================================================================

/// GET /v1/doctors
pub async fn list_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorQuery>,
) -> HandlerResult<Page<Doctor>> {
    let (filter, page) = validation::validate_doctor_query(query)?;
    let page = db_services::list_doctors(state.repository.as_ref(), &filter, page).await?;
    Ok(Json(page))
}

/// POST /v1/doctors
pub async fn create_doctor(
    State(state): State<AppState>,
    Json(request): Json<CreateDoctorRequest>,
) -> CreatedResult<Doctor> {
    let doctor = validation::validate_create_doctor(request)?;
    created(db_services::create_doctor(state.repository.as_ref(), doctor).await?)
}

/// GET /v1/doctors/{id}
pub async fn get_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Doctor> {
    let doctor = db_services::get_doctor(state.repository.as_ref(), DoctorId::new(id)).await?;
    Ok(Json(doctor))
}

/// PATCH /v1/doctors/{id}
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> HandlerResult<Doctor> {
    let changes = validation::validate_update_doctor(request)?;
    let doctor =
        db_services::update_doctor(state.repository.as_ref(), DoctorId::new(id), changes).await?;
    Ok(Json(doctor))
}

/// DELETE /v1/doctors/{id}
pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_doctor(state.repository.as_ref(), DoctorId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Users
// =============================================================================

/// GET /v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<Page<User>> {
    let (filter, page) = validation::validate_user_query(query)?;
    let page = db_services::list_users(state.repository.as_ref(), &filter, page).await?;
    Ok(Json(page))
}

/// POST /v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> CreatedResult<User> {
    let user = validation::validate_create_user(request)?;
    created(db_services::create_user(state.repository.as_ref(), user).await?)
}

/// GET /v1/users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i64>) -> HandlerResult<User> {
    let user = db_services::get_user(state.repository.as_ref(), UserId::new(id)).await?;
    Ok(Json(user))
}

/// PATCH /v1/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUserRequest>,
) -> HandlerResult<User> {
    let changes = validation::validate_update_user(request)?;
    let user = db_services::update_user(state.repository.as_ref(), UserId::new(id), changes).await?;
    Ok(Json(user))
}

/// DELETE /v1/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_user(state.repository.as_ref(), UserId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Appointments
// =============================================================================

/// GET /v1/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AppointmentQuery>,
) -> HandlerResult<Page<Appointment>> {
    let (filter, page) = validation::validate_appointment_query(query)?;
    let page = db_services::list_appointments(state.repository.as_ref(), &filter, page).await?;
    Ok(Json(page))
}

/// POST /v1/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<CreateAppointmentRequest>,
) -> CreatedResult<Appointment> {
    let appointment = validation::validate_create_appointment(request)?;
    created(db_services::create_appointment(state.repository.as_ref(), appointment).await?)
}

/// GET /v1/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> HandlerResult<Appointment> {
    let appointment =
        db_services::get_appointment(state.repository.as_ref(), AppointmentId::new(id)).await?;
    Ok(Json(appointment))
}

/// PATCH /v1/appointments/{id}
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> HandlerResult<Appointment> {
    let changes = validation::validate_update_appointment(request)?;
    let appointment = db_services::update_appointment(
        state.repository.as_ref(),
        AppointmentId::new(id),
        changes,
    )
    .await?;
    Ok(Json(appointment))
}

/// DELETE /v1/appointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    db_services::delete_appointment(state.repository.as_ref(), AppointmentId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
