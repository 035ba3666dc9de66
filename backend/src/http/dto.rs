//! Data Transfer Objects for the HTTP API.
//!
//! Request bodies and query strings are the loosely typed DTOs from
//! [`crate::api`]; responses are the domain records, which already derive
//! `Serialize`.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    // Appointments
    AppointmentQuery, CreateAppointmentRequest, UpdateAppointmentRequest,
    // Doctors
    CreateDoctorRequest, DoctorQuery, UpdateDoctorRequest,
    // Patients
    CreatePatientRequest, PatientQuery, UpdatePatientRequest,
    // Queue
    CreateQueueEntryRequest, QueueEntryResponse, QueueQuery, UpdateQueueEntryRequest,
    UpdateQueuePriorityRequest, UpdateQueueStatusRequest,
    // Users
    CreateUserRequest, UpdateUserRequest, UserQuery,
    // Shared
    Page,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Database connection status
    pub database: String,
}
