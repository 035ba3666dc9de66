//! Appointment repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::listing::{AppointmentFilter, Page, PageRequest};
use crate::models::{Appointment, AppointmentChanges, AppointmentId, NewAppointment};

/// CRUD over appointments. Lists are ordered by appointment time, then id.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Fails with `NotFound` when the patient or the doctor does not exist.
    async fn create_appointment(&self, appointment: NewAppointment)
        -> RepositoryResult<Appointment>;

    async fn get_appointment(&self, id: AppointmentId) -> RepositoryResult<Appointment>;

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Appointment>>;

    /// Fails with `NotFound` when moved to a doctor that does not exist.
    async fn update_appointment(
        &self,
        id: AppointmentId,
        changes: AppointmentChanges,
    ) -> RepositoryResult<Appointment>;

    async fn delete_appointment(&self, id: AppointmentId) -> RepositoryResult<()>;
}
