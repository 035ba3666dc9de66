//! Patient repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::listing::{Page, PageRequest, PatientFilter};
use crate::models::{NewPatient, Patient, PatientChanges, PatientId};

/// CRUD over registered patients.
///
/// Lists are ordered by last name, first name, then id.
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn create_patient(&self, patient: NewPatient) -> RepositoryResult<Patient>;

    /// Fails with `NotFound` for an unknown id.
    async fn get_patient(&self, id: PatientId) -> RepositoryResult<Patient>;

    async fn list_patients(
        &self,
        filter: &PatientFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Patient>>;

    async fn update_patient(
        &self,
        id: PatientId,
        changes: PatientChanges,
    ) -> RepositoryResult<Patient>;

    /// Fails with a conflict while queue entries or appointments still
    /// reference the patient.
    async fn delete_patient(&self, id: PatientId) -> RepositoryResult<()>;
}
