//! Doctor repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::listing::{DoctorFilter, Page, PageRequest};
use crate::models::{Doctor, DoctorChanges, DoctorId, NewDoctor};

/// CRUD over doctors. Lists are ordered by last name, first name, then id.
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn create_doctor(&self, doctor: NewDoctor) -> RepositoryResult<Doctor>;

    async fn get_doctor(&self, id: DoctorId) -> RepositoryResult<Doctor>;

    async fn list_doctors(
        &self,
        filter: &DoctorFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Doctor>>;

    async fn update_doctor(&self, id: DoctorId, changes: DoctorChanges)
        -> RepositoryResult<Doctor>;

    /// Fails with a conflict while appointments still reference the doctor.
    async fn delete_doctor(&self, id: DoctorId) -> RepositoryResult<()>;
}
