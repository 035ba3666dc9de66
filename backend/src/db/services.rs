//! High-level database service layer.
//!
//! This module provides repository-agnostic operations that work with any
//! implementation of the repository traits. Business rules that must hold
//! regardless of the storage backend live here: check-in timestamps, the
//! queue listing pipeline (filter → rank → paginate) and the status and
//! priority shortcuts used by the front desk.
//!
//! # Example
//! ```
//! use clinic_desk::db::{services, LocalRepository};
//! use clinic_desk::listing::{PageRequest, QueueFilter};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let repo = LocalRepository::new();
//! let page = services::list_queue(&repo, &QueueFilter::default(), PageRequest::default())
//!     .await
//!     .unwrap();
//! assert_eq!(page.total, 0);
//! # });
//! ```

use chrono::Utc;
use log::{debug, info};

use super::repository::{FullRepository, RepositoryResult};
use crate::listing::{
    AppointmentFilter, DoctorFilter, Page, PageRequest, PatientFilter, QueueFilter, UserFilter,
};
use crate::models::*;
use crate::queue::rank_page;

// ==================== Health & Connection ====================

/// Check if the storage backend is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Queue Operations ====================

/// Check a patient in to the walk-in queue.
///
/// The entry starts as `waiting` with `arrival_time` set to now and the next
/// queue number of the current epoch.
///
/// # Returns
/// * `Ok(QueueEntryView)` - The new entry with its patient's name
/// * `Err(NotFound)` if the patient does not exist
pub async fn check_in<R: FullRepository + ?Sized>(
    repo: &R,
    entry: NewQueueEntry,
) -> RepositoryResult<QueueEntryView> {
    let patient_id = entry.patient_id;
    let priority = entry.priority;
    let view = repo.check_in(entry, Utc::now()).await?;
    info!(
        "Service layer: checked in patient {} as #{} (epoch {}, priority {})",
        patient_id, view.entry.queue_number, view.entry.epoch, priority
    );
    Ok(view)
}

pub async fn get_queue_entry<R: FullRepository + ?Sized>(
    repo: &R,
    id: QueueEntryId,
) -> RepositoryResult<QueueEntryView> {
    repo.get_queue_entry(id).await
}

/// List the queue: filter, rank, then cut out the requested page.
///
/// `total` counts the filtered entries, not just the returned page.
pub async fn list_queue<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &QueueFilter,
    page: PageRequest,
) -> RepositoryResult<Page<QueueEntryView>> {
    let filtered = repo.fetch_queue_entries(filter).await?;
    debug!(
        "Service layer: ranking {} queue entries (page {}, limit {})",
        filtered.len(),
        page.page(),
        page.limit()
    );
    Ok(rank_page(filtered, page))
}

/// Move an entry to a new status. Backwards moves fail with a conflict.
pub async fn update_queue_status<R: FullRepository + ?Sized>(
    repo: &R,
    id: QueueEntryId,
    status: QueueStatus,
) -> RepositoryResult<QueueEntryView> {
    let view = repo
        .update_queue_entry(id, QueueEntryChanges::status(status))
        .await?;
    info!("Service layer: queue entry {} is now {}", id, status);
    Ok(view)
}

pub async fn update_queue_priority<R: FullRepository + ?Sized>(
    repo: &R,
    id: QueueEntryId,
    priority: QueuePriority,
) -> RepositoryResult<QueueEntryView> {
    let view = repo
        .update_queue_entry(id, QueueEntryChanges::priority(priority))
        .await?;
    info!("Service layer: queue entry {} priority set to {}", id, priority);
    Ok(view)
}

/// Combined staff update of status, priority and estimated wait time.
pub async fn update_queue_entry<R: FullRepository + ?Sized>(
    repo: &R,
    id: QueueEntryId,
    changes: QueueEntryChanges,
) -> RepositoryResult<QueueEntryView> {
    let view = repo.update_queue_entry(id, changes).await?;
    info!("Service layer: updated queue entry {}", id);
    Ok(view)
}

/// Remove an entry. Its number is not handed out again.
pub async fn remove_queue_entry<R: FullRepository + ?Sized>(
    repo: &R,
    id: QueueEntryId,
) -> RepositoryResult<()> {
    repo.delete_queue_entry(id).await?;
    info!("Service layer: removed queue entry {}", id);
    Ok(())
}

// ==================== Patients ====================

pub async fn create_patient<R: FullRepository + ?Sized>(
    repo: &R,
    patient: NewPatient,
) -> RepositoryResult<Patient> {
    let patient = repo.create_patient(patient).await?;
    info!("Service layer: registered patient {}", patient.id);
    Ok(patient)
}

pub async fn get_patient<R: FullRepository + ?Sized>(
    repo: &R,
    id: PatientId,
) -> RepositoryResult<Patient> {
    repo.get_patient(id).await
}

pub async fn list_patients<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &PatientFilter,
    page: PageRequest,
) -> RepositoryResult<Page<Patient>> {
    repo.list_patients(filter, page).await
}

pub async fn update_patient<R: FullRepository + ?Sized>(
    repo: &R,
    id: PatientId,
    changes: PatientChanges,
) -> RepositoryResult<Patient> {
    repo.update_patient(id, changes).await
}

pub async fn delete_patient<R: FullRepository + ?Sized>(
    repo: &R,
    id: PatientId,
) -> RepositoryResult<()> {
    repo.delete_patient(id).await?;
    info!("Service layer: deleted patient {}", id);
    Ok(())
}

// ==================== Doctors ====================

pub async fn create_doctor<R: FullRepository + ?Sized>(
    repo: &R,
    doctor: NewDoctor,
) -> RepositoryResult<Doctor> {
    let doctor = repo.create_doctor(doctor).await?;
    info!("Service layer: added doctor {}", doctor.id);
    Ok(doctor)
}

pub async fn get_doctor<R: FullRepository + ?Sized>(
    repo: &R,
    id: DoctorId,
) -> RepositoryResult<Doctor> {
    repo.get_doctor(id).await
}

pub async fn list_doctors<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &DoctorFilter,
    page: PageRequest,
) -> RepositoryResult<Page<Doctor>> {
    repo.list_doctors(filter, page).await
}

pub async fn update_doctor<R: FullRepository + ?Sized>(
    repo: &R,
    id: DoctorId,
    changes: DoctorChanges,
) -> RepositoryResult<Doctor> {
    repo.update_doctor(id, changes).await
}

pub async fn delete_doctor<R: FullRepository + ?Sized>(
    repo: &R,
    id: DoctorId,
) -> RepositoryResult<()> {
    repo.delete_doctor(id).await?;
    info!("Service layer: deleted doctor {}", id);
    Ok(())
}

// ==================== Users ====================

pub async fn create_user<R: FullRepository + ?Sized>(
    repo: &R,
    user: NewUser,
) -> RepositoryResult<User> {
    let user = repo.create_user(user).await?;
    info!(
        "Service layer: created {} account '{}' ({})",
        user.role, user.username, user.id
    );
    Ok(user)
}

pub async fn get_user<R: FullRepository + ?Sized>(repo: &R, id: UserId) -> RepositoryResult<User> {
    repo.get_user(id).await
}

pub async fn list_users<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &UserFilter,
    page: PageRequest,
) -> RepositoryResult<Page<User>> {
    repo.list_users(filter, page).await
}

pub async fn update_user<R: FullRepository + ?Sized>(
    repo: &R,
    id: UserId,
    changes: UserChanges,
) -> RepositoryResult<User> {
    repo.update_user(id, changes).await
}

pub async fn delete_user<R: FullRepository + ?Sized>(repo: &R, id: UserId) -> RepositoryResult<()> {
    repo.delete_user(id).await?;
    info!("Service layer: deleted user {}", id);
    Ok(())
}

// ==================== Appointments ====================

pub async fn create_appointment<R: FullRepository + ?Sized>(
    repo: &R,
    appointment: NewAppointment,
) -> RepositoryResult<Appointment> {
    let appointment = repo.create_appointment(appointment).await?;
    info!(
        "Service layer: booked appointment {} (patient {}, doctor {}, at {})",
        appointment.id,
        appointment.patient_id,
        appointment.doctor_id,
        appointment.appointment_datetime
    );
    Ok(appointment)
}

pub async fn get_appointment<R: FullRepository + ?Sized>(
    repo: &R,
    id: AppointmentId,
) -> RepositoryResult<Appointment> {
    repo.get_appointment(id).await
}

pub async fn list_appointments<R: FullRepository + ?Sized>(
    repo: &R,
    filter: &AppointmentFilter,
    page: PageRequest,
) -> RepositoryResult<Page<Appointment>> {
    repo.list_appointments(filter, page).await
}

pub async fn update_appointment<R: FullRepository + ?Sized>(
    repo: &R,
    id: AppointmentId,
    changes: AppointmentChanges,
) -> RepositoryResult<Appointment> {
    repo.update_appointment(id, changes).await
}

pub async fn delete_appointment<R: FullRepository + ?Sized>(
    repo: &R,
    id: AppointmentId,
) -> RepositoryResult<()> {
    repo.delete_appointment(id).await?;
    info!("Service layer: deleted appointment {}", id);
    Ok(())
}
