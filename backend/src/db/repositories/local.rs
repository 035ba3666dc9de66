//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory behind one lock, providing fast, deterministic, and isolated
//! execution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::listing::{
    AppointmentFilter, DoctorFilter, Page, PageRequest, PatientFilter, QueueFilter, UserFilter,
};
use crate::models::*;
use crate::queue::{EpochPolicy, QueueNumberAllocator};

/// In-memory local repository.
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
/// ```
/// use clinic_desk::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.queue_len(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
    queue_numbers: Arc<QueueNumberAllocator>,
    epoch_policy: EpochPolicy,
}

struct LocalData {
    patients: BTreeMap<PatientId, Patient>,
    doctors: BTreeMap<DoctorId, Doctor>,
    users: BTreeMap<UserId, User>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    queue: BTreeMap<QueueEntryId, QueueEntry>,

    // ID counters
    next_patient_id: i64,
    next_doctor_id: i64,
    next_user_id: i64,
    next_appointment_id: i64,
    next_queue_entry_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            patients: BTreeMap::new(),
            doctors: BTreeMap::new(),
            users: BTreeMap::new(),
            appointments: BTreeMap::new(),
            queue: BTreeMap::new(),
            next_patient_id: 1,
            next_doctor_id: 1,
            next_user_id: 1,
            next_appointment_id: 1,
            next_queue_entry_id: 1,
            is_healthy: true,
        }
    }
}

fn take_id(counter: &mut i64) -> i64 {
    let id = *counter;
    *counter += 1;
    id
}

impl LocalData {
    fn patient(&self, operation: &str, id: PatientId) -> RepositoryResult<&Patient> {
        self.patients
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(operation, "patient", id))
    }

    fn doctor(&self, operation: &str, id: DoctorId) -> RepositoryResult<&Doctor> {
        self.doctors
            .get(&id)
            .ok_or_else(|| RepositoryError::missing(operation, "doctor", id))
    }

    fn patient_name(&self, id: PatientId) -> String {
        self.patients
            .get(&id)
            .map(Patient::full_name)
            .unwrap_or_default()
    }

    fn queue_view(&self, entry: &QueueEntry) -> QueueEntryView {
        QueueEntryView {
            entry: entry.clone(),
            patient_name: self.patient_name(entry.patient_id),
        }
    }

    fn ensure_unique_user(
        &self,
        operation: &str,
        username: Option<&str>,
        email: Option<&str>,
        skip: Option<UserId>,
    ) -> RepositoryResult<()> {
        for user in self.users.values().filter(|u| Some(u.id) != skip) {
            if username.is_some_and(|n| n.eq_ignore_ascii_case(&user.username)) {
                return Err(RepositoryError::conflict_with_context(
                    format!("username '{}' is already taken", user.username),
                    ErrorContext::new(operation).with_entity("user"),
                ));
            }
            if email.is_some_and(|e| e.eq_ignore_ascii_case(&user.email)) {
                return Err(RepositoryError::conflict_with_context(
                    format!("email '{}' is already registered", user.email),
                    ErrorContext::new(operation).with_entity("user"),
                ));
            }
        }
        Ok(())
    }
}

impl LocalRepository {
    /// Create a new empty local repository with daily (UTC) queue numbering.
    pub fn new() -> Self {
        Self::with_epoch_policy(EpochPolicy::default())
    }

    /// Create a new empty local repository with the given numbering epoch.
    pub fn with_epoch_policy(epoch_policy: EpochPolicy) -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
            queue_numbers: Arc::new(QueueNumberAllocator::new()),
            epoch_policy,
        }
    }

    pub fn epoch_policy(&self) -> EpochPolicy {
        self.epoch_policy
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository, including queue counters.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let is_healthy = data.is_healthy;
        *data = LocalData {
            is_healthy,
            ..Default::default()
        };
        self.queue_numbers.reset();
    }

    pub fn patient_count(&self) -> usize {
        self.data.read().patients.len()
    }

    pub fn queue_len(&self) -> usize {
        self.data.read().queue.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn paged<T>(
    mut items: Vec<T>,
    page: PageRequest,
    order: impl FnMut(&T, &T) -> std::cmp::Ordering,
) -> Page<T> {
    items.sort_by(order);
    Page::from_ordered(items, page)
}

// ==================== Health ====================

#[async_trait]
impl HealthRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }
}

// ==================== Patients ====================

#[async_trait]
impl PatientRepository for LocalRepository {
    async fn create_patient(&self, patient: NewPatient) -> RepositoryResult<Patient> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = PatientId::new(take_id(&mut data.next_patient_id));
        let patient = patient.into_patient(id, Utc::now());
        data.patients.insert(id, patient.clone());
        Ok(patient)
    }

    async fn get_patient(&self, id: PatientId) -> RepositoryResult<Patient> {
        self.check_health()?;
        self.data.read().patient("get_patient", id).cloned()
    }

    async fn list_patients(
        &self,
        filter: &PatientFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Patient>> {
        self.check_health()?;
        let data = self.data.read();
        let matching: Vec<Patient> = data
            .patients
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(paged(matching, page, |a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        }))
    }

    async fn update_patient(
        &self,
        id: PatientId,
        changes: PatientChanges,
    ) -> RepositoryResult<Patient> {
        self.check_health()?;
        let mut data = self.data.write();
        let patient = data
            .patients
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("update_patient", "patient", id))?;
        changes.apply_to(patient, Utc::now());
        Ok(patient.clone())
    }

    async fn delete_patient(&self, id: PatientId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        data.patient("delete_patient", id)?;

        let queued = data.queue.values().any(|e| e.patient_id == id);
        let booked = data.appointments.values().any(|a| a.patient_id == id);
        if queued || booked {
            return Err(RepositoryError::conflict_with_context(
                format!("patient {} still has queue entries or appointments", id),
                ErrorContext::new("delete_patient")
                    .with_entity("patient")
                    .with_entity_id(id),
            ));
        }
        data.patients.remove(&id);
        Ok(())
    }
}

// ==================== Doctors ====================

#[async_trait]
impl DoctorRepository for LocalRepository {
    async fn create_doctor(&self, doctor: NewDoctor) -> RepositoryResult<Doctor> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = DoctorId::new(take_id(&mut data.next_doctor_id));
        let doctor = doctor.into_doctor(id, Utc::now());
        data.doctors.insert(id, doctor.clone());
        Ok(doctor)
    }

    async fn get_doctor(&self, id: DoctorId) -> RepositoryResult<Doctor> {
        self.check_health()?;
        self.data.read().doctor("get_doctor", id).cloned()
    }

    async fn list_doctors(
        &self,
        filter: &DoctorFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Doctor>> {
        self.check_health()?;
        let data = self.data.read();
        let matching: Vec<Doctor> = data
            .doctors
            .values()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        Ok(paged(matching, page, |a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        }))
    }

    async fn update_doctor(
        &self,
        id: DoctorId,
        changes: DoctorChanges,
    ) -> RepositoryResult<Doctor> {
        self.check_health()?;
        let mut data = self.data.write();
        let doctor = data
            .doctors
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("update_doctor", "doctor", id))?;
        changes.apply_to(doctor, Utc::now());
        Ok(doctor.clone())
    }

    async fn delete_doctor(&self, id: DoctorId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        data.doctor("delete_doctor", id)?;
        if data.appointments.values().any(|a| a.doctor_id == id) {
            return Err(RepositoryError::conflict_with_context(
                format!("doctor {} still has appointments", id),
                ErrorContext::new("delete_doctor")
                    .with_entity("doctor")
                    .with_entity_id(id),
            ));
        }
        data.doctors.remove(&id);
        Ok(())
    }
}

// ==================== Users ====================

#[async_trait]
impl UserRepository for LocalRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();
        data.ensure_unique_user("create_user", Some(&user.username), Some(&user.email), None)?;
        let id = UserId::new(take_id(&mut data.next_user_id));
        let user = user.into_user(id, Utc::now());
        data.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.check_health()?;
        self.data
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::missing("get_user", "user", id))
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<User>> {
        self.check_health()?;
        let data = self.data.read();
        let matching: Vec<User> = data
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        Ok(paged(matching, page, |a, b| {
            (&a.username, a.id).cmp(&(&b.username, b.id))
        }))
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&id) {
            return Err(RepositoryError::missing("update_user", "user", id));
        }
        data.ensure_unique_user("update_user", None, changes.email.as_deref(), Some(id))?;
        let user = data
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("update_user", "user", id))?;
        changes.apply_to(user, Utc::now());
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("delete_user", "user", id))
    }
}

// ==================== Appointments ====================

#[async_trait]
impl AppointmentRepository for LocalRepository {
    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> RepositoryResult<Appointment> {
        self.check_health()?;
        let mut data = self.data.write();
        data.patient("create_appointment", appointment.patient_id)?;
        data.doctor("create_appointment", appointment.doctor_id)?;
        let id = AppointmentId::new(take_id(&mut data.next_appointment_id));
        let appointment = appointment.into_appointment(id, Utc::now());
        data.appointments.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: AppointmentId) -> RepositoryResult<Appointment> {
        self.check_health()?;
        self.data
            .read()
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::missing("get_appointment", "appointment", id))
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Appointment>> {
        self.check_health()?;
        let data = self.data.read();
        let matching: Vec<Appointment> = data
            .appointments
            .values()
            .filter(|a| filter.matches(a, &data.patient_name(a.patient_id)))
            .cloned()
            .collect();
        Ok(paged(matching, page, |a, b| {
            (a.appointment_datetime, a.id).cmp(&(b.appointment_datetime, b.id))
        }))
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        changes: AppointmentChanges,
    ) -> RepositoryResult<Appointment> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(doctor_id) = changes.doctor_id {
            data.doctor("update_appointment", doctor_id)?;
        }
        let appointment = data
            .appointments
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("update_appointment", "appointment", id))?;
        changes.apply_to(appointment, Utc::now());
        Ok(appointment.clone())
    }

    async fn delete_appointment(&self, id: AppointmentId) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .appointments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("delete_appointment", "appointment", id))
    }
}

// ==================== Queue ====================

#[async_trait]
impl QueueRepository for LocalRepository {
    async fn check_in(
        &self,
        entry: NewQueueEntry,
        arrival_time: DateTime<Utc>,
    ) -> RepositoryResult<QueueEntryView> {
        self.check_health()?;
        // Allocation happens under the write lock so number and insert are one step.
        let mut data = self.data.write();
        data.patient("check_in", entry.patient_id)?;

        let epoch = self.epoch_policy.epoch_for(arrival_time);
        let queue_number = self.queue_numbers.next(&epoch);
        let id = QueueEntryId::new(take_id(&mut data.next_queue_entry_id));
        let entry = QueueEntry {
            id,
            patient_id: entry.patient_id,
            queue_number,
            epoch,
            status: QueueStatus::Waiting,
            priority: entry.priority,
            arrival_time,
            estimated_wait_time: None,
            updated_at: arrival_time,
        };
        data.queue.insert(id, entry.clone());
        Ok(data.queue_view(&entry))
    }

    async fn get_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<QueueEntryView> {
        self.check_health()?;
        let data = self.data.read();
        data.queue
            .get(&id)
            .map(|e| data.queue_view(e))
            .ok_or_else(|| RepositoryError::missing("get_queue_entry", "queue_entry", id))
    }

    async fn fetch_queue_entries(
        &self,
        filter: &QueueFilter,
    ) -> RepositoryResult<Vec<QueueEntryView>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .queue
            .values()
            .map(|e| data.queue_view(e))
            .filter(|v| filter.matches(v))
            .collect())
    }

    async fn update_queue_entry(
        &self,
        id: QueueEntryId,
        changes: QueueEntryChanges,
    ) -> RepositoryResult<QueueEntryView> {
        self.check_health()?;
        let mut data = self.data.write();
        let entry = data
            .queue
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("update_queue_entry", "queue_entry", id))?;
        changes.check_transition(entry.status).map_err(|msg| {
            RepositoryError::conflict_with_context(
                msg,
                ErrorContext::new("update_queue_entry")
                    .with_entity("queue_entry")
                    .with_entity_id(id),
            )
        })?;
        changes.apply_to(entry, Utc::now());
        let entry = entry.clone();
        Ok(data.queue_view(&entry))
    }

    async fn delete_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<()> {
        self.check_health()?;
        self.data
            .write()
            .queue
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::missing("delete_queue_entry", "queue_entry", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_patient(first: &str, last: &str) -> NewPatient {
        NewPatient {
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: None,
            gender: None,
            phone: "555-0100".into(),
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = LocalRepository::new();
        let a = repo.create_patient(new_patient("A", "One")).await.unwrap();
        let b = repo.create_patient(new_patient("B", "Two")).await.unwrap();
        assert_eq!(a.id.value(), 1);
        assert_eq!(b.id.value(), 2);
        assert_eq!(repo.patient_count(), 2);
    }

    #[tokio::test]
    async fn test_check_in_unknown_patient() {
        let repo = LocalRepository::new();
        let err = repo
            .check_in(
                NewQueueEntry {
                    patient_id: PatientId::new(99),
                    priority: QueuePriority::Normal,
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
        assert_eq!(repo.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_numbers_not_reused_after_delete() {
        let repo = LocalRepository::new();
        let p = repo.create_patient(new_patient("A", "One")).await.unwrap();
        let now = Utc::now();
        let entry = NewQueueEntry {
            patient_id: p.id,
            priority: QueuePriority::Normal,
        };

        let first = repo.check_in(entry.clone(), now).await.unwrap();
        repo.delete_queue_entry(first.entry.id).await.unwrap();
        let second = repo.check_in(entry, now).await.unwrap();

        assert_eq!(first.entry.queue_number, 1);
        assert_eq!(second.entry.queue_number, 2);
    }

    #[tokio::test]
    async fn test_unhealthy_repository_rejects_operations() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        let err = repo.create_patient(new_patient("A", "One")).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_clear_resets_counters() {
        let repo = LocalRepository::new();
        let p = repo.create_patient(new_patient("A", "One")).await.unwrap();
        repo.check_in(
            NewQueueEntry {
                patient_id: p.id,
                priority: QueuePriority::Normal,
            },
            Utc::now(),
        )
        .await
        .unwrap();
        repo.clear();
        assert_eq!(repo.patient_count(), 0);
        assert_eq!(repo.queue_len(), 0);
        let p = repo.create_patient(new_patient("B", "Two")).await.unwrap();
        assert_eq!(p.id.value(), 1);
    }
}
