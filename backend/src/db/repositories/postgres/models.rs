use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use std::str::FromStr;

use super::schema::{appointments, doctors, patients, queue_entries, users};
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult};
use crate::models::*;

/// Parse a text enum column, treating unknown values as corrupt rows.
fn parse_column<T: FromStr<Err = String>>(table: &str, value: &str) -> RepositoryResult<T> {
    T::from_str(value).map_err(|e| {
        RepositoryError::internal_with_context(e, ErrorContext::new("decode_row").with_entity(table))
    })
}

// ==================== Patients ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PatientRow {
    pub patient_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientRow {
    pub fn into_patient(self) -> RepositoryResult<Patient> {
        let gender = self
            .gender
            .as_deref()
            .map(|g| parse_column("patients", g))
            .transpose()?;
        Ok(Patient {
            id: PatientId::new(self.patient_id),
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender,
            phone: self.phone,
            email: self.email,
            address: self.address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = patients)]
pub struct NewPatientRow {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl From<NewPatient> for NewPatientRow {
    fn from(p: NewPatient) -> Self {
        Self {
            first_name: p.first_name,
            last_name: p.last_name,
            date_of_birth: p.date_of_birth,
            gender: p.gender.map(|g| g.as_str().to_string()),
            phone: p.phone,
            email: p.email,
            address: p.address,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = patients)]
pub struct PatientChangesRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PatientChangesRow {
    pub fn new(c: PatientChanges, now: DateTime<Utc>) -> Self {
        Self {
            first_name: c.first_name,
            last_name: c.last_name,
            date_of_birth: c.date_of_birth,
            gender: c.gender.map(|g| g.as_str().to_string()),
            phone: c.phone,
            email: c.email,
            address: c.address,
            updated_at: now,
        }
    }
}

// ==================== Doctors ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DoctorRow {
    pub doctor_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DoctorRow> for Doctor {
    fn from(row: DoctorRow) -> Self {
        Doctor {
            id: DoctorId::new(row.doctor_id),
            first_name: row.first_name,
            last_name: row.last_name,
            specialization: row.specialization,
            phone: row.phone,
            email: row.email,
            location: row.location,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = doctors)]
pub struct NewDoctorRow {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_available: bool,
}

impl From<NewDoctor> for NewDoctorRow {
    fn from(d: NewDoctor) -> Self {
        Self {
            first_name: d.first_name,
            last_name: d.last_name,
            specialization: d.specialization,
            phone: d.phone,
            email: d.email,
            location: d.location,
            is_available: d.is_available,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = doctors)]
pub struct DoctorChangesRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_available: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl DoctorChangesRow {
    pub fn new(c: DoctorChanges, now: DateTime<Utc>) -> Self {
        Self {
            first_name: c.first_name,
            last_name: c.last_name,
            specialization: c.specialization,
            phone: c.phone,
            email: c.email,
            location: c.location,
            is_available: c.is_available,
            updated_at: now,
        }
    }
}

// ==================== Users ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> RepositoryResult<User> {
        Ok(User {
            id: UserId::new(self.user_id),
            role: parse_column("users", &self.role)?,
            username: self.username,
            email: self.email,
            full_name: self.full_name,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_active: bool,
}

impl From<NewUser> for NewUserRow {
    fn from(u: NewUser) -> Self {
        Self {
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            role: u.role.as_str().to_string(),
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChangesRow {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl UserChangesRow {
    pub fn new(c: UserChanges, now: DateTime<Utc>) -> Self {
        Self {
            email: c.email,
            full_name: c.full_name,
            role: c.role.map(|r| r.as_str().to_string()),
            is_active: c.is_active,
            updated_at: now,
        }
    }
}

// ==================== Appointments ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppointmentRow {
    pub appointment_id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_datetime: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentRow {
    pub fn into_appointment(self) -> RepositoryResult<Appointment> {
        Ok(Appointment {
            id: AppointmentId::new(self.appointment_id),
            patient_id: PatientId::new(self.patient_id),
            doctor_id: DoctorId::new(self.doctor_id),
            appointment_datetime: self.appointment_datetime,
            status: parse_column("appointments", &self.status)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointmentRow {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_datetime: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
}

impl From<NewAppointment> for NewAppointmentRow {
    fn from(a: NewAppointment) -> Self {
        Self {
            patient_id: a.patient_id.value(),
            doctor_id: a.doctor_id.value(),
            appointment_datetime: a.appointment_datetime,
            status: a.status.as_str().to_string(),
            notes: a.notes,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = appointments)]
pub struct AppointmentChangesRow {
    pub doctor_id: Option<i64>,
    pub appointment_datetime: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentChangesRow {
    pub fn new(c: AppointmentChanges, now: DateTime<Utc>) -> Self {
        Self {
            doctor_id: c.doctor_id.map(|d| d.value()),
            appointment_datetime: c.appointment_datetime,
            status: c.status.map(|s| s.as_str().to_string()),
            notes: c.notes,
            updated_at: now,
        }
    }
}

// ==================== Queue ====================

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = queue_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct QueueEntryRow {
    pub queue_entry_id: i64,
    pub patient_id: i64,
    pub queue_number: i32,
    pub epoch_key: String,
    pub status: String,
    pub priority: String,
    pub arrival_time: DateTime<Utc>,
    pub estimated_wait_time: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

impl QueueEntryRow {
    pub fn into_entry(self) -> RepositoryResult<QueueEntry> {
        Ok(QueueEntry {
            id: QueueEntryId::new(self.queue_entry_id),
            patient_id: PatientId::new(self.patient_id),
            queue_number: self.queue_number,
            epoch: QueueEpoch::new(self.epoch_key),
            status: parse_column("queue_entries", &self.status)?,
            priority: parse_column("queue_entries", &self.priority)?,
            arrival_time: self.arrival_time,
            estimated_wait_time: self.estimated_wait_time,
            updated_at: self.updated_at,
        })
    }

    /// Attach the patient's name as listed.
    pub fn into_view(self, first_name: &str, last_name: &str) -> RepositoryResult<QueueEntryView> {
        Ok(QueueEntryView {
            entry: self.into_entry()?,
            patient_name: format!("{} {}", first_name, last_name),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = queue_entries)]
pub struct NewQueueEntryRow {
    pub patient_id: i64,
    pub queue_number: i32,
    pub epoch_key: String,
    pub status: String,
    pub priority: String,
    pub arrival_time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = queue_entries)]
pub struct QueueEntryChangesRow {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_wait_time: Option<Option<i32>>,
    pub updated_at: DateTime<Utc>,
}

impl QueueEntryChangesRow {
    pub fn new(c: QueueEntryChanges, now: DateTime<Utc>) -> Self {
        Self {
            status: c.status.map(|s| s.as_str().to_string()),
            priority: c.priority.map(|p| p.as_str().to_string()),
            estimated_wait_time: c.estimated_wait_time,
            updated_at: now,
        }
    }
}
