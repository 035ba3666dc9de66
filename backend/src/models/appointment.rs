use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AppointmentId, DoctorId, PatientId};

crate::define_text_enum!(
    /// Appointment lifecycle.
    AppointmentStatus {
        Booked => "booked",
        Completed => "completed",
        Canceled => "canceled",
    }
);

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Booked
    }
}

/// A booked visit of a patient with a doctor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_datetime: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_datetime: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: AppointmentId, now: DateTime<Utc>) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_datetime: self.appointment_datetime,
            status: self.status,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentChanges {
    pub doctor_id: Option<DoctorId>,
    pub appointment_datetime: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl AppointmentChanges {
    pub fn apply_to(self, appointment: &mut Appointment, now: DateTime<Utc>) {
        if let Some(v) = self.doctor_id {
            appointment.doctor_id = v;
        }
        if let Some(v) = self.appointment_datetime {
            appointment.appointment_datetime = v;
        }
        if let Some(v) = self.status {
            appointment.status = v;
        }
        if let Some(v) = self.notes {
            appointment.notes = Some(v);
        }
        appointment.updated_at = now;
    }
}
