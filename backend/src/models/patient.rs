use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::PatientId;

crate::define_text_enum!(
    /// Patient gender as recorded at registration.
    Gender {
        Male => "male",
        Female => "female",
        Other => "other",
    }
);

/// A registered patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Display name used by listings and name search.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated input for registering a patient.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl NewPatient {
    pub fn into_patient(self, id: PatientId, now: DateTime<Utc>) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            phone: self.phone,
            email: self.email,
            address: self.address,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl PatientChanges {
    pub fn apply_to(self, patient: &mut Patient, now: DateTime<Utc>) {
        if let Some(v) = self.first_name {
            patient.first_name = v;
        }
        if let Some(v) = self.last_name {
            patient.last_name = v;
        }
        if let Some(v) = self.date_of_birth {
            patient.date_of_birth = Some(v);
        }
        if let Some(v) = self.gender {
            patient.gender = Some(v);
        }
        if let Some(v) = self.phone {
            patient.phone = v;
        }
        if let Some(v) = self.email {
            patient.email = Some(v);
        }
        if let Some(v) = self.address {
            patient.address = Some(v);
        }
        patient.updated_at = now;
    }
}
