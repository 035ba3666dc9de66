use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::DoctorId;

/// A doctor taking appointments and walk-in patients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
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

impl Doctor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated input for adding a doctor.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_available: bool,
}

impl NewDoctor {
    pub fn into_doctor(self, id: DoctorId, now: DateTime<Utc>) -> Doctor {
        Doctor {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            specialization: self.specialization,
            phone: self.phone,
            email: self.email,
            location: self.location,
            is_available: self.is_available,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub is_available: Option<bool>,
}

impl DoctorChanges {
    pub fn apply_to(self, doctor: &mut Doctor, now: DateTime<Utc>) {
        if let Some(v) = self.first_name {
            doctor.first_name = v;
        }
        if let Some(v) = self.last_name {
            doctor.last_name = v;
        }
        if let Some(v) = self.specialization {
            doctor.specialization = v;
        }
        if let Some(v) = self.phone {
            doctor.phone = v;
        }
        if let Some(v) = self.email {
            doctor.email = Some(v);
        }
        if let Some(v) = self.location {
            doctor.location = Some(v);
        }
        if let Some(v) = self.is_available {
            doctor.is_available = v;
        }
        doctor.updated_at = now;
    }
}
