//! Typed list filters.
//!
//! The local repository evaluates these with the `matches` methods; the
//! Postgres repository translates the same fields into SQL predicates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    Appointment, AppointmentStatus, Doctor, DoctorId, Patient, PatientId, QueueEntryView,
    QueuePriority, QueueStatus, User, UserRole,
};

/// Trim a search term and drop it when blank.
pub fn normalize_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// SQL `ILIKE` pattern for a substring search, with wildcards escaped.
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientFilter {
    /// Matches full name, phone or email.
    pub search: Option<String>,
}

impl PatientFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                contains_ignore_case(&patient.full_name(), term)
                    || contains_ignore_case(&patient.phone, term)
                    || patient
                        .email
                        .as_deref()
                        .is_some_and(|e| contains_ignore_case(e, term))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilter {
    pub search: Option<String>,
    pub specialization: Option<String>,
    pub available: Option<bool>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        if let Some(term) = &self.search {
            if !contains_ignore_case(&doctor.full_name(), term) {
                return false;
            }
        }
        if let Some(spec) = &self.specialization {
            if !doctor.specialization.eq_ignore_ascii_case(spec) {
                return false;
            }
        }
        if let Some(available) = self.available {
            if doctor.is_available != available {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(term) = &self.search {
            let hit = contains_ignore_case(&user.username, term)
                || contains_ignore_case(&user.full_name, term)
                || contains_ignore_case(&user.email, term);
            if !hit {
                return false;
            }
        }
        if self.role.is_some_and(|r| r != user.role) {
            return false;
        }
        if self.active.is_some_and(|a| a != user.is_active) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    /// Calendar day (UTC) of the appointment.
    pub date: Option<NaiveDate>,
    /// Matches the patient's full name.
    pub search: Option<String>,
}

impl AppointmentFilter {
    /// `patient_name` is the full name of the appointment's patient.
    pub fn matches(&self, appointment: &Appointment, patient_name: &str) -> bool {
        if self.status.is_some_and(|s| s != appointment.status) {
            return false;
        }
        if self.patient_id.is_some_and(|p| p != appointment.patient_id) {
            return false;
        }
        if self.doctor_id.is_some_and(|d| d != appointment.doctor_id) {
            return false;
        }
        if self
            .date
            .is_some_and(|d| d != appointment.appointment_datetime.date_naive())
        {
            return false;
        }
        match &self.search {
            Some(term) => contains_ignore_case(patient_name, term),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueFilter {
    pub status: Option<QueueStatus>,
    pub priority: Option<QueuePriority>,
    /// Matches the patient's full name.
    pub search: Option<String>,
}

impl QueueFilter {
    pub fn matches(&self, view: &QueueEntryView) -> bool {
        if self.status.is_some_and(|s| s != view.entry.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != view.entry.priority) {
            return false;
        }
        match &self.search {
            Some(term) => contains_ignore_case(&view.patient_name, term),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_search() {
        assert_eq!(normalize_search(Some("  ann ".into())), Some("ann".into()));
        assert_eq!(normalize_search(Some("   ".into())), None);
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Maria Gonzalez", "GONZ"));
        assert!(contains_ignore_case("Maria Gonzalez", "a g"));
        assert!(!contains_ignore_case("Maria Gonzalez", "lopez"));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ann"), "%ann%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
