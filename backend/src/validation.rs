//! Request validation with field-level messages.
//!
//! Every `validate_*` function turns a loosely typed request DTO from
//! [`crate::api`] into a typed domain input, collecting all field problems
//! into one [`ValidationErrors`] instead of stopping at the first.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{
    AppointmentQuery, CreateAppointmentRequest, CreateDoctorRequest, CreatePatientRequest,
    CreateQueueEntryRequest, CreateUserRequest, DoctorQuery, PatientQuery, QueueQuery,
    UpdateAppointmentRequest, UpdateDoctorRequest, UpdatePatientRequest, UpdateQueueEntryRequest,
    UpdateUserRequest, UserQuery,
};
use crate::listing::{
    normalize_search, AppointmentFilter, DoctorFilter, PageRequest, PatientFilter, QueueFilter,
    UserFilter,
};
use crate::models::{
    AppointmentChanges, AppointmentStatus, DoctorChanges, DoctorId, Gender, NewAppointment,
    NewDoctor, NewPatient, NewQueueEntry, NewUser, PatientChanges, PatientId, QueueEntryChanges,
    QueuePriority, QueueStatus, UserChanges, UserRole,
};

const NAME_MAX: usize = 100;
const TEXT_MAX: usize = 255;
const NOTES_MAX: usize = 2000;
const MAX_WAIT_MINUTES: i64 = 24 * 60;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All problems found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when nothing was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

// ==================== Field checks ====================

fn required_text(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "must not be empty");
    } else if value.chars().count() > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
    value.to_string()
}

fn optional_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    if value.chars().count() > max {
        errors.add(field, format!("must be at most {} characters", max));
    }
    Some(value)
}

/// Like [`optional_text`] but an explicitly blank value is an error.
fn patch_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
    max: usize,
) -> Option<String> {
    value.map(|v| required_text(errors, field, &v, max))
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn email_value(errors: &mut ValidationErrors, field: &str, value: String) -> String {
    let value = value.trim().to_ascii_lowercase();
    if !is_valid_email(&value) {
        errors.add(field, "must be a valid email address");
    }
    value
}

fn optional_email(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    Some(email_value(errors, field, value))
}

fn phone_value(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'));
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if value.is_empty() {
        errors.add(field, "must not be empty");
    } else if !allowed || !(7..=15).contains(&digits) {
        errors.add(field, "must be a phone number with 7 to 15 digits");
    }
    value.to_string()
}

fn parse_enum<T: FromStr<Err = String>>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<String>,
) -> Option<T> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            errors.add(field, e);
            None
        }
    }
}

fn parse_date(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> Option<NaiveDate> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.add(field, "must be a date formatted as YYYY-MM-DD");
            None
        }
    }
}

fn birth_date(errors: &mut ValidationErrors, value: Option<String>) -> Option<NaiveDate> {
    let date = parse_date(errors, "date_of_birth", value)?;
    if date > Utc::now().date_naive() {
        errors.add("date_of_birth", "must not be in the future");
    }
    Some(date)
}

fn parse_datetime(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, "must not be empty");
        return None;
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            errors.add(field, "must be an RFC 3339 timestamp");
            None
        }
    }
}

fn positive_id(errors: &mut ValidationErrors, field: &str, value: i64) -> i64 {
    if value < 1 {
        errors.add(field, "must be a positive id");
    }
    value
}

fn username_value(errors: &mut ValidationErrors, value: &str) -> String {
    let value = value.trim().to_string();
    let len = value.chars().count();
    if !(3..=50).contains(&len) {
        errors.add("username", "must be between 3 and 50 characters");
    } else if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        errors.add("username", "may only contain letters, digits, '_', '.' and '-'");
    }
    value
}

fn require_some_field(errors: &mut ValidationErrors, any_present: bool) {
    if !any_present {
        errors.add("body", "at least one field must be provided");
    }
}

// ==================== Patients ====================

pub fn validate_create_patient(req: CreatePatientRequest) -> Result<NewPatient, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let patient = NewPatient {
        first_name: required_text(&mut errors, "first_name", &req.first_name, NAME_MAX),
        last_name: required_text(&mut errors, "last_name", &req.last_name, NAME_MAX),
        date_of_birth: birth_date(&mut errors, req.date_of_birth),
        gender: parse_enum::<Gender>(&mut errors, "gender", req.gender),
        phone: phone_value(&mut errors, "phone", &req.phone),
        email: optional_email(&mut errors, "email", req.email),
        address: optional_text(&mut errors, "address", req.address, TEXT_MAX),
    };
    errors.into_result(patient)
}

pub fn validate_update_patient(req: UpdatePatientRequest) -> Result<PatientChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = PatientChanges {
        first_name: patch_text(&mut errors, "first_name", req.first_name, NAME_MAX),
        last_name: patch_text(&mut errors, "last_name", req.last_name, NAME_MAX),
        date_of_birth: birth_date(&mut errors, req.date_of_birth),
        gender: parse_enum::<Gender>(&mut errors, "gender", req.gender),
        phone: req.phone.map(|p| phone_value(&mut errors, "phone", &p)),
        email: optional_email(&mut errors, "email", req.email),
        address: optional_text(&mut errors, "address", req.address, TEXT_MAX),
    };
    require_some_field(&mut errors, changes != PatientChanges::default());
    errors.into_result(changes)
}

pub fn validate_patient_query(
    query: PatientQuery,
) -> Result<(PatientFilter, PageRequest), ValidationErrors> {
    let page = PageRequest::from_params(query.page, query.limit)?;
    Ok((
        PatientFilter {
            search: normalize_search(query.search),
        },
        page,
    ))
}

// ==================== Doctors ====================

pub fn validate_create_doctor(req: CreateDoctorRequest) -> Result<NewDoctor, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let doctor = NewDoctor {
        first_name: required_text(&mut errors, "first_name", &req.first_name, NAME_MAX),
        last_name: required_text(&mut errors, "last_name", &req.last_name, NAME_MAX),
        specialization: required_text(&mut errors, "specialization", &req.specialization, NAME_MAX),
        phone: phone_value(&mut errors, "phone", &req.phone),
        email: optional_email(&mut errors, "email", req.email),
        location: optional_text(&mut errors, "location", req.location, TEXT_MAX),
        is_available: req.is_available.unwrap_or(true),
    };
    errors.into_result(doctor)
}

pub fn validate_update_doctor(req: UpdateDoctorRequest) -> Result<DoctorChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = DoctorChanges {
        first_name: patch_text(&mut errors, "first_name", req.first_name, NAME_MAX),
        last_name: patch_text(&mut errors, "last_name", req.last_name, NAME_MAX),
        specialization: patch_text(&mut errors, "specialization", req.specialization, NAME_MAX),
        phone: req.phone.map(|p| phone_value(&mut errors, "phone", &p)),
        email: optional_email(&mut errors, "email", req.email),
        location: optional_text(&mut errors, "location", req.location, TEXT_MAX),
        is_available: req.is_available,
    };
    require_some_field(&mut errors, changes != DoctorChanges::default());
    errors.into_result(changes)
}

pub fn validate_doctor_query(
    query: DoctorQuery,
) -> Result<(DoctorFilter, PageRequest), ValidationErrors> {
    let page = PageRequest::from_params(query.page, query.limit)?;
    Ok((
        DoctorFilter {
            search: normalize_search(query.search),
            specialization: normalize_search(query.specialization),
            available: query.available,
        },
        page,
    ))
}

// ==================== Users ====================

pub fn validate_create_user(req: CreateUserRequest) -> Result<NewUser, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let user = NewUser {
        username: username_value(&mut errors, &req.username),
        email: email_value(&mut errors, "email", req.email),
        full_name: required_text(&mut errors, "full_name", &req.full_name, NAME_MAX),
        role: parse_enum::<UserRole>(&mut errors, "role", req.role).unwrap_or_default(),
        is_active: req.is_active.unwrap_or(true),
    };
    errors.into_result(user)
}

pub fn validate_update_user(req: UpdateUserRequest) -> Result<UserChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = UserChanges {
        email: req.email.map(|e| email_value(&mut errors, "email", e)),
        full_name: patch_text(&mut errors, "full_name", req.full_name, NAME_MAX),
        role: parse_enum::<UserRole>(&mut errors, "role", req.role),
        is_active: req.is_active,
    };
    require_some_field(&mut errors, changes != UserChanges::default());
    errors.into_result(changes)
}

pub fn validate_user_query(query: UserQuery) -> Result<(UserFilter, PageRequest), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let page = PageRequest::from_params(query.page, query.limit).unwrap_or_else(|e| {
        errors.extend(e);
        PageRequest::default()
    });
    let filter = UserFilter {
        search: normalize_search(query.search),
        role: parse_enum::<UserRole>(&mut errors, "role", query.role),
        active: query.active,
    };
    errors.into_result((filter, page))
}

// ==================== Appointments ====================

pub fn validate_create_appointment(
    req: CreateAppointmentRequest,
) -> Result<NewAppointment, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let patient_id = positive_id(&mut errors, "patient_id", req.patient_id);
    let doctor_id = positive_id(&mut errors, "doctor_id", req.doctor_id);
    let when = parse_datetime(&mut errors, "appointment_datetime", &req.appointment_datetime);
    let status = parse_enum::<AppointmentStatus>(&mut errors, "status", req.status);
    let notes = optional_text(&mut errors, "notes", req.notes, NOTES_MAX);

    match when {
        Some(appointment_datetime) if errors.is_empty() => Ok(NewAppointment {
            patient_id: PatientId::new(patient_id),
            doctor_id: DoctorId::new(doctor_id),
            appointment_datetime,
            status: status.unwrap_or_default(),
            notes,
        }),
        _ => Err(errors),
    }
}

pub fn validate_update_appointment(
    req: UpdateAppointmentRequest,
) -> Result<AppointmentChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let changes = AppointmentChanges {
        doctor_id: req
            .doctor_id
            .map(|id| DoctorId::new(positive_id(&mut errors, "doctor_id", id))),
        appointment_datetime: req
            .appointment_datetime
            .and_then(|v| parse_datetime(&mut errors, "appointment_datetime", &v)),
        status: parse_enum::<AppointmentStatus>(&mut errors, "status", req.status),
        notes: optional_text(&mut errors, "notes", req.notes, NOTES_MAX),
    };
    if errors.is_empty() {
        require_some_field(&mut errors, changes != AppointmentChanges::default());
    }
    errors.into_result(changes)
}

pub fn validate_appointment_query(
    query: AppointmentQuery,
) -> Result<(AppointmentFilter, PageRequest), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let page = PageRequest::from_params(query.page, query.limit).unwrap_or_else(|e| {
        errors.extend(e);
        PageRequest::default()
    });
    let filter = AppointmentFilter {
        status: parse_enum::<AppointmentStatus>(&mut errors, "status", query.status),
        patient_id: query
            .patient_id
            .map(|id| PatientId::new(positive_id(&mut errors, "patient_id", id))),
        doctor_id: query
            .doctor_id
            .map(|id| DoctorId::new(positive_id(&mut errors, "doctor_id", id))),
        date: parse_date(&mut errors, "date", query.date),
        search: normalize_search(query.search),
    };
    errors.into_result((filter, page))
}

// ==================== Queue ====================

pub fn validate_check_in(req: CreateQueueEntryRequest) -> Result<NewQueueEntry, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let patient_id = positive_id(&mut errors, "patient_id", req.patient_id);
    let priority = parse_enum::<QueuePriority>(&mut errors, "priority", req.priority);
    errors.into_result(NewQueueEntry {
        patient_id: PatientId::new(patient_id),
        priority: priority.unwrap_or_default(),
    })
}

pub fn validate_update_queue_entry(
    req: UpdateQueueEntryRequest,
) -> Result<QueueEntryChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let estimated_wait_time = match req.estimated_wait_time {
        Some(Some(m)) if (0..=MAX_WAIT_MINUTES).contains(&m) => Some(Some(m as i32)),
        Some(None) => Some(None),
        Some(Some(_)) => {
            errors.add(
                "estimated_wait_time",
                format!("must be between 0 and {} minutes", MAX_WAIT_MINUTES),
            );
            None
        }
        None => None,
    };
    let changes = QueueEntryChanges {
        status: parse_enum::<QueueStatus>(&mut errors, "status", req.status),
        priority: parse_enum::<QueuePriority>(&mut errors, "priority", req.priority),
        estimated_wait_time,
    };
    if errors.is_empty() {
        require_some_field(&mut errors, changes != QueueEntryChanges::default());
    }
    errors.into_result(changes)
}

pub fn validate_queue_status(status: &str) -> Result<QueueStatus, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match parse_enum::<QueueStatus>(&mut errors, "status", Some(status.to_string())) {
        Some(s) => Ok(s),
        None if errors.is_empty() => Err(ValidationErrors::single("status", "must not be empty")),
        None => Err(errors),
    }
}

pub fn validate_queue_priority(priority: &str) -> Result<QueuePriority, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match parse_enum::<QueuePriority>(&mut errors, "priority", Some(priority.to_string())) {
        Some(p) => Ok(p),
        None if errors.is_empty() => Err(ValidationErrors::single("priority", "must not be empty")),
        None => Err(errors),
    }
}

pub fn validate_queue_query(query: QueueQuery) -> Result<(QueueFilter, PageRequest), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let page = PageRequest::from_params(query.page, query.limit).unwrap_or_else(|e| {
        errors.extend(e);
        PageRequest::default()
    });
    let filter = QueueFilter {
        status: parse_enum::<QueueStatus>(&mut errors, "status", query.status),
        priority: parse_enum::<QueuePriority>(&mut errors, "priority", query.priority),
        search: normalize_search(query.search),
    };
    errors.into_result((filter, page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_request() -> CreatePatientRequest {
        CreatePatientRequest {
            first_name: "  Grace ".into(),
            last_name: "Hopper".into(),
            date_of_birth: Some("1906-12-09".into()),
            gender: Some("Female".into()),
            phone: "+1 (555) 010-2030".into(),
            email: Some("Grace@Example.org".into()),
            address: Some("  ".into()),
        }
    }

    #[test]
    fn test_valid_patient_is_normalized() {
        let patient = validate_create_patient(patient_request()).unwrap();
        assert_eq!(patient.first_name, "Grace");
        assert_eq!(patient.gender, Some(Gender::Female));
        assert_eq!(patient.email.as_deref(), Some("grace@example.org"));
        assert_eq!(patient.address, None);
        assert_eq!(
            patient.date_of_birth,
            NaiveDate::from_ymd_opt(1906, 12, 9)
        );
    }

    #[test]
    fn test_patient_reports_every_bad_field() {
        let req = CreatePatientRequest {
            first_name: "".into(),
            last_name: "x".repeat(NAME_MAX + 1),
            date_of_birth: Some("09/12/1906".into()),
            gender: Some("robot".into()),
            phone: "call me".into(),
            email: Some("not-an-email".into()),
            address: None,
        };
        let err = validate_create_patient(req).unwrap_err();
        for field in ["first_name", "last_name", "date_of_birth", "gender", "phone", "email"] {
            assert!(err.has_field(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_future_birth_date_rejected() {
        let mut req = patient_request();
        req.date_of_birth = Some("2999-01-01".into());
        let err = validate_create_patient(req).unwrap_err();
        assert!(err.has_field("date_of_birth"));
    }

    #[test]
    fn test_empty_patch_rejected() {
        let err = validate_update_patient(UpdatePatientRequest::default()).unwrap_err();
        assert!(err.has_field("body"));
    }

    #[test]
    fn test_patch_blank_name_rejected() {
        let err = validate_update_patient(UpdatePatientRequest {
            first_name: Some("   ".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.has_field("first_name"));
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@.co"));
    }

    #[test]
    fn test_user_defaults_and_username_rules() {
        let user = validate_create_user(CreateUserRequest {
            username: "front.desk-1".into(),
            email: "desk@clinic.test".into(),
            full_name: "Front Desk".into(),
            role: None,
            is_active: None,
        })
        .unwrap();
        assert_eq!(user.role, UserRole::Staff);
        assert!(user.is_active);

        let err = validate_create_user(CreateUserRequest {
            username: "no spaces".into(),
            email: "desk@clinic.test".into(),
            full_name: "Front Desk".into(),
            role: Some("root".into()),
            is_active: None,
        })
        .unwrap_err();
        assert!(err.has_field("username"));
        assert!(err.has_field("role"));
    }

    #[test]
    fn test_appointment_requires_rfc3339() {
        let err = validate_create_appointment(CreateAppointmentRequest {
            patient_id: 1,
            doctor_id: 2,
            appointment_datetime: "tomorrow at noon".into(),
            status: None,
            notes: None,
        })
        .unwrap_err();
        assert!(err.has_field("appointment_datetime"));

        let ok = validate_create_appointment(CreateAppointmentRequest {
            patient_id: 1,
            doctor_id: 2,
            appointment_datetime: "2026-10-20T09:30:00+02:00".into(),
            status: None,
            notes: Some("follow-up".into()),
        })
        .unwrap();
        assert_eq!(ok.status, AppointmentStatus::Booked);
        assert_eq!(ok.appointment_datetime.to_rfc3339(), "2026-10-20T07:30:00+00:00");
    }

    #[test]
    fn test_appointment_ids_must_be_positive() {
        let err = validate_create_appointment(CreateAppointmentRequest {
            patient_id: 0,
            doctor_id: -4,
            appointment_datetime: "2026-10-20T09:30:00Z".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.has_field("patient_id"));
        assert!(err.has_field("doctor_id"));
    }

    #[test]
    fn test_check_in_defaults_to_normal() {
        let entry = validate_check_in(CreateQueueEntryRequest {
            patient_id: 3,
            priority: None,
        })
        .unwrap();
        assert_eq!(entry.priority, QueuePriority::Normal);
    }

    #[test]
    fn test_queue_update_bounds_wait_time() {
        let err = validate_update_queue_entry(UpdateQueueEntryRequest {
            estimated_wait_time: Some(Some(-5)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.has_field("estimated_wait_time"));
        assert!(!err.has_field("body"));
    }

    #[test]
    fn test_queue_update_null_wait_time_clears() {
        let changes = validate_update_queue_entry(UpdateQueueEntryRequest {
            estimated_wait_time: Some(None),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.estimated_wait_time, Some(None));

        let req: UpdateQueueEntryRequest =
            serde_json::from_str(r#"{"estimated_wait_time": null}"#).unwrap();
        assert_eq!(req.estimated_wait_time, Some(None));
        let req: UpdateQueueEntryRequest = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(req.estimated_wait_time, None);
    }

    #[test]
    fn test_queue_query_defaults_and_errors() {
        let (filter, page) = validate_queue_query(QueueQuery {
            status: Some("waiting".into()),
            search: Some(" ann ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(filter.status, Some(QueueStatus::Waiting));
        assert_eq!(filter.search.as_deref(), Some("ann"));
        assert_eq!(page, PageRequest::default());

        let err = validate_queue_query(QueueQuery {
            page: Some(0),
            priority: Some("critical".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(err.has_field("page"));
        assert!(err.has_field("priority"));
    }

    #[test]
    fn test_queue_status_single_value() {
        assert_eq!(validate_queue_status("with_doctor").unwrap(), QueueStatus::WithDoctor);
        assert!(validate_queue_status("").unwrap_err().has_field("status"));
        assert!(validate_queue_priority("asap").unwrap_err().has_field("priority"));
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("a", "bad");
        errors.add("b", "worse");
        assert_eq!(errors.to_string(), "a: bad; b: worse");
    }
}
