//! Filtering and pagination shared by all list endpoints.

pub mod filters;
pub mod pagination;

pub use filters::{
    contains_ignore_case, like_pattern, normalize_search, AppointmentFilter, DoctorFilter,
    PatientFilter, QueueFilter, UserFilter,
};
pub use pagination::{Page, PageRequest, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT};
