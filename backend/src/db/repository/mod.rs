//! Repository trait definitions for database operations.
//!
//! One focused trait per aggregate keeps implementations testable:
//!
//! - [`error`]: Error types for repository operations
//! - [`patient`]: Patient registration records
//! - [`doctor`]: Doctors and their availability
//! - [`user`]: Front-desk staff accounts
//! - [`appointment`]: Booked visits
//! - [`queue`]: Walk-in queue entries and queue number allocation
//!
//! # Convenience Trait Bound
//!
//! Services that need everything take a [`FullRepository`]:
//!
//! ```ignore
//! async fn check_in<R: FullRepository + ?Sized>(repo: &R, entry: NewQueueEntry) -> RepositoryResult<()> {
//!     repo.get_patient(entry.patient_id).await?;
//!     repo.check_in(entry, Utc::now()).await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

pub mod appointment;
pub mod doctor;
pub mod error;
pub mod patient;
pub mod queue;
pub mod user;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use appointment::AppointmentRepository;
pub use doctor::DoctorRepository;
pub use patient::PatientRepository;
pub use queue::QueueRepository;
pub use user::UserRepository;

/// Connectivity probe shared by every backend.
#[async_trait]
pub trait HealthRepository: Send + Sync {
    /// `Ok(true)` when the store answers queries.
    async fn health_check(&self) -> RepositoryResult<bool>;
}

/// Composite trait bound for a complete repository implementation.
///
/// Implemented automatically for any type that implements every
/// repository trait.
pub trait FullRepository:
    HealthRepository
    + PatientRepository
    + DoctorRepository
    + UserRepository
    + AppointmentRepository
    + QueueRepository
{
}

impl<T> FullRepository for T where
    T: HealthRepository
        + PatientRepository
        + DoctorRepository
        + UserRepository
        + AppointmentRepository
        + QueueRepository
{
}
