//! Storage for the clinic front desk.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (REST API, binaries)                 │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Check-in timestamps                                  │
//! │  - Queue listing: filter → rank → paginate              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴──────────────┐
//!     │  Local (in-memory)           │  Postgres (Diesel)
//!     └──────────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use clinic_desk::db::{services, RepositoryFactory};
//! use clinic_desk::models::{NewQueueEntry, PatientId, QueuePriority};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env().await?;
//!     let entry = NewQueueEntry { patient_id: PatientId::new(1), priority: QueuePriority::Urgent };
//!     let view = services::check_in(repo.as_ref(), entry).await?;
//!     println!("Queue number {}", view.entry.queue_number);
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

// ==================== Service Layer ====================

pub use services::health_check;

// ==================== Repository Pattern Exports ====================

pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AppointmentRepository, DoctorRepository, ErrorContext, FullRepository, HealthRepository,
    PatientRepository, QueueRepository, RepositoryError, RepositoryResult, UserRepository,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// `REPOSITORY_CONFIG` names a repository.toml to load; otherwise the
/// environment decides (see [`RepositoryFactory::from_env`]).
async fn create_selected_repository() -> RepositoryResult<Arc<dyn FullRepository>> {
    match std::env::var("REPOSITORY_CONFIG") {
        Ok(path) => {
            log::info!("Loading repository configuration from {}", path);
            RepositoryFactory::from_config_file(path).await
        }
        Err(_) => RepositoryFactory::from_env().await,
    }
}

/// Initialize the global repository singleton for the selected backend.
///
/// Calling it again returns the instance created by the first call.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let repo = create_selected_repository()
        .await
        .map_err(|e| anyhow::Error::msg(e.to_string()))
        .context("Failed to initialize repository")?;
    Ok(REPOSITORY.get_or_init(|| repo))
}
