//! Tests for db::factory and repository.toml handling.

mod support;

use std::io::Write;
use std::str::FromStr;

use chrono::{TimeZone, Utc};
use tempfile::NamedTempFile;

use clinic_desk::db::factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
use clinic_desk::db::repo_config::RepositoryConfig;
use clinic_desk::db::repository::{HealthRepository, PatientRepository, QueueRepository};
use clinic_desk::models::{NewPatient, NewQueueEntry, QueuePriority};
use clinic_desk::queue::EpochPolicy;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("postgres").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("PG").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("Local").unwrap(), RepositoryType::Local);

    let result = RepositoryType::from_str("sqlite");
    assert!(result.unwrap_err().contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_clinic_env(&[], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local)
    });
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_clinic_env(&[("DATABASE_URL", "postgres://localhost/clinic")], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres)
    });
}

#[test]
fn test_repository_type_explicit_wins_over_database_url() {
    support::with_clinic_env(
        &[
            ("REPOSITORY_TYPE", "local"),
            ("DATABASE_URL", "postgres://localhost/clinic"),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_epoch_policy_from_env() {
    support::with_clinic_env(&[("QUEUE_EPOCH", "continuous")], || {
        assert_eq!(EpochPolicy::from_env().unwrap(), EpochPolicy::Continuous)
    });
    support::with_clinic_env(&[("QUEUE_UTC_OFFSET_MINUTES", "-300")], || {
        assert_eq!(
            EpochPolicy::from_env().unwrap(),
            EpochPolicy::Daily {
                utc_offset_minutes: -300
            }
        )
    });
    support::with_clinic_env(&[("QUEUE_UTC_OFFSET_MINUTES", "soon")], || {
        assert!(EpochPolicy::from_env().is_err())
    });
}

#[test]
fn test_epoch_policy_rejects_extreme_offsets() {
    for offset in ["-2147483648", "2147483647", "1440"] {
        support::with_clinic_env(&[("QUEUE_UTC_OFFSET_MINUTES", offset)], || {
            let err = EpochPolicy::from_env().unwrap_err();
            assert!(err.contains("UTC offset"), "{}", err);
        });
    }
}

#[test]
fn test_config_file_rejects_min_offset() {
    let file = write_config(
        r#"
[repository]
type = "local"

[queue]
epoch = "daily"
utc_offset_minutes = -2147483648
"#,
    );
    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert!(config.epoch_policy().is_err());
}

#[test]
fn test_daily_epoch_uses_local_day() {
    let policy = EpochPolicy::Daily {
        utc_offset_minutes: -300,
    };
    // 03:00 UTC is still the previous evening at UTC-5.
    let at = Utc.with_ymd_and_hms(2026, 10, 19, 3, 0, 0).unwrap();
    assert_eq!(policy.epoch_for(at).as_str(), "2026-10-18");
}

#[tokio::test]
async fn test_create_local_via_factory() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[cfg(feature = "postgres-repo")]
#[tokio::test]
async fn test_create_postgres_without_config_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("requires PostgresConfig"));
}

#[test]
fn test_config_file_parses_queue_section() {
    let file = write_config(
        r#"
[repository]
type = "local"

[queue]
epoch = "continuous"
"#,
    );
    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    assert_eq!(config.epoch_policy().unwrap(), EpochPolicy::Continuous);
}

#[test]
fn test_config_file_missing_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = RepositoryConfig::from_file(dir.path().join("repository.toml"));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_factory_from_config_file_applies_epoch() {
    let file = write_config(
        r#"
[repository]
type = "local"

[queue]
epoch = "continuous"
"#,
    );
    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();

    let patient = repo
        .create_patient(NewPatient {
            first_name: "Ana".to_string(),
            last_name: "Diaz".to_string(),
            date_of_birth: None,
            gender: None,
            phone: "555-0100".to_string(),
            email: None,
            address: None,
        })
        .await
        .unwrap();
    let view = repo
        .check_in(
            NewQueueEntry {
                patient_id: patient.id,
                priority: QueuePriority::Normal,
            },
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(view.entry.epoch.as_str(), "all");
}

#[tokio::test]
async fn test_factory_rejects_bad_queue_epoch() {
    let file = write_config(
        r#"
[repository]
type = "local"

[queue]
epoch = "weekly"
"#,
    );
    let result = RepositoryFactory::from_config_file(file.path()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_builder_builds_local() {
    let repo = RepositoryBuilder::new()
        .repository_type(RepositoryType::Local)
        .epoch_policy(EpochPolicy::Continuous)
        .build()
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}
