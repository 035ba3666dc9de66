//! Postgres repository implementation using Diesel.
//!
//! This module implements the repository traits against a Postgres database.
//! The schema lives in `migrations/` and is applied on startup.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//! - Queue numbers allocated from a per-epoch counter row in the same
//!   transaction as the entry insert
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
//! - `QUEUE_EPOCH` / `QUEUE_UTC_OFFSET_MINUTES`: queue numbering epoch

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Bool, Nullable, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repository::*;
use crate::listing::{
    like_pattern, AppointmentFilter, DoctorFilter, Page, PageRequest, PatientFilter, QueueFilter,
    UserFilter,
};
use crate::models::*;
use crate::queue::EpochPolicy;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

diesel::define_sql_function!(fn concat_ws(sep: Text, a: Text, b: Text) -> Text);
diesel::define_sql_function!(fn coalesce(value: Nullable<Text>, fallback: Text) -> Text);
diesel::define_sql_function!(fn lower(value: Text) -> Text);

type Predicate<T> = Box<dyn BoxableExpression<T, Pg, SqlType = Bool>>;

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
    /// When queue numbers restart
    pub epoch_policy: EpochPolicy,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
            epoch_policy: EpochPolicy::default(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    /// - `PG_MAX_RETRIES`: Maximum retry attempts (default: 3)
    /// - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)
    /// - `QUEUE_EPOCH`: `daily` (default) or `continuous`
    /// - `QUEUE_UTC_OFFSET_MINUTES`: clinic offset for daily epochs (default: 0)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", 10),
            min_pool_size: env_or("PG_POOL_MIN", 1),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: env_or("PG_MAX_RETRIES", 3),
            retry_delay_ms: env_or("PG_RETRY_DELAY_MS", 100),
            epoch_policy: EpochPolicy::from_env()?,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Execute a database operation with automatic retry for transient failures.
    ///
    /// This method will retry the operation up to `max_retries` times if a
    /// retryable error occurs (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }
                };

                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        log::warn!("Retrying after transient database error: {}", e);
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

/// A duplicate `(epoch_key, queue_number)` means a concurrent allocation
/// raced this one; the whole transaction can safely run again.
fn retry_on_conflict(err: RepositoryError) -> RepositoryError {
    match err {
        RepositoryError::ConflictError { message, context } => RepositoryError::ConflictError {
            message,
            context: context.retryable(),
        }
        .with_operation("check_in"),
        other => other,
    }
}

fn page_of<T>(items: Vec<T>, total: i64, page: PageRequest) -> Page<T> {
    Page::new(items, total.max(0) as u64, page)
}

fn ensure_patient(
    conn: &mut PgConnection,
    operation: &str,
    id: PatientId,
) -> RepositoryResult<()> {
    let found = patients::table
        .find(id.value())
        .select(patients::patient_id)
        .first::<i64>(conn)
        .optional()
        .map_err(map_diesel_error)?;
    found
        .map(|_| ())
        .ok_or_else(|| RepositoryError::missing(operation, "patient", id))
}

fn ensure_doctor(conn: &mut PgConnection, operation: &str, id: DoctorId) -> RepositoryResult<()> {
    let found = doctors::table
        .find(id.value())
        .select(doctors::doctor_id)
        .first::<i64>(conn)
        .optional()
        .map_err(map_diesel_error)?;
    found
        .map(|_| ())
        .ok_or_else(|| RepositoryError::missing(operation, "doctor", id))
}

fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));
    (start, start + ChronoDuration::days(1))
}

fn patient_predicates(filter: &PatientFilter) -> Vec<Predicate<patients::table>> {
    let mut preds: Vec<Predicate<patients::table>> = Vec::new();
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        preds.push(Box::new(
            concat_ws(" ", patients::first_name, patients::last_name)
                .ilike(pattern.clone())
                .or(patients::phone.ilike(pattern.clone()))
                .or(coalesce(patients::email, "").ilike(pattern)),
        ));
    }
    preds
}

fn doctor_predicates(filter: &DoctorFilter) -> Vec<Predicate<doctors::table>> {
    let mut preds: Vec<Predicate<doctors::table>> = Vec::new();
    if let Some(term) = &filter.search {
        preds.push(Box::new(
            concat_ws(" ", doctors::first_name, doctors::last_name).ilike(like_pattern(term)),
        ));
    }
    if let Some(spec) = &filter.specialization {
        preds.push(Box::new(lower(doctors::specialization).eq(spec.to_lowercase())));
    }
    if let Some(available) = filter.available {
        preds.push(Box::new(doctors::is_available.eq(available)));
    }
    preds
}

fn user_predicates(filter: &UserFilter) -> Vec<Predicate<users::table>> {
    let mut preds: Vec<Predicate<users::table>> = Vec::new();
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        preds.push(Box::new(
            users::username
                .ilike(pattern.clone())
                .or(users::full_name.ilike(pattern.clone()))
                .or(users::email.ilike(pattern)),
        ));
    }
    if let Some(role) = filter.role {
        preds.push(Box::new(users::role.eq(role.as_str())));
    }
    if let Some(active) = filter.active {
        preds.push(Box::new(users::is_active.eq(active)));
    }
    preds
}

fn appointment_predicates(filter: &AppointmentFilter) -> Vec<Predicate<appointments::table>> {
    let mut preds: Vec<Predicate<appointments::table>> = Vec::new();
    if let Some(status) = filter.status {
        preds.push(Box::new(appointments::status.eq(status.as_str())));
    }
    if let Some(patient_id) = filter.patient_id {
        preds.push(Box::new(appointments::patient_id.eq(patient_id.value())));
    }
    if let Some(doctor_id) = filter.doctor_id {
        preds.push(Box::new(appointments::doctor_id.eq(doctor_id.value())));
    }
    if let Some(day) = filter.date {
        let (start, end) = day_bounds(day);
        preds.push(Box::new(
            appointments::appointment_datetime
                .ge(start)
                .and(appointments::appointment_datetime.lt(end)),
        ));
    }
    if let Some(term) = &filter.search {
        let name = concat_ws(" ", patients::first_name, patients::last_name);
        let matching_patients = patients::table
            .filter(name.ilike(like_pattern(term)))
            .select(patients::patient_id);
        preds.push(Box::new(appointments::patient_id.eq_any(matching_patients)));
    }
    preds
}

fn load_queue_view(
    conn: &mut PgConnection,
    id: QueueEntryId,
) -> RepositoryResult<QueueEntryView> {
    let row = queue_entries::table
        .inner_join(patients::table)
        .filter(queue_entries::queue_entry_id.eq(id.value()))
        .select((
            QueueEntryRow::as_select(),
            patients::first_name,
            patients::last_name,
        ))
        .first::<(QueueEntryRow, String, String)>(conn)
        .optional()
        .map_err(map_diesel_error)?;
    let (entry, first, last) =
        row.ok_or_else(|| RepositoryError::missing("get_queue_entry", "queue_entry", id))?;
    entry.into_view(&first, &last)
}

// ==================== Health ====================

#[async_trait]
impl HealthRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }
}

// ==================== Patients ====================

#[async_trait]
impl PatientRepository for PostgresRepository {
    async fn create_patient(&self, patient: NewPatient) -> RepositoryResult<Patient> {
        let row = NewPatientRow::from(patient);
        self.with_conn(move |conn| {
            diesel::insert_into(patients::table)
                .values(&row)
                .returning(PatientRow::as_returning())
                .get_result::<PatientRow>(conn)
                .map_err(map_diesel_error)?
                .into_patient()
        })
        .await
    }

    async fn get_patient(&self, id: PatientId) -> RepositoryResult<Patient> {
        self.with_conn(move |conn| {
            patients::table
                .find(id.value())
                .select(PatientRow::as_select())
                .first::<PatientRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::missing("get_patient", "patient", id))?
                .into_patient()
        })
        .await
    }

    async fn list_patients(
        &self,
        filter: &PatientFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Patient>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut count_query = patients::table.count().into_boxed();
            for pred in patient_predicates(&filter) {
                count_query = count_query.filter(pred);
            }
            let total: i64 = count_query.get_result(conn).map_err(map_diesel_error)?;

            let mut query = patients::table.select(PatientRow::as_select()).into_boxed();
            for pred in patient_predicates(&filter) {
                query = query.filter(pred);
            }
            let rows = query
                .order((
                    patients::last_name.asc(),
                    patients::first_name.asc(),
                    patients::patient_id.asc(),
                ))
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit()))
                .load::<PatientRow>(conn)
                .map_err(map_diesel_error)?;

            let items = rows
                .into_iter()
                .map(PatientRow::into_patient)
                .collect::<RepositoryResult<Vec<_>>>()?;
            Ok(page_of(items, total, page))
        })
        .await
    }

    async fn update_patient(
        &self,
        id: PatientId,
        changes: PatientChanges,
    ) -> RepositoryResult<Patient> {
        let changes = PatientChangesRow::new(changes, Utc::now());
        self.with_conn(move |conn| {
            diesel::update(patients::table.find(id.value()))
                .set(&changes)
                .returning(PatientRow::as_returning())
                .get_result::<PatientRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::missing("update_patient", "patient", id))?
                .into_patient()
        })
        .await
    }

    async fn delete_patient(&self, id: PatientId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            // Referencing rows make the foreign keys fail with a conflict.
            let deleted = diesel::delete(patients::table.find(id.value()))
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_operation("delete_patient"))?;
            if deleted == 0 {
                return Err(RepositoryError::missing("delete_patient", "patient", id));
            }
            Ok(())
        })
        .await
    }
}

// ==================== Doctors ====================

#[async_trait]
impl DoctorRepository for PostgresRepository {
    async fn create_doctor(&self, doctor: NewDoctor) -> RepositoryResult<Doctor> {
        let row = NewDoctorRow::from(doctor);
        self.with_conn(move |conn| {
            diesel::insert_into(doctors::table)
                .values(&row)
                .returning(DoctorRow::as_returning())
                .get_result::<DoctorRow>(conn)
                .map(Doctor::from)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_doctor(&self, id: DoctorId) -> RepositoryResult<Doctor> {
        self.with_conn(move |conn| {
            doctors::table
                .find(id.value())
                .select(DoctorRow::as_select())
                .first::<DoctorRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Doctor::from)
                .ok_or_else(|| RepositoryError::missing("get_doctor", "doctor", id))
        })
        .await
    }

    async fn list_doctors(
        &self,
        filter: &DoctorFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Doctor>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut count_query = doctors::table.count().into_boxed();
            for pred in doctor_predicates(&filter) {
                count_query = count_query.filter(pred);
            }
            let total: i64 = count_query.get_result(conn).map_err(map_diesel_error)?;

            let mut query = doctors::table.select(DoctorRow::as_select()).into_boxed();
            for pred in doctor_predicates(&filter) {
                query = query.filter(pred);
            }
            let rows = query
                .order((
                    doctors::last_name.asc(),
                    doctors::first_name.asc(),
                    doctors::doctor_id.asc(),
                ))
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit()))
                .load::<DoctorRow>(conn)
                .map_err(map_diesel_error)?;

            Ok(page_of(
                rows.into_iter().map(Doctor::from).collect(),
                total,
                page,
            ))
        })
        .await
    }

    async fn update_doctor(
        &self,
        id: DoctorId,
        changes: DoctorChanges,
    ) -> RepositoryResult<Doctor> {
        let changes = DoctorChangesRow::new(changes, Utc::now());
        self.with_conn(move |conn| {
            diesel::update(doctors::table.find(id.value()))
                .set(&changes)
                .returning(DoctorRow::as_returning())
                .get_result::<DoctorRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Doctor::from)
                .ok_or_else(|| RepositoryError::missing("update_doctor", "doctor", id))
        })
        .await
    }

    async fn delete_doctor(&self, id: DoctorId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(doctors::table.find(id.value()))
                .execute(conn)
                .map_err(|e| map_diesel_error(e).with_operation("delete_doctor"))?;
            if deleted == 0 {
                return Err(RepositoryError::missing("delete_doctor", "doctor", id));
            }
            Ok(())
        })
        .await
    }
}

// ==================== Users ====================

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.with_conn(move |conn| {
            diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .map_err(|e| map_diesel_error(e).with_operation("create_user"))?
                .into_user()
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<User> {
        self.with_conn(move |conn| {
            users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first::<UserRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::missing("get_user", "user", id))?
                .into_user()
        })
        .await
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<User>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut count_query = users::table.count().into_boxed();
            for pred in user_predicates(&filter) {
                count_query = count_query.filter(pred);
            }
            let total: i64 = count_query.get_result(conn).map_err(map_diesel_error)?;

            let mut query = users::table.select(UserRow::as_select()).into_boxed();
            for pred in user_predicates(&filter) {
                query = query.filter(pred);
            }
            let rows = query
                .order((users::username.asc(), users::user_id.asc()))
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit()))
                .load::<UserRow>(conn)
                .map_err(map_diesel_error)?;

            let items = rows
                .into_iter()
                .map(UserRow::into_user)
                .collect::<RepositoryResult<Vec<_>>>()?;
            Ok(page_of(items, total, page))
        })
        .await
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User> {
        let changes = UserChangesRow::new(changes, Utc::now());
        self.with_conn(move |conn| {
            diesel::update(users::table.find(id.value()))
                .set(&changes)
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("update_user"))?
                .ok_or_else(|| RepositoryError::missing("update_user", "user", id))?
                .into_user()
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(users::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::missing("delete_user", "user", id));
            }
            Ok(())
        })
        .await
    }
}

// ==================== Appointments ====================

#[async_trait]
impl AppointmentRepository for PostgresRepository {
    async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> RepositoryResult<Appointment> {
        let patient_id = appointment.patient_id;
        let doctor_id = appointment.doctor_id;
        let row = NewAppointmentRow::from(appointment);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                ensure_patient(tx, "create_appointment", patient_id)?;
                ensure_doctor(tx, "create_appointment", doctor_id)?;
                diesel::insert_into(appointments::table)
                    .values(&row)
                    .returning(AppointmentRow::as_returning())
                    .get_result::<AppointmentRow>(tx)
                    .map_err(map_diesel_error)?
                    .into_appointment()
            })
        })
        .await
    }

    async fn get_appointment(&self, id: AppointmentId) -> RepositoryResult<Appointment> {
        self.with_conn(move |conn| {
            appointments::table
                .find(id.value())
                .select(AppointmentRow::as_select())
                .first::<AppointmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| RepositoryError::missing("get_appointment", "appointment", id))?
                .into_appointment()
        })
        .await
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
        page: PageRequest,
    ) -> RepositoryResult<Page<Appointment>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut count_query = appointments::table.count().into_boxed();
            for pred in appointment_predicates(&filter) {
                count_query = count_query.filter(pred);
            }
            let total: i64 = count_query.get_result(conn).map_err(map_diesel_error)?;

            let mut query = appointments::table
                .select(AppointmentRow::as_select())
                .into_boxed();
            for pred in appointment_predicates(&filter) {
                query = query.filter(pred);
            }
            let rows = query
                .order((
                    appointments::appointment_datetime.asc(),
                    appointments::appointment_id.asc(),
                ))
                .offset(page.offset() as i64)
                .limit(i64::from(page.limit()))
                .load::<AppointmentRow>(conn)
                .map_err(map_diesel_error)?;

            let items = rows
                .into_iter()
                .map(AppointmentRow::into_appointment)
                .collect::<RepositoryResult<Vec<_>>>()?;
            Ok(page_of(items, total, page))
        })
        .await
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        changes: AppointmentChanges,
    ) -> RepositoryResult<Appointment> {
        let doctor_id = changes.doctor_id;
        let changes = AppointmentChangesRow::new(changes, Utc::now());
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                if let Some(doctor_id) = doctor_id {
                    ensure_doctor(tx, "update_appointment", doctor_id)?;
                }
                diesel::update(appointments::table.find(id.value()))
                    .set(&changes)
                    .returning(AppointmentRow::as_returning())
                    .get_result::<AppointmentRow>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| {
                        RepositoryError::missing("update_appointment", "appointment", id)
                    })?
                    .into_appointment()
            })
        })
        .await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(appointments::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::missing(
                    "delete_appointment",
                    "appointment",
                    id,
                ));
            }
            Ok(())
        })
        .await
    }
}

// ==================== Queue ====================

#[async_trait]
impl QueueRepository for PostgresRepository {
    async fn check_in(
        &self,
        entry: NewQueueEntry,
        arrival_time: DateTime<Utc>,
    ) -> RepositoryResult<QueueEntryView> {
        let epoch = self.config.epoch_policy.epoch_for(arrival_time);
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                ensure_patient(tx, "check_in", entry.patient_id)?;

                // The counter row stays locked until commit, serializing
                // concurrent check-ins within one epoch.
                let queue_number: i32 = diesel::insert_into(queue_counters::table)
                    .values((
                        queue_counters::epoch_key.eq(epoch.as_str()),
                        queue_counters::last_number.eq(1),
                    ))
                    .on_conflict(queue_counters::epoch_key)
                    .do_update()
                    .set(queue_counters::last_number.eq(queue_counters::last_number + 1))
                    .returning(queue_counters::last_number)
                    .get_result(tx)
                    .map_err(map_diesel_error)?;

                let row = NewQueueEntryRow {
                    patient_id: entry.patient_id.value(),
                    queue_number,
                    epoch_key: epoch.as_str().to_string(),
                    status: QueueStatus::Waiting.as_str().to_string(),
                    priority: entry.priority.as_str().to_string(),
                    arrival_time,
                    updated_at: arrival_time,
                };
                let id: i64 = diesel::insert_into(queue_entries::table)
                    .values(&row)
                    .returning(queue_entries::queue_entry_id)
                    .get_result(tx)
                    .map_err(|e| retry_on_conflict(map_diesel_error(e)))?;

                load_queue_view(tx, QueueEntryId::new(id))
            })
        })
        .await
    }

    async fn get_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<QueueEntryView> {
        self.with_conn(move |conn| load_queue_view(conn, id)).await
    }

    async fn fetch_queue_entries(
        &self,
        filter: &QueueFilter,
    ) -> RepositoryResult<Vec<QueueEntryView>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = queue_entries::table
                .inner_join(patients::table)
                .select((
                    QueueEntryRow::as_select(),
                    patients::first_name,
                    patients::last_name,
                ))
                .into_boxed();
            if let Some(status) = filter.status {
                query = query.filter(queue_entries::status.eq(status.as_str()));
            }
            if let Some(priority) = filter.priority {
                query = query.filter(queue_entries::priority.eq(priority.as_str()));
            }
            if let Some(term) = &filter.search {
                query = query.filter(
                    concat_ws(" ", patients::first_name, patients::last_name)
                        .ilike(like_pattern(term)),
                );
            }

            let rows = query
                .load::<(QueueEntryRow, String, String)>(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter()
                .map(|(entry, first, last)| entry.into_view(&first, &last))
                .collect()
        })
        .await
    }

    async fn update_queue_entry(
        &self,
        id: QueueEntryId,
        changes: QueueEntryChanges,
    ) -> RepositoryResult<QueueEntryView> {
        self.with_conn(move |conn| {
            conn.transaction(|tx| {
                let current = queue_entries::table
                    .find(id.value())
                    .select(queue_entries::status)
                    .for_update()
                    .first::<String>(tx)
                    .optional()
                    .map_err(map_diesel_error)?
                    .ok_or_else(|| {
                        RepositoryError::missing("update_queue_entry", "queue_entry", id)
                    })?;
                let current: QueueStatus = current.parse().map_err(RepositoryError::internal)?;

                changes.check_transition(current).map_err(|msg| {
                    RepositoryError::conflict_with_context(
                        msg,
                        ErrorContext::new("update_queue_entry")
                            .with_entity("queue_entry")
                            .with_entity_id(id),
                    )
                })?;

                diesel::update(queue_entries::table.find(id.value()))
                    .set(&QueueEntryChangesRow::new(changes, Utc::now()))
                    .execute(tx)
                    .map_err(map_diesel_error)?;

                load_queue_view(tx, id)
            })
        })
        .await
    }

    async fn delete_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            let deleted = diesel::delete(queue_entries::table.find(id.value()))
                .execute(conn)
                .map_err(map_diesel_error)?;
            if deleted == 0 {
                return Err(RepositoryError::missing(
                    "delete_queue_entry",
                    "queue_entry",
                    id,
                ));
            }
            Ok(())
        })
        .await
    }
}
