use std::sync::Mutex;

/// Every variable the repository factory and queue numbering read.
const CLINIC_VARS: &[&str] = &[
    "REPOSITORY_TYPE",
    "REPOSITORY_CONFIG",
    "DATABASE_URL",
    "PG_DATABASE_URL",
    "QUEUE_EPOCH",
    "QUEUE_UTC_OFFSET_MINUTES",
];

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with only `vars` set out of [`CLINIC_VARS`], then put the
/// previous values back, also on panic.
pub fn with_clinic_env<R>(vars: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _restore = Restore(
        CLINIC_VARS
            .iter()
            .map(|key| (*key, std::env::var(key).ok()))
            .collect(),
    );
    for key in CLINIC_VARS {
        std::env::remove_var(key);
    }
    for (key, value) in vars {
        std::env::set_var(key, value);
    }
    f()
}

struct Restore(Vec<(&'static str, Option<String>)>);

impl Drop for Restore {
    fn drop(&mut self) {
        for (key, value) in &self.0 {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}
