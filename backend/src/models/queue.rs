//! Walk-in queue records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{PatientId, QueueEntryId};

crate::define_text_enum!(
    /// Where a checked-in patient currently is.
    QueueStatus {
        Waiting => "waiting",
        WithDoctor => "with_doctor",
        Completed => "completed",
    }
);

impl QueueStatus {
    fn stage(&self) -> u8 {
        match self {
            QueueStatus::Waiting => 0,
            QueueStatus::WithDoctor => 1,
            QueueStatus::Completed => 2,
        }
    }

    /// Status only moves forward. Skipping a stage is allowed and staying on
    /// the current stage is a no-op.
    pub fn can_transition_to(&self, next: QueueStatus) -> bool {
        next.stage() >= self.stage()
    }
}

impl Default for QueueStatus {
    fn default() -> Self {
        QueueStatus::Waiting
    }
}

crate::define_text_enum!(
    /// Triage priority; urgent entries are served first.
    QueuePriority {
        Normal => "normal",
        Urgent => "urgent",
    }
);

impl Default for QueuePriority {
    fn default() -> Self {
        QueuePriority::Normal
    }
}

/// Reset boundary for queue numbering, e.g. `2026-10-19` for a daily epoch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueEpoch(pub String);

impl QueueEpoch {
    pub fn new(key: impl Into<String>) -> Self {
        QueueEpoch(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One patient's presence in the walk-in queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub patient_id: PatientId,
    pub queue_number: i32,
    pub epoch: QueueEpoch,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub arrival_time: DateTime<Utc>,
    /// Minutes; filled in by staff or an external estimator.
    pub estimated_wait_time: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

/// Queue entry joined with the patient's display name, as listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntryView {
    #[serde(flatten)]
    pub entry: QueueEntry,
    pub patient_name: String,
}

/// Validated check-in request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQueueEntry {
    pub patient_id: PatientId,
    pub priority: QueuePriority,
}

/// Validated staff update of a queue entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueueEntryChanges {
    pub status: Option<QueueStatus>,
    pub priority: Option<QueuePriority>,
    /// `Some(None)` clears the estimate.
    pub estimated_wait_time: Option<Option<i32>>,
}

impl QueueEntryChanges {
    pub fn status(status: QueueStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn priority(priority: QueuePriority) -> Self {
        Self {
            priority: Some(priority),
            ..Default::default()
        }
    }

    /// Check the forward-only status rule against the entry's current status.
    pub fn check_transition(&self, current: QueueStatus) -> Result<(), String> {
        match self.status {
            Some(next) if !current.can_transition_to(next) => Err(format!(
                "Queue status cannot move from '{}' back to '{}'",
                current, next
            )),
            _ => Ok(()),
        }
    }

    /// Apply the changes. Callers check [`Self::check_transition`] first.
    pub fn apply_to(self, entry: &mut QueueEntry, now: DateTime<Utc>) {
        if let Some(v) = self.status {
            entry.status = v;
        }
        if let Some(v) = self.priority {
            entry.priority = v;
        }
        if let Some(v) = self.estimated_wait_time {
            entry.estimated_wait_time = v;
        }
        entry.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_moves_forward_only() {
        use QueueStatus::*;
        assert!(Waiting.can_transition_to(WithDoctor));
        assert!(Waiting.can_transition_to(Completed));
        assert!(WithDoctor.can_transition_to(Completed));
        assert!(WithDoctor.can_transition_to(WithDoctor));
        assert!(!WithDoctor.can_transition_to(Waiting));
        assert!(!Completed.can_transition_to(WithDoctor));
        assert!(!Completed.can_transition_to(Waiting));
    }

    #[test]
    fn test_check_transition_without_status_is_ok() {
        let changes = QueueEntryChanges::priority(QueuePriority::Urgent);
        assert!(changes.check_transition(QueueStatus::Completed).is_ok());
    }

    #[test]
    fn test_check_transition_rejects_backwards() {
        let changes = QueueEntryChanges::status(QueueStatus::Waiting);
        let err = changes.check_transition(QueueStatus::WithDoctor).unwrap_err();
        assert!(err.contains("with_doctor"));
    }

    fn waiting_entry() -> QueueEntry {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
        QueueEntry {
            id: QueueEntryId::new(1),
            patient_id: PatientId::new(1),
            queue_number: 1,
            epoch: QueueEpoch::new("all"),
            status: QueueStatus::Waiting,
            priority: QueuePriority::Normal,
            arrival_time: at,
            estimated_wait_time: Some(25),
            updated_at: at,
        }
    }

    #[test]
    fn test_apply_clears_or_keeps_wait_time() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 0).unwrap();

        let mut kept = waiting_entry();
        QueueEntryChanges::priority(QueuePriority::Urgent).apply_to(&mut kept, now);
        assert_eq!(kept.estimated_wait_time, Some(25));
        assert_eq!(kept.updated_at, now);

        let mut cleared = waiting_entry();
        QueueEntryChanges {
            estimated_wait_time: Some(None),
            ..Default::default()
        }
        .apply_to(&mut cleared, now);
        assert_eq!(cleared.estimated_wait_time, None);
    }

    #[test]
    fn test_status_serde_text() {
        assert_eq!(
            serde_json::to_string(&QueueStatus::WithDoctor).unwrap(),
            "\"with_doctor\""
        );
        assert_eq!("URGENT".parse::<QueuePriority>().unwrap(), QueuePriority::Urgent);
    }
}
