//! Display and service order of the walk-in queue.
//!
//! Urgent entries come before normal ones; within a priority the earlier
//! arrival comes first. Equal arrival times fall back to the queue number,
//! and finally to the entry id so that entries from different numbering
//! epochs still order deterministically.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::models::{QueueEntry, QueueEntryId, QueueEntryView, QueuePriority};

/// The fields the ranking policy looks at.
pub trait Rankable {
    fn priority(&self) -> QueuePriority;
    fn arrival_time(&self) -> DateTime<Utc>;
    fn queue_number(&self) -> i32;
    fn entry_id(&self) -> QueueEntryId;
}

impl Rankable for QueueEntry {
    fn priority(&self) -> QueuePriority {
        self.priority
    }

    fn arrival_time(&self) -> DateTime<Utc> {
        self.arrival_time
    }

    fn queue_number(&self) -> i32 {
        self.queue_number
    }

    fn entry_id(&self) -> QueueEntryId {
        self.id
    }
}

impl Rankable for QueueEntryView {
    fn priority(&self) -> QueuePriority {
        self.entry.priority
    }

    fn arrival_time(&self) -> DateTime<Utc> {
        self.entry.arrival_time
    }

    fn queue_number(&self) -> i32 {
        self.entry.queue_number
    }

    fn entry_id(&self) -> QueueEntryId {
        self.entry.id
    }
}

fn priority_rank(priority: QueuePriority) -> u8 {
    match priority {
        QueuePriority::Urgent => 0,
        QueuePriority::Normal => 1,
    }
}

/// Total order over queue entries; `Less` means served first.
pub fn compare_entries<T: Rankable>(a: &T, b: &T) -> Ordering {
    priority_rank(a.priority())
        .cmp(&priority_rank(b.priority()))
        .then_with(|| a.arrival_time().cmp(&b.arrival_time()))
        .then_with(|| a.queue_number().cmp(&b.queue_number()))
        .then_with(|| a.entry_id().cmp(&b.entry_id()))
}

/// Order a snapshot of entries for display.
pub fn rank<T: Rankable>(mut entries: Vec<T>) -> Vec<T> {
    entries.sort_by(compare_entries);
    entries
}
