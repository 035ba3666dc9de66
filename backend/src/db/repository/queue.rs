//! Walk-in queue repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::listing::QueueFilter;
use crate::models::{NewQueueEntry, QueueEntryChanges, QueueEntryId, QueueEntryView};

/// Storage for queue entries.
///
/// Ranking and pagination are not done here: [`fetch_queue_entries`]
/// returns the filtered snapshot and the service layer orders it with
/// [`crate::queue::rank_page`].
///
/// [`fetch_queue_entries`]: QueueRepository::fetch_queue_entries
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Add a patient to the queue as `waiting`.
    ///
    /// The queue number is allocated atomically with the insert: two
    /// concurrent check-ins in the same epoch never share a number, and a
    /// number is never reused. Fails with `NotFound` for an unknown patient.
    async fn check_in(
        &self,
        entry: NewQueueEntry,
        arrival_time: DateTime<Utc>,
    ) -> RepositoryResult<QueueEntryView>;

    async fn get_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<QueueEntryView>;

    /// All entries matching `filter`, unordered.
    async fn fetch_queue_entries(&self, filter: &QueueFilter)
        -> RepositoryResult<Vec<QueueEntryView>>;

    /// Apply a staff update. A backwards status change fails with a
    /// conflict and leaves the entry untouched.
    async fn update_queue_entry(
        &self,
        id: QueueEntryId,
        changes: QueueEntryChanges,
    ) -> RepositoryResult<QueueEntryView>;

    async fn delete_queue_entry(&self, id: QueueEntryId) -> RepositoryResult<()>;
}
