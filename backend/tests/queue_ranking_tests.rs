//! Property tests for queue ranking and pagination.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use clinic_desk::listing::{Page, PageRequest};
use clinic_desk::models::{
    PatientId, QueueEntry, QueueEntryId, QueueEntryView, QueueEpoch, QueuePriority, QueueStatus,
};
use clinic_desk::queue::{rank, rank_page};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()
}

fn entry(id: i64, arrival_minutes: i64, number: i32, urgent: bool) -> QueueEntryView {
    QueueEntryView {
        entry: QueueEntry {
            id: QueueEntryId::new(id),
            patient_id: PatientId::new(id),
            queue_number: number,
            epoch: QueueEpoch::new("2026-10-19"),
            status: QueueStatus::Waiting,
            priority: if urgent {
                QueuePriority::Urgent
            } else {
                QueuePriority::Normal
            },
            arrival_time: base_time() + Duration::minutes(arrival_minutes),
            estimated_wait_time: None,
            updated_at: base_time(),
        },
        patient_name: format!("Patient {}", id),
    }
}

fn arb_entries() -> impl Strategy<Value = Vec<QueueEntryView>> {
    prop::collection::vec((0i64..30, 1i32..50, any::<bool>()), 0..40).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (minutes, number, urgent))| entry(i as i64 + 1, minutes, number, urgent))
            .collect()
    })
}

fn sort_key(view: &QueueEntryView) -> (u8, DateTime<Utc>, i32, i64) {
    let priority = match view.entry.priority {
        QueuePriority::Urgent => 0,
        QueuePriority::Normal => 1,
    };
    (
        priority,
        view.entry.arrival_time,
        view.entry.queue_number,
        view.entry.id.value(),
    )
}

#[test]
fn test_urgent_late_arrival_ranks_first() {
    let ranked = rank(vec![
        entry(1, 0, 1, false),
        entry(2, 5, 2, false),
        entry(3, 20, 3, true),
    ]);
    let ids: Vec<i64> = ranked.iter().map(|v| v.entry.id.value()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_same_arrival_falls_back_to_queue_number() {
    let ranked = rank(vec![entry(1, 0, 7, false), entry(2, 0, 4, false)]);
    assert_eq!(ranked[0].entry.queue_number, 4);
    assert_eq!(ranked[1].entry.queue_number, 7);
}

#[test]
fn test_page_past_end_is_empty_but_keeps_total() {
    let entries: Vec<_> = (1..=5).map(|i| entry(i, i, i as i32, false)).collect();
    let last = rank_page(entries.clone(), PageRequest::new(3, 2).unwrap());
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].entry.queue_number, 5);

    let page = rank_page(entries, PageRequest::new(4, 2).unwrap());
    assert!(page.items.is_empty());
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages, 3);
}

#[test]
fn test_empty_queue_has_zero_pages() {
    let page: Page<QueueEntryView> = rank_page(Vec::new(), PageRequest::default());
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert_eq!(page.page, 1);
    assert_eq!(page.limit, 10);
}

proptest! {
    #[test]
    fn prop_ranking_is_sorted_by_key(entries in arb_entries()) {
        let ranked = rank(entries);
        for pair in ranked.windows(2) {
            prop_assert!(sort_key(&pair[0]) <= sort_key(&pair[1]));
        }
    }

    #[test]
    fn prop_ranking_ignores_input_order(entries in arb_entries()) {
        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert_eq!(rank(entries), rank(reversed));
    }

    #[test]
    fn prop_pages_concatenate_to_ranked_list(entries in arb_entries(), limit in 1u32..12) {
        let ranked = rank(entries.clone());
        let first = rank_page(entries.clone(), PageRequest::new(1, limit).unwrap());
        let pages = first.total_pages.max(1);

        let mut collected = Vec::new();
        for page in 1..=pages {
            let p = rank_page(entries.clone(), PageRequest::new(page, limit).unwrap());
            prop_assert_eq!(p.total, ranked.len() as u64);
            prop_assert!(p.items.len() <= limit as usize);
            collected.extend(p.items);
        }
        prop_assert_eq!(collected, ranked);
    }
}
