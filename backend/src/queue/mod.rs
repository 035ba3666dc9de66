//! Walk-in queue core.
//!
//! - [`ranking`]: the deterministic display/service order
//! - [`numbering`]: per-epoch queue number allocation
//!
//! Listing a queue is filter → rank → paginate: repositories return the
//! filtered snapshot and [`rank_page`] orders and slices it, so `total`
//! always reflects the filtered set.

pub mod numbering;
pub mod ranking;

pub use numbering::{EpochPolicy, QueueNumberAllocator, CONTINUOUS_EPOCH};
pub use ranking::{compare_entries, rank, Rankable};

use crate::listing::{Page, PageRequest};

/// Rank a filtered snapshot and cut out the requested page.
pub fn rank_page<T: Rankable>(filtered: Vec<T>, request: PageRequest) -> Page<T> {
    Page::from_ordered(rank(filtered), request)
}
