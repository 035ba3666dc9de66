//! Queue number allocation.
//!
//! Numbers are strictly increasing and unique within an epoch and are never
//! handed out twice, even after the entry that held them is removed.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::QueueEpoch;

/// Epoch key used by [`EpochPolicy::Continuous`].
pub const CONTINUOUS_EPOCH: &str = "all";

/// Largest accepted distance from UTC, one minute short of a day.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// When queue numbering starts again from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "epoch", rename_all = "lowercase")]
pub enum EpochPolicy {
    /// Reset at local midnight, local time being UTC shifted by the offset.
    Daily { utc_offset_minutes: i32 },
    /// Never reset.
    Continuous,
}

impl Default for EpochPolicy {
    fn default() -> Self {
        EpochPolicy::Daily {
            utc_offset_minutes: 0,
        }
    }
}

impl EpochPolicy {
    /// Build a policy from its textual name and an optional UTC offset.
    pub fn parse(name: &str, utc_offset_minutes: i32) -> Result<Self, String> {
        if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&utc_offset_minutes) {
            return Err(format!(
                "Queue UTC offset must be within ±{} minutes, got {}",
                MAX_UTC_OFFSET_MINUTES, utc_offset_minutes
            ));
        }
        match name.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(EpochPolicy::Daily { utc_offset_minutes }),
            "continuous" | "never" | "none" => Ok(EpochPolicy::Continuous),
            other => Err(format!(
                "Unknown queue epoch '{}'. Use daily or continuous.",
                other
            )),
        }
    }

    /// Read `QUEUE_EPOCH` and `QUEUE_UTC_OFFSET_MINUTES`, defaulting to a UTC
    /// daily epoch.
    pub fn from_env() -> Result<Self, String> {
        let offset = match std::env::var("QUEUE_UTC_OFFSET_MINUTES") {
            Ok(v) => v
                .parse::<i32>()
                .map_err(|_| format!("QUEUE_UTC_OFFSET_MINUTES must be an integer, got '{}'", v))?,
            Err(_) => 0,
        };
        match std::env::var("QUEUE_EPOCH") {
            Ok(name) => Self::parse(&name, offset),
            Err(_) => Self::parse("daily", offset),
        }
    }

    /// The epoch an arrival at `at` belongs to.
    pub fn epoch_for(&self, at: DateTime<Utc>) -> QueueEpoch {
        match self {
            EpochPolicy::Daily { utc_offset_minutes } => {
                // Offsets are range checked in `parse`; fall back to UTC otherwise.
                let offset =
                    FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or(Utc.fix());
                QueueEpoch::new(at.with_timezone(&offset).date_naive().to_string())
            }
            EpochPolicy::Continuous => QueueEpoch::new(CONTINUOUS_EPOCH),
        }
    }
}

impl FromStr for EpochPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, 0)
    }
}

/// Serialized per-epoch counters.
///
/// `next` takes the lock for the whole read-increment-write, so concurrent
/// callers never observe the same number.
#[derive(Debug, Default)]
pub struct QueueNumberAllocator {
    counters: Mutex<HashMap<QueueEpoch, i32>>,
}

impl QueueNumberAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next number in `epoch`, starting at 1.
    pub fn next(&self, epoch: &QueueEpoch) -> i32 {
        let mut counters = self.counters.lock();
        let counter = counters.entry(epoch.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// The last number handed out in `epoch`, if any.
    pub fn last(&self, epoch: &QueueEpoch) -> Option<i32> {
        self.counters.lock().get(epoch).copied()
    }

    pub fn reset(&self) {
        self.counters.lock().clear();
    }
}
