//! Monthly usage counter for the free tier.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Storage key for the serialized usage counter.
pub const USAGE_COUNTER_KEY: &str = "template-usage";

/// Calendar-month usage tally.
///
/// The month key is derived from the timestamp at evaluation time, so a
/// counter left over from a previous month reads as zero; no background
/// reset job exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageCounter {
    pub count: u32,
    /// Calendar month the count belongs to, "%Y-%m".
    pub month_key: String,
    pub last_reset_millis: i64,
}

impl UsageCounter {
    /// Fresh counter for the month containing `now_millis`.
    pub fn new(now_millis: i64) -> Self {
        Self {
            count: 0,
            month_key: Self::month_key_for(now_millis),
            last_reset_millis: now_millis,
        }
    }

    /// "%Y-%m" key for the month containing the timestamp. Out-of-range
    /// timestamps map to the epoch month rather than panicking.
    pub fn month_key_for(now_millis: i64) -> String {
        let when = DateTime::<Utc>::from_timestamp_millis(now_millis)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        format!("{:04}-{:02}", when.year(), when.month())
    }

    /// Normalize the counter to the month containing `now_millis`,
    /// resetting the count on a month boundary.
    pub fn rolled_over(self, now_millis: i64) -> Self {
        let current_key = Self::month_key_for(now_millis);
        if self.month_key == current_key {
            self
        } else {
            Self::new(now_millis)
        }
    }

    /// Record one use within the current month.
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Uses left under `quota`, never negative.
    pub fn remaining(&self, quota: u32) -> u32 {
        quota.saturating_sub(self.count)
    }
}
