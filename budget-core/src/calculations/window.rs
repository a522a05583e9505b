//! Trailing time windows over expense records.

use chrono::{DateTime, Duration, Utc};

use crate::models::ExpenseRecord;

/// A window covering the `days` days up to and including "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    days: u32,
}

impl TrailingWindow {
    pub const DEFAULT_DAYS: u32 = 30;

    pub fn new(days: u32) -> Self {
        Self { days }
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    /// Earliest instant inside the window.
    ///
    /// Windows reaching past the earliest representable instant start there.
    pub fn start(
        &self,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        now.checked_sub_signed(Duration::days(i64::from(self.days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Both bounds are inclusive.
    pub fn contains(
        &self,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        date >= self.start(now) && date <= now
    }

    /// Keeps the records dated inside the window, preserving order.
    pub fn filter_expenses(
        &self,
        records: &[ExpenseRecord],
        now: DateTime<Utc>,
    ) -> Vec<ExpenseRecord> {
        records
            .iter()
            .filter(|record| self.contains(record.date, now))
            .cloned()
            .collect()
    }
}

impl Default for TrailingWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DAYS)
    }
}
