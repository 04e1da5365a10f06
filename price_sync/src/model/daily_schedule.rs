//! Once-a-day firing decision for the background ticker.
//!
//! The ticker wakes up at a coarse interval and asks `DailySchedule::is_due(now)`. The
//! schedule fires at most once per calendar day, on the first poll at or after the
//! configured time of day.
//!
//! Notes:
//! - If the process starts after today's trigger time, the first firing is tomorrow.
//! - A poll that lands late (machine asleep, long cycle) still fires for that day.
//! - Time comes in as an argument so the decision is deterministic in tests.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Tracks the configured time of day and the last day it fired.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    at: NaiveTime,
    last_fired: Option<NaiveDate>,
}

impl DailySchedule {
    /// Create a schedule as seen from `now`.
    pub fn new(at: NaiveTime, now: NaiveDateTime) -> Self {
        let last_fired = (now.time() >= at).then_some(now.date());
        Self { at, last_fired }
    }

    /// Configured time of day.
    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// Return `true` exactly once per day once `at` has passed, and record the firing.
    pub fn is_due(&mut self, now: NaiveDateTime) -> bool {
        let today = now.date();
        if now.time() < self.at || self.last_fired == Some(today) {
            return false;
        }
        self.last_fired = Some(today);
        true
    }
}
