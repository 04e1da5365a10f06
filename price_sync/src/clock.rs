//! Wall-clock source, injectable so rows and schedules can be tested at fixed times.
use chrono::{Local, NaiveDateTime};

/// Current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// System local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
