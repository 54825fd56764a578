//! "Today" as seen by the check cycle.

use chrono::{Local, NaiveDate};

/// Source of the current local calendar date.
///
/// Dates are naive local dates; a change of machine timezone simply moves
/// "today" with it.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The machine's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
