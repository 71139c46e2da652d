//! The point in time scheduling decisions are made against.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Current instant paired with the local calendar day it falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moment {
    /// Absolute current instant.
    pub now: DateTime<Utc>,
    /// Local calendar day containing `now`.
    pub today: NaiveDate,
}

impl Moment {
    /// Moment for an explicit instant and day.
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    /// Moment for `now`, with today taken from the local time zone.
    pub fn local(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.with_timezone(&Local).date_naive(),
        }
    }

    /// The current wall-clock moment.
    pub fn current() -> Self {
        Self::local(Utc::now())
    }
}
