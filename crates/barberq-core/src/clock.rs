//! Wall-clock source.
//!
//! Everything time-dependent in the engine reads the clock through this trait
//! so tests can drive synthetic time.

use std::cell::Cell;

use chrono::{DateTime, Duration, FixedOffset, Local, Offset, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Offset used for time-of-day decisions at `at`.
    fn utc_offset(&self, at: DateTime<Utc>) -> FixedOffset;
}

/// The host's clock and local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset(&self, at: DateTime<Utc>) -> FixedOffset {
        *at.with_timezone(&Local).offset()
    }
}

/// Manually advanced clock with a fixed zone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock at `now`, reporting time of day in UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Cell::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn utc_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn utc_offset(&self, at: DateTime<Utc>) -> FixedOffset {
        (**self).utc_offset(at)
    }
}
