//! Timestamp sources for the two temporal modes.
//!
//! Continuous mode stamps records with wall-clock "now"; backfill mode draws
//! a uniformly random instant inside a target UTC calendar day.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime, Utc};
use rand::Rng;
use std::sync::atomic::{AtomicI64, Ordering};

/// Date format accepted for `START_DATE` / `END_DATE`.
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Milliseconds from `day_start` to `day_end`, both inclusive.
pub const DAY_LAST_MS: i64 = 86_399_999;

/// Supplies epoch-millisecond timestamps.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// Useful for reproducible runs where follow-up timestamps must not depend
/// on how fast the host is.
#[derive(Debug)]
pub struct SteppingClock {
    next: AtomicI64,
    step_ms: i64,
}

impl SteppingClock {
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        Self {
            next: AtomicI64::new(start_ms),
            step_ms,
        }
    }
}

impl Clock for SteppingClock {
    fn now_ms(&self) -> i64 {
        self.next.fetch_add(self.step_ms, Ordering::Relaxed)
    }
}

/// Parses a `YYYY.MM.DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        Error::Config(format!(
            "invalid date '{}' (expected YYYY.MM.DD): {}",
            value, e
        ))
    })
}

/// One UTC calendar day as an inclusive millisecond window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
    start_ms: i64,
}

impl DayWindow {
    pub fn new(date: NaiveDate) -> Self {
        let start_ms = date.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
        Self { date, start_ms }
    }

    /// UTC midnight.
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// `23:59:59.999` of the same day.
    pub fn end_ms(&self) -> i64 {
        self.start_ms + DAY_LAST_MS
    }

    pub fn contains(&self, ts_ms: i64) -> bool {
        (self.start_ms()..=self.end_ms()).contains(&ts_ms)
    }

    /// Draws a timestamp uniformly from `[start_ms, end_ms]`.
    pub fn sample_ts<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.gen_range(self.start_ms()..=self.end_ms())
    }

    /// `YYYY-MM-DD`, as used in progress output.
    pub fn label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// An inclusive, validated range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `end` is before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::Config(format!(
                "end_date must be >= start_date (got {} ~ {})",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn day_count(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn days(&self) -> impl Iterator<Item = DayWindow> {
        let end = self.end;
        self.start
            .iter_days()
            .take_while(move |day| *day <= end)
            .map(DayWindow::new)
    }
}
