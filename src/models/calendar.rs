//! Institutional and resource availability calendars.
//!
//! A calendar carries a fixed UTC offset, a timeslot granularity, and two
//! interval lists: availability windows (positive) and blackout periods
//! (negative, overriding). All generated assignment start times must land
//! on a granularity boundary relative to local midnight.
//!
//! # Precedence
//! Blackout periods override availability windows. A span is available iff
//! it fits inside at least one window (when any are declared) and overlaps
//! no blackout.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Largest representable UTC offset (±23:59).
const MAX_OFFSET_MINUTES: i32 = 23 * 60 + 59;

/// Default timeslot granularity in minutes.
pub const DEFAULT_GRANULARITY_MINUTES: u32 = 15;

/// A timezone-aware time interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<FixedOffset>,
    /// Interval end (exclusive).
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    /// Whether a span fits entirely inside this window.
    pub fn contains_span(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        start >= self.start && end <= self.end
    }

    /// Whether a span overlaps this window.
    pub fn overlaps(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        start < self.end && end > self.start
    }
}

/// Availability calendar with timezone and timeslot granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    /// Calendar identifier.
    pub id: String,
    /// Local timezone as minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// Timeslot granularity in minutes; assignment start times must be
    /// multiples of this relative to local midnight.
    pub timeslot_granularity_minutes: u32,
    /// Periods when booking is possible. Empty = always bookable.
    pub availability_windows: Vec<TimeWindow>,
    /// Periods when booking is impossible (override windows).
    pub blackout_periods: Vec<TimeWindow>,
}

impl Calendar {
    /// Creates a calendar in UTC with the default 15-minute granularity.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            utc_offset_minutes: 0,
            timeslot_granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            availability_windows: Vec::new(),
            blackout_periods: Vec::new(),
        }
    }

    /// Sets the UTC offset in minutes.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Sets the timeslot granularity in minutes.
    pub fn with_granularity_minutes(mut self, minutes: u32) -> Self {
        self.timeslot_granularity_minutes = minutes;
        self
    }

    /// Adds an availability window.
    pub fn with_availability_window(
        mut self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        self.availability_windows.push(TimeWindow::new(start, end));
        self
    }

    /// Adds a blackout period.
    pub fn with_blackout(
        mut self,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Self {
        self.blackout_periods.push(TimeWindow::new(start, end));
        self
    }

    /// The calendar's timezone as a chrono offset.
    pub fn offset(&self) -> FixedOffset {
        let clamped = self
            .utc_offset_minutes
            .clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES);
        FixedOffset::east_opt(clamped * 60).expect("clamped offset is in range")
    }

    /// Granularity in minutes, never zero.
    pub fn granularity_minutes(&self) -> u32 {
        self.timeslot_granularity_minutes.max(1)
    }

    /// Whether a span is available.
    ///
    /// The span must fit inside at least one availability window (when any
    /// are declared) and must not overlap any blackout period.
    pub fn is_available(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        if !self.availability_windows.is_empty()
            && !self
                .availability_windows
                .iter()
                .any(|w| w.contains_span(start, end))
        {
            return false;
        }

        !self.blackout_periods.iter().any(|b| b.overlaps(start, end))
    }

    /// Whether a timestamp lands on a granularity boundary relative to
    /// local midnight in this calendar's timezone.
    pub fn aligns_to_granularity(&self, at: DateTime<FixedOffset>) -> bool {
        let local = at.with_timezone(&self.offset()).time();
        let seconds = local.num_seconds_from_midnight();
        seconds % (self.granularity_minutes() * 60) == 0
    }

    /// Builds a timezone-aware timestamp from a local date and time.
    pub fn at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<FixedOffset> {
        let offset = self.offset();
        DateTime::from_naive_utc_and_offset(date.and_time(time) - offset, offset)
    }
}
