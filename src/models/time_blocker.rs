//! Institutional time blocks.
//!
//! Recurring local-time intervals during which no classes may be placed:
//! lunch breaks, all-hands meetings, common exam slots. Blocks recur on a
//! weekday set and may be limited to an active date range.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A recurring blocked time interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlock {
    /// Display name (e.g. "Lunch Break").
    pub name: String,
    /// Local start time (inclusive).
    pub start_time: NaiveTime,
    /// Local end time (exclusive).
    pub end_time: NaiveTime,
    /// Weekdays the block applies to (0 = Monday … 6 = Sunday).
    pub weekdays: BTreeSet<u32>,
    /// First date the block is active; `None` = always.
    pub active_from: Option<NaiveDate>,
    /// Last date the block is active; `None` = always.
    pub active_until: Option<NaiveDate>,
}

impl TimeBlock {
    /// Creates a block active on the given weekdays with no date bounds.
    pub fn new(
        name: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
        weekdays: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
            weekdays: weekdays.into_iter().collect(),
            active_from: None,
            active_until: None,
        }
    }

    /// Bounds the block to an active date range.
    pub fn with_active_range(mut self, from: NaiveDate, until: NaiveDate) -> Self {
        self.active_from = Some(from);
        self.active_until = Some(until);
        self
    }

    /// Whether the block applies on the given date.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        if let Some(from) = self.active_from {
            if date < from {
                return false;
            }
        }
        if let Some(until) = self.active_until {
            if date > until {
                return false;
            }
        }
        self.weekdays.contains(&date.weekday().num_days_from_monday())
    }

    /// Whether a local-time span on the given date intersects this block.
    pub fn blocks_span(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.is_active(date) && start < self.end_time && end > self.start_time
    }
}

/// The institution's set of time blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBlocker {
    /// Owning institution identifier.
    pub institution_id: String,
    /// Blocked intervals.
    pub blocks: Vec<TimeBlock>,
}

impl TimeBlocker {
    /// Creates an empty blocker set.
    pub fn new(institution_id: impl Into<String>) -> Self {
        Self {
            institution_id: institution_id.into(),
            blocks: Vec::new(),
        }
    }

    /// Builder: adds a block.
    pub fn with_block(mut self, block: TimeBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Adds a block.
    pub fn add_block(&mut self, block: TimeBlock) {
        self.blocks.push(block);
    }

    /// Returns the name of the first block intersecting the span, if any.
    pub fn blocking(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.blocks_span(date, start, end))
            .map(|b| b.name.as_str())
    }

    /// Whether the span intersects any block.
    pub fn is_blocked(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.blocking(date, start, end).is_some()
    }
}
