//! Academic holiday calendar.
//!
//! Tracks holiday/break periods and globally excluded weekdays (e.g.
//! weekends), and provides the week-partitioning helpers the occurrence
//! generator is built on: academic weeks are Mon–Fri blocks, and weeks
//! that consist entirely of holidays are dropped.
//!
//! Weekdays are indexed 0 = Monday … 6 = Sunday throughout.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ValidationError, ValidationErrorKind};

/// A named holiday or break period (inclusive date range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayPeriod {
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive).
    pub end_date: NaiveDate,
    /// Display name (e.g. "Winter Break").
    pub name: String,
    /// Period classification (e.g. "holiday", "break", "exam_period").
    pub kind: String,
}

impl HolidayPeriod {
    /// Creates a period of kind `"holiday"`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            start_date,
            end_date,
            name: name.into(),
            kind: "holiday".to_string(),
        }
    }

    /// Whether a date falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Holiday calendar with excluded weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayCalendar {
    /// Calendar identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Academic year this calendar describes.
    pub year: i32,
    /// Holiday and break periods.
    pub holidays: Vec<HolidayPeriod>,
    /// Weekdays with no classes at all (0 = Monday … 6 = Sunday).
    pub excluded_weekdays: BTreeSet<u32>,
}

impl HolidayCalendar {
    /// Creates an empty calendar.
    pub fn new(id: impl Into<String>, name: impl Into<String>, year: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            year,
            holidays: Vec::new(),
            excluded_weekdays: BTreeSet::new(),
        }
    }

    /// A calendar with no holidays and no excluded weekdays.
    pub fn unrestricted() -> Self {
        Self::new("unrestricted", "Unrestricted", 0)
    }

    /// Builder: adds a holiday period.
    pub fn with_holiday(
        mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        name: impl Into<String>,
    ) -> Self {
        self.holidays.push(HolidayPeriod::new(start_date, end_date, name));
        self
    }

    /// Builder: excludes a weekday (0 = Monday … 6 = Sunday).
    pub fn with_excluded_weekday(mut self, weekday: u32) -> Self {
        self.excluded_weekdays.insert(weekday);
        self
    }

    /// Builder: excludes Saturday and Sunday.
    pub fn with_weekends_excluded(self) -> Self {
        self.with_excluded_weekday(5).with_excluded_weekday(6)
    }

    /// Adds a holiday period.
    pub fn add_holiday(&mut self, start_date: NaiveDate, end_date: NaiveDate, name: impl Into<String>) {
        self.holidays.push(HolidayPeriod::new(start_date, end_date, name));
    }

    /// Whether a date is inside any holiday period.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.contains(date))
    }

    /// Whether classes can be scheduled on this date at all.
    pub fn is_schedulable_day(&self, date: NaiveDate) -> bool {
        !self.excluded_weekdays.contains(&date.weekday().num_days_from_monday())
            && !self.is_holiday(date)
    }

    /// Partitions a date range into academic weeks.
    ///
    /// Weeks are Mon–Fri blocks clamped to `[start, end]`; weeks whose
    /// every weekday is a holiday are dropped entirely.
    pub fn academic_weeks(&self, start: NaiveDate, end: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
        let mut weeks = Vec::new();
        let mut week_start =
            start - Duration::days(start.weekday().num_days_from_monday() as i64);

        while week_start <= end {
            let week_end = week_start + Duration::days(4);
            let clamped_start = week_start.max(start);
            let clamped_end = week_end.min(end);

            if clamped_start <= clamped_end && !self.is_holiday_week(clamped_start, clamped_end) {
                weeks.push((clamped_start, clamped_end));
            }

            week_start += Duration::days(7);
        }

        weeks
    }

    /// Whether every weekday in `[start, end]` is a holiday.
    pub fn is_holiday_week(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let mut current = start;
        while current <= end {
            if current.weekday().num_days_from_monday() < 5 && !self.is_holiday(current) {
                return false;
            }
            current += Duration::days(1);
        }
        true
    }

    /// All schedulable weekdays in a date range.
    pub fn schedulable_days(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            if self.is_schedulable_day(current) {
                days.push(current);
            }
            current += Duration::days(1);
        }
        days
    }

    /// Resolves a scheduling pattern name to allowed weekday indices.
    ///
    /// Unknown patterns fall back to the full Mon–Fri week.
    pub fn pattern_weekdays(pattern: &str) -> Vec<u32> {
        match pattern {
            "5days" => vec![0, 1, 2, 3, 4],
            "4days_mt" => vec![0, 1, 2, 3],
            "4days_tf" => vec![1, 2, 3, 4],
            "3days_mw" => vec![0, 1, 2],
            "3days_wf" => vec![2, 3, 4],
            "2days_mt" => vec![0, 1],
            "2days_tf" => vec![3, 4],
            _ => vec![0, 1, 2, 3, 4],
        }
    }

    /// Validates holiday period ordering.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for holiday in &self.holidays {
            if holiday.start_date > holiday.end_date {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidHolidayPeriod,
                    format!(
                        "holiday '{}' starts {} but ends {}",
                        holiday.name, holiday.start_date, holiday.end_date
                    ),
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn winter_calendar() -> HolidayCalendar {
        HolidayCalendar::new("ay2025", "Academic Year 2025", 2025)
            .with_weekends_excluded()
            .with_holiday(d(2024, 12, 20), d(2025, 1, 10), "Winter Break")
    }

    #[test]
    fn test_is_holiday() {
        let cal = winter_calendar();
        assert!(cal.is_holiday(d(2024, 12, 25)));
        assert!(cal.is_holiday(d(2024, 12, 20)));
        assert!(cal.is_holiday(d(2025, 1, 10)));
        assert!(!cal.is_holiday(d(2025, 1, 11)));
    }

    #[test]
    fn test_schedulable_day() {
        let cal = winter_calendar();
        // 2025-01-13 is a Monday after the break
        assert!(cal.is_schedulable_day(d(2025, 1, 13)));
        // Saturday excluded
        assert!(!cal.is_schedulable_day(d(2025, 1, 18)));
        // Inside the break
        assert!(!cal.is_schedulable_day(d(2025, 1, 6)));
    }

    #[test]
    fn test_academic_weeks_skip_holiday_weeks() {
        let cal = winter_calendar();
        // 2024-12-16 (Mon) through 2025-01-17 (Fri):
        // week of Dec 16 survives (Mon-Thu are regular days),
        // weeks of Dec 23, Dec 30, Jan 6 are fully inside the break,
        // week of Jan 13 survives.
        let weeks = cal.academic_weeks(d(2024, 12, 16), d(2025, 1, 17));
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0], (d(2024, 12, 16), d(2024, 12, 20)));
        assert_eq!(weeks[1], (d(2025, 1, 13), d(2025, 1, 17)));
    }

    #[test]
    fn test_academic_weeks_clamped_to_range() {
        let cal = HolidayCalendar::unrestricted();
        // Wednesday start: the leading partial week is kept and clamped
        let weeks = cal.academic_weeks(d(2025, 1, 8), d(2025, 1, 17));
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0], (d(2025, 1, 8), d(2025, 1, 10)));
        assert_eq!(weeks[1], (d(2025, 1, 13), d(2025, 1, 17)));
    }

    #[test]
    fn test_single_day_range() {
        let cal = HolidayCalendar::unrestricted();
        let weeks = cal.academic_weeks(d(2025, 1, 6), d(2025, 1, 6));
        assert_eq!(weeks, vec![(d(2025, 1, 6), d(2025, 1, 6))]);
    }

    #[test]
    fn test_pattern_weekdays() {
        assert_eq!(HolidayCalendar::pattern_weekdays("5days"), vec![0, 1, 2, 3, 4]);
        assert_eq!(HolidayCalendar::pattern_weekdays("3days_mw"), vec![0, 1, 2]);
        assert_eq!(HolidayCalendar::pattern_weekdays("2days_tf"), vec![3, 4]);
        // Unknown patterns fall back to Mon-Fri
        assert_eq!(HolidayCalendar::pattern_weekdays("nonsense"), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_schedulable_days_excludes_weekends_and_holidays() {
        let cal = winter_calendar();
        let days = cal.schedulable_days(d(2025, 1, 6), d(2025, 1, 17));
        // Jan 6-10 are holidays; Jan 11-12 is a weekend; Jan 13-17 survive
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], d(2025, 1, 13));
        assert_eq!(days[4], d(2025, 1, 17));
    }

    #[test]
    fn test_validate_bad_period() {
        let cal = HolidayCalendar::new("x", "X", 2025).with_holiday(
            d(2025, 3, 10),
            d(2025, 3, 1),
            "Backwards",
        );
        let errors = cal.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidHolidayPeriod);
    }
}
