//! Occurrence generation and spreading.
//!
//! For one session request the spreader produces `number_of_occurrences`
//! concrete dates distributed across the request's date window:
//!
//! 1. Partition the window into academic weeks (Mon–Fri blocks), dropping
//!    weeks that are entirely holidays.
//! 2. Resolve the scheduling pattern to allowed weekdays.
//! 3. Enumerate candidate dates per week, filtering holidays when the
//!    request avoids them.
//! 4. Select a spread subset: a base quota of `occurrences ÷ weeks` per
//!    week, then remainder occurrences into the least-used weeks.
//!    Candidate scoring favors earlier weekdays, penalizes adjacent-week
//!    clustering, rewards satisfying the minimum gap, and penalizes
//!    exceeding the per-week cap. Ties break by weekday order.
//! 5. When fewer candidates exist than occurrences, every candidate is
//!    used — the shortfall is never silently dropped below what exists.
//!
//! For each selected date, candidate start times are generated at
//! calendar-granularity boundaries inside an operating window (default
//! 09:00–17:00), filtered against the request's preferred time slots.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike};

use crate::models::{Calendar, HolidayCalendar, SessionRequest, DEFAULT_GRANULARITY_MINUTES};

/// Score bonus for satisfying the minimum-gap requirement.
const GAP_SATISFIED_BONUS: i32 = 5;
/// Score penalty for violating the minimum-gap requirement.
const GAP_VIOLATED_PENALTY: i32 = -5;
/// Score penalty for landing in the week right after the last selection.
const ADJACENT_WEEK_PENALTY: i32 = -10;
/// Score bonus while the per-week cap still has room.
const UNDER_WEEK_CAP_BONUS: i32 = 3;
/// Score penalty for exceeding the per-week cap.
const OVER_WEEK_CAP_PENALTY: i32 = -10;

/// Spreads a request's occurrences across its date window.
#[derive(Debug, Clone)]
pub struct OccurrenceSpreader {
    holidays: HolidayCalendar,
    window_start: NaiveTime,
    window_end: NaiveTime,
}

impl OccurrenceSpreader {
    /// Creates a spreader; absent holiday calendars behave as
    /// unrestricted.
    pub fn new(holidays: Option<&HolidayCalendar>) -> Self {
        Self {
            holidays: holidays.cloned().unwrap_or_else(HolidayCalendar::unrestricted),
            window_start: NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
            window_end: NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is a valid time"),
        }
    }

    /// Overrides the daily operating window (default 09:00–17:00).
    pub fn with_operating_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// Generates spread dates for one request, ascending.
    pub fn occurrence_dates(&self, request: &SessionRequest) -> Vec<NaiveDate> {
        let start = request.earliest_date.date_naive();
        let end = request.latest_date.date_naive();

        let weeks = self.holidays.academic_weeks(start, end);
        if weeks.is_empty() {
            return Vec::new();
        }

        let pattern = request.scheduling_pattern.as_deref().unwrap_or("5days");
        let pattern_days = HolidayCalendar::pattern_weekdays(pattern);

        let mut candidates = Vec::new();
        for (week_start, week_end) in &weeks {
            candidates.extend(self.pattern_dates_in_week(
                *week_start,
                *week_end,
                &pattern_days,
                request.avoid_holidays,
            ));
        }

        self.select_spread_dates(&candidates, request, &weeks)
    }

    /// Candidate start times on a date, at granularity boundaries inside
    /// the operating window, filtered by preferred time slots.
    pub fn start_times(
        &self,
        date: NaiveDate,
        request: &SessionRequest,
        calendar: Option<&Calendar>,
    ) -> Vec<DateTime<FixedOffset>> {
        let (offset, granularity) = match calendar {
            Some(c) => (c.offset(), c.granularity_minutes()),
            None => (
                FixedOffset::east_opt(0).expect("zero offset is valid"),
                DEFAULT_GRANULARITY_MINUTES,
            ),
        };

        let duration = request.duration_minutes as i64;
        let window_start = minutes_from_midnight(self.window_start);
        let window_end = minutes_from_midnight(self.window_end);
        let step = granularity as i64;

        let mut starts = Vec::new();
        // First boundary at or after the window opens
        let mut minute = (window_start + step - 1) / step * step;

        while minute + duration <= window_end {
            let Some(start_time) = time_at_minute(minute) else {
                break;
            };
            let Some(end_time) = time_at_minute(minute + duration) else {
                break;
            };

            if request.preferred_time_slots.is_empty()
                || request
                    .preferred_time_slots
                    .iter()
                    .any(|slot| slot.contains(start_time, end_time))
            {
                starts.push(DateTime::from_naive_utc_and_offset(
                    date.and_time(start_time) - offset,
                    offset,
                ));
            }

            minute += step;
        }

        starts
    }

    /// Valid pattern dates inside one week.
    fn pattern_dates_in_week(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
        pattern_days: &[u32],
        avoid_holidays: bool,
    ) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = week_start;
        while current <= week_end {
            let weekday = current.weekday().num_days_from_monday();
            if pattern_days.contains(&weekday)
                && !self.holidays.excluded_weekdays.contains(&weekday)
                && (!avoid_holidays || !self.holidays.is_holiday(current))
            {
                dates.push(current);
            }
            current += Duration::days(1);
        }
        dates
    }

    /// Selects `number_of_occurrences` dates maximizing spread.
    fn select_spread_dates(
        &self,
        candidates: &[NaiveDate],
        request: &SessionRequest,
        weeks: &[(NaiveDate, NaiveDate)],
    ) -> Vec<NaiveDate> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let needed = request.number_of_occurrences as usize;
        let dates_by_week: Vec<Vec<NaiveDate>> = weeks
            .iter()
            .map(|(ws, we)| {
                candidates
                    .iter()
                    .copied()
                    .filter(|d| ws <= d && d <= we)
                    .collect()
            })
            .collect();

        let mut selected: Vec<NaiveDate> = Vec::new();
        let mut per_week = vec![0usize; weeks.len()];

        // Base quota: occurrences ÷ weeks dates in every week
        let base = needed / weeks.len();
        for (week_idx, week_dates) in dates_by_week.iter().enumerate() {
            for _ in 0..base {
                match self.best_date_in_week(week_dates, &selected, request, false) {
                    Some(date) => {
                        selected.push(date);
                        per_week[week_idx] += 1;
                    }
                    None => break,
                }
            }
        }

        // Remainder (and any base-pass shortfall) into the least-used
        // weeks; degrades into using every remaining candidate
        while selected.len() < needed {
            let next_week = (0..weeks.len())
                .filter(|&w| {
                    self.best_date_in_week(&dates_by_week[w], &selected, request, true)
                        .is_some()
                })
                .min_by_key(|&w| (per_week[w], w));

            let Some(week_idx) = next_week else {
                break;
            };
            if let Some(date) =
                self.best_date_in_week(&dates_by_week[week_idx], &selected, request, true)
            {
                selected.push(date);
                per_week[week_idx] += 1;
            }
        }

        selected.sort();
        selected.truncate(needed);
        selected
    }

    /// Scores unused candidates in one week and returns the best.
    ///
    /// Ties break toward the earliest date because iteration is in
    /// ascending weekday order and only strictly better scores replace
    /// the current best.
    fn best_date_in_week(
        &self,
        week_dates: &[NaiveDate],
        selected: &[NaiveDate],
        request: &SessionRequest,
        allow_consecutive: bool,
    ) -> Option<NaiveDate> {
        let mut best: Option<(NaiveDate, i32)> = None;

        for &candidate in week_dates {
            if selected.contains(&candidate) {
                continue;
            }

            let mut score = 5 - candidate.weekday().num_days_from_monday() as i32;

            if !allow_consecutive {
                if let Some(&last) = selected.last() {
                    let weeks_apart = (candidate - last).num_days() / 7;
                    if weeks_apart < 1 {
                        score += ADJACENT_WEEK_PENALTY;
                    }
                }
            }

            if let Some(min_gap) = request.min_gap_days {
                let gap_ok = selected
                    .iter()
                    .all(|s| (candidate - *s).num_days().abs() >= min_gap as i64);
                score += if gap_ok {
                    GAP_SATISFIED_BONUS
                } else {
                    GAP_VIOLATED_PENALTY
                };
            }

            if let Some(max_per_week) = request.max_occurrences_per_week {
                let in_week = selected
                    .iter()
                    .filter(|s| week_number(**s) == week_number(candidate))
                    .count();
                score += if in_week < max_per_week as usize {
                    UNDER_WEEK_CAP_BONUS
                } else {
                    OVER_WEEK_CAP_PENALTY
                };
            }

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.map(|(date, _)| date)
    }
}

/// Week index since the start of the date's year.
fn week_number(date: NaiveDate) -> i64 {
    let year_start = NaiveDate::from_ymd_opt(date.year(), 1, 1).expect("January 1st exists");
    (date - year_start).num_days() / 7
}

fn minutes_from_midnight(time: NaiveTime) -> i64 {
    (time.num_seconds_from_midnight() / 60) as i64
}

fn time_at_minute(minute: i64) -> Option<NaiveTime> {
    NaiveTime::from_num_seconds_from_midnight_opt(u32::try_from(minute * 60).ok()?, 0)
}
