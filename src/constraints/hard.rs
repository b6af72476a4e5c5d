//! Built-in hard constraints.
//!
//! Hard constraints must never be violated in an accepted solution; the
//! solver rejects any candidate placement that fails one.

use chrono::{Datelike, Duration};

use super::{Constraint, ConstraintContext, Violation};
use crate::models::{Assignment, HolidayCalendar};

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Prevents double-booking of one resource.
pub struct NoOverlap {
    resource_id: String,
}

impl NoOverlap {
    /// Creates the constraint for one resource.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
        }
    }
}

impl Constraint for NoOverlap {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        _ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if !assignment.uses_resource(&self.resource_id) {
            return None;
        }

        for existing in solution {
            if existing.uses_resource(&self.resource_id) && assignment.overlaps(existing) {
                return Some(
                    Violation::new(
                        self.constraint_type(),
                        &assignment.request_id,
                        format!("Resource '{}' is double-booked", self.resource_id),
                    )
                    .with_resource(&self.resource_id),
                );
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.no_overlap"
    }
}

/// Keeps every occurrence inside its request's date window.
pub struct WithinDateRange {
    request_id: String,
}

impl WithinDateRange {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for WithinDateRange {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }
        let request = ctx.request(&self.request_id)?;

        if assignment.start_time < request.earliest_date
            || assignment.end_time > request.latest_date
        {
            return Some(Violation::new(
                self.constraint_type(),
                &self.request_id,
                format!(
                    "assignment outside date range [{}, {}]",
                    request.earliest_date, request.latest_date
                ),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.within_date_range"
    }
}

/// Respects a calendar's availability windows and blackout periods.
pub struct BlackoutDates {
    calendar_id: String,
}

impl BlackoutDates {
    /// Creates the constraint for one calendar.
    pub fn new(calendar_id: impl Into<String>) -> Self {
        Self {
            calendar_id: calendar_id.into(),
        }
    }
}

impl Constraint for BlackoutDates {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        let calendar = ctx.calendar(&self.calendar_id)?;
        if !calendar.is_available(assignment.start_time, assignment.end_time) {
            return Some(Violation::new(
                self.constraint_type(),
                &assignment.request_id,
                format!(
                    "assignment falls in a blackout period of calendar '{}'",
                    self.calendar_id
                ),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.blackout_dates"
    }
}

/// Caps how many sessions one resource may host per day.
pub struct MaxPerDay {
    resource_id: String,
    max_per_day: usize,
}

impl MaxPerDay {
    /// Creates the constraint for one resource.
    pub fn new(resource_id: impl Into<String>, max_per_day: usize) -> Self {
        Self {
            resource_id: resource_id.into(),
            max_per_day,
        }
    }
}

impl Constraint for MaxPerDay {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        _ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if !assignment.uses_resource(&self.resource_id) {
            return None;
        }

        let day = assignment.start_time.date_naive();
        let existing = solution
            .iter()
            .filter(|a| a.start_time.date_naive() == day && a.uses_resource(&self.resource_id))
            .count();

        if existing + 1 > self.max_per_day {
            return Some(
                Violation::new(
                    self.constraint_type(),
                    &assignment.request_id,
                    format!(
                        "Resource '{}' exceeds daily limit of {}",
                        self.resource_id, self.max_per_day
                    ),
                )
                .with_resource(&self.resource_id),
            );
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.max_per_day"
    }
}

/// Enforces spacing between occurrences of one request.
pub struct MinGapBetweenOccurrences {
    request_id: String,
    min_gap: Duration,
}

impl MinGapBetweenOccurrences {
    /// Creates the constraint with a gap in days.
    pub fn new(request_id: impl Into<String>, min_gap_days: i64) -> Self {
        Self {
            request_id: request_id.into(),
            min_gap: Duration::days(min_gap_days),
        }
    }
}

impl Constraint for MinGapBetweenOccurrences {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        _ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }

        for existing in solution.iter().filter(|a| a.request_id == self.request_id) {
            let gap = if existing.end_time <= assignment.start_time {
                assignment.start_time - existing.end_time
            } else if assignment.end_time <= existing.start_time {
                existing.start_time - assignment.end_time
            } else {
                // Overlap is NoOverlap's concern
                continue;
            };

            if gap < self.min_gap {
                return Some(Violation::new(
                    self.constraint_type(),
                    &self.request_id,
                    format!(
                        "gap between occurrences is {} hour(s), minimum is {} day(s)",
                        gap.num_hours(),
                        self.min_gap.num_days()
                    ),
                ));
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.min_gap_between_occurrences"
    }
}

/// Verifies that every assigned resource satisfies the request's
/// required attributes.
pub struct AttributeMatch {
    request_id: String,
}

impl AttributeMatch {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for AttributeMatch {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }
        let request = ctx.request(&self.request_id)?;
        if request.required_attributes.is_empty() {
            return None;
        }

        for resource_id in assignment.resource_ids() {
            let Some(resource) = ctx.resource(resource_id) else {
                continue;
            };
            if !resource.satisfies(&request.required_attributes) {
                return Some(
                    Violation::new(
                        self.constraint_type(),
                        &self.request_id,
                        format!(
                            "Resource '{resource_id}' is missing required equipment or attributes"
                        ),
                    )
                    .with_resource(resource_id),
                );
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.attribute_match"
    }
}

/// Fits enrollment into assigned room capacity, honoring bounds.
pub struct RoomCapacity {
    request_id: String,
}

impl RoomCapacity {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for RoomCapacity {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }
        let request = ctx.request(&self.request_id)?;

        for resource_id in assignment.resource_ids() {
            let Some(resource) = ctx.resource(resource_id) else {
                continue;
            };
            if resource.capacity.is_none() {
                continue;
            }
            if !resource.fits_enrollment(
                request.enrollment_count,
                request.min_capacity,
                request.max_capacity,
            ) {
                return Some(
                    Violation::new(
                        self.constraint_type(),
                        &self.request_id,
                        format!(
                            "Resource '{resource_id}' capacity {} cannot fit enrollment of {} \
                             or exceeds the acceptable bounds",
                            resource.capacity.unwrap_or(0),
                            request.enrollment_count
                        ),
                    )
                    .with_resource(resource_id),
                );
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.room_capacity"
    }
}

/// Keeps occurrences on the weekdays allowed by the request's
/// scheduling pattern. Requests without a pattern default to Mon–Fri.
pub struct SchedulingPattern {
    request_id: String,
}

impl SchedulingPattern {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for SchedulingPattern {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }
        let request = ctx.request(&self.request_id)?;

        let weekday = assignment.start_time.weekday().num_days_from_monday();
        let pattern = request.scheduling_pattern.as_deref().unwrap_or("5days");
        let allowed = HolidayCalendar::pattern_weekdays(pattern);

        if !allowed.contains(&weekday) {
            return Some(Violation::new(
                self.constraint_type(),
                &self.request_id,
                format!(
                    "assignment on {} does not match pattern '{}'",
                    WEEKDAY_NAMES[weekday as usize], pattern
                ),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.scheduling_pattern"
    }
}

/// Keeps occurrences off holiday dates for requests that ask for it.
pub struct HolidayAvoidance {
    request_id: String,
}

impl HolidayAvoidance {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for HolidayAvoidance {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }
        let request = ctx.request(&self.request_id)?;
        if !request.avoid_holidays {
            return None;
        }
        let holidays = ctx.holiday_calendar?;

        let date = assignment.start_time.date_naive();
        if holidays.is_holiday(date) {
            return Some(Violation::new(
                self.constraint_type(),
                &self.request_id,
                format!("assignment on {date} falls in a holiday period"),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.holiday_avoidance"
    }
}

/// Keeps sessions clear of institutional time blocks (lunch breaks,
/// common exam slots).
pub struct InstitutionalTimeBlock;

impl InstitutionalTimeBlock {
    /// Creates the constraint.
    pub fn new() -> Self {
        Self
    }
}

impl Default for InstitutionalTimeBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Constraint for InstitutionalTimeBlock {
    fn check(
        &self,
        assignment: &Assignment,
        _solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        let blocker = ctx.time_blocker?;
        let date = assignment.start_time.date_naive();
        let start = assignment.start_time.time();
        let end = assignment.end_time.time();

        if let Some(block_name) = blocker.blocking(date, start, end) {
            return Some(Violation::new(
                self.constraint_type(),
                &assignment.request_id,
                format!("session conflicts with '{block_name}'"),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "hard.time_block"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Calendar, Problem, Resource, SessionRequest, TimeBlock, TimeBlocker,
    };
    use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn assignment_at(request_id: &str, start: DateTime<FixedOffset>, minutes: i64) -> Assignment {
        Assignment::new(request_id, 0, start, start + Duration::minutes(minutes))
            .with_resource("room", "R1")
    }

    struct Fixture {
        problem: Problem,
    }

    impl Fixture {
        fn new(problem: Problem) -> Self {
            Self { problem }
        }

        fn check<C: Constraint>(
            &self,
            constraint: &C,
            assignment: &Assignment,
            solution: &[Assignment],
        ) -> Option<Violation> {
            let indices = self.problem.build_indices();
            let ctx = ConstraintContext::new(
                &indices,
                self.problem.holiday_calendar.as_ref(),
                self.problem.time_blocker.as_ref(),
                self.problem.institutional_calendar_id.as_deref(),
            );
            constraint.check(assignment, solution, &ctx)
        }
    }

    fn base_request(id: &str) -> SessionRequest {
        SessionRequest::new(id, utc(2025, 1, 6, 0, 0), utc(2025, 3, 28, 23, 0))
            .with_duration_minutes(120)
    }

    #[test]
    fn test_no_overlap_detects_double_booking() {
        let fixture = Fixture::new(Problem::new());
        let constraint = NoOverlap::new("R1");

        let existing = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 120);
        let overlapping = assignment_at("CS102", utc(2025, 1, 6, 10, 0), 120);
        let adjacent = assignment_at("CS103", utc(2025, 1, 6, 11, 0), 60);

        let v = fixture.check(&constraint, &overlapping, &[existing.clone()]);
        assert!(v.is_some());
        assert_eq!(v.unwrap().affected_resource_id.as_deref(), Some("R1"));

        assert!(fixture.check(&constraint, &adjacent, &[existing]).is_none());
    }

    #[test]
    fn test_no_overlap_ignores_other_resources() {
        let fixture = Fixture::new(Problem::new());
        let constraint = NoOverlap::new("R2");

        let existing = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 120);
        let candidate = assignment_at("CS102", utc(2025, 1, 6, 9, 0), 120);
        assert!(fixture.check(&constraint, &candidate, &[existing]).is_none());
    }

    #[test]
    fn test_within_date_range() {
        let fixture = Fixture::new(Problem::new().with_request(base_request("CS101")));
        let constraint = WithinDateRange::new("CS101");

        let inside = assignment_at("CS101", utc(2025, 2, 3, 9, 0), 120);
        assert!(fixture.check(&constraint, &inside, &[]).is_none());

        let too_early = assignment_at("CS101", utc(2024, 12, 30, 9, 0), 120);
        assert!(fixture.check(&constraint, &too_early, &[]).is_some());

        let too_late = assignment_at("CS101", utc(2025, 3, 28, 22, 30), 120);
        assert!(fixture.check(&constraint, &too_late, &[]).is_some());
    }

    #[test]
    fn test_blackout_dates() {
        let calendar = Calendar::new("main")
            .with_blackout(utc(2025, 1, 6, 0, 0), utc(2025, 1, 7, 0, 0));
        let fixture = Fixture::new(Problem::new().with_calendar(calendar));
        let constraint = BlackoutDates::new("main");

        let blocked = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 120);
        assert!(fixture.check(&constraint, &blocked, &[]).is_some());

        let clear = assignment_at("CS101", utc(2025, 1, 8, 9, 0), 120);
        assert!(fixture.check(&constraint, &clear, &[]).is_none());
    }

    #[test]
    fn test_max_per_day() {
        let fixture = Fixture::new(Problem::new());
        let constraint = MaxPerDay::new("R1", 2);

        let first = assignment_at("A", utc(2025, 1, 6, 9, 0), 60);
        let second = assignment_at("B", utc(2025, 1, 6, 11, 0), 60);
        let third = assignment_at("C", utc(2025, 1, 6, 14, 0), 60);

        assert!(fixture.check(&constraint, &second, &[first.clone()]).is_none());
        let v = fixture.check(&constraint, &third, &[first.clone(), second]);
        assert!(v.is_some());
        assert!(v.unwrap().message.contains("exceeds daily limit"));

        // A different day resets the count
        let next_day = assignment_at("D", utc(2025, 1, 7, 9, 0), 60);
        assert!(fixture.check(&constraint, &next_day, &[first]).is_none());
    }

    #[test]
    fn test_min_gap_between_occurrences() {
        let fixture = Fixture::new(Problem::new());
        let constraint = MinGapBetweenOccurrences::new("CS101", 2);

        let first = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 60);
        let too_close = assignment_at("CS101", utc(2025, 1, 7, 9, 0), 60);
        let far_enough = assignment_at("CS101", utc(2025, 1, 9, 9, 0), 60);
        let other_request = assignment_at("CS999", utc(2025, 1, 6, 11, 0), 60);

        assert!(fixture.check(&constraint, &too_close, &[first.clone()]).is_some());
        assert!(fixture.check(&constraint, &far_enough, &[first.clone()]).is_none());
        assert!(fixture.check(&constraint, &other_request, &[first]).is_none());
    }

    #[test]
    fn test_attribute_match() {
        let problem = Problem::new()
            .with_request(base_request("CS101").with_required_attribute("projector", true))
            .with_resource(Resource::room("R1"))
            .with_resource(Resource::room("R2").with_attribute("projector", true));
        let fixture = Fixture::new(problem);
        let constraint = AttributeMatch::new("CS101");

        let bad = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 60);
        let v = fixture.check(&constraint, &bad, &[]);
        assert!(v.is_some());

        let good = Assignment::new("CS101", 0, utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 10, 0))
            .with_resource("room", "R2");
        assert!(fixture.check(&constraint, &good, &[]).is_none());
    }

    #[test]
    fn test_room_capacity() {
        let problem = Problem::new()
            .with_request(base_request("CS101").with_enrollment(100))
            .with_resource(Resource::room("R1").with_capacity(50));
        let fixture = Fixture::new(problem);
        let constraint = RoomCapacity::new("CS101");

        let a = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 60);
        let v = fixture.check(&constraint, &a, &[]).unwrap();
        assert!(v.message.contains("cannot fit"));
    }

    #[test]
    fn test_scheduling_pattern() {
        let problem = Problem::new().with_request(base_request("CS101").with_pattern("3days_mw"));
        let fixture = Fixture::new(problem);
        let constraint = SchedulingPattern::new("CS101");

        // 2025-01-06 is a Monday, 2025-01-09 is a Thursday
        let monday = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 60);
        assert!(fixture.check(&constraint, &monday, &[]).is_none());

        let thursday = assignment_at("CS101", utc(2025, 1, 9, 9, 0), 60);
        let v = fixture.check(&constraint, &thursday, &[]).unwrap();
        assert!(v.message.contains("Thursday"));
    }

    #[test]
    fn test_default_pattern_rejects_weekends() {
        let problem = Problem::new().with_request(base_request("CS101"));
        let fixture = Fixture::new(problem);
        let constraint = SchedulingPattern::new("CS101");

        // 2025-01-11 is a Saturday
        let saturday = assignment_at("CS101", utc(2025, 1, 11, 9, 0), 60);
        assert!(fixture.check(&constraint, &saturday, &[]).is_some());
    }

    #[test]
    fn test_holiday_avoidance() {
        let holidays = HolidayCalendar::new("ay", "AY", 2025).with_holiday(
            chrono::NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            "Winter Break",
        );
        let problem = Problem::new()
            .with_request(base_request("CS101").with_avoid_holidays(true))
            .with_holiday_calendar(holidays);
        let fixture = Fixture::new(problem);
        let constraint = HolidayAvoidance::new("CS101");

        let inside = assignment_at("CS101", utc(2025, 1, 8, 9, 0), 60);
        assert!(fixture.check(&constraint, &inside, &[]).is_some());

        let outside = assignment_at("CS101", utc(2025, 1, 13, 9, 0), 60);
        assert!(fixture.check(&constraint, &outside, &[]).is_none());
    }

    #[test]
    fn test_holiday_avoidance_disabled() {
        let holidays = HolidayCalendar::new("ay", "AY", 2025).with_holiday(
            chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            "Break",
        );
        let problem = Problem::new()
            .with_request(base_request("CS101"))
            .with_holiday_calendar(holidays);
        let fixture = Fixture::new(problem);
        let constraint = HolidayAvoidance::new("CS101");

        let inside = assignment_at("CS101", utc(2025, 1, 8, 9, 0), 60);
        assert!(fixture.check(&constraint, &inside, &[]).is_none());
    }

    #[test]
    fn test_institutional_time_block() {
        let blocker = TimeBlocker::new("campus").with_block(TimeBlock::new(
            "Lunch Break",
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            [0, 1, 2, 3, 4],
        ));
        let problem = Problem::new().with_time_blocker(blocker);
        let fixture = Fixture::new(problem);
        let constraint = InstitutionalTimeBlock::new();

        let spans_lunch = assignment_at("CS101", utc(2025, 1, 6, 11, 30), 120);
        let v = fixture.check(&constraint, &spans_lunch, &[]).unwrap();
        assert!(v.message.contains("Lunch Break"));

        let morning = assignment_at("CS101", utc(2025, 1, 6, 9, 0), 120);
        assert!(fixture.check(&constraint, &morning, &[]).is_none());
    }
}
