//! Greedy heuristic solver.
//!
//! # Algorithm
//!
//! 1. Validate, canonicalize, and index the problem.
//! 2. Order requests by priority: longer sessions first (duration
//!    tiers), then earlier deadlines, then id.
//! 3. Per request, generate spread occurrence dates; per occurrence,
//!    enumerate `(start time, resource combination)` candidates and
//!    shuffle them with the seeded RNG.
//! 4. Accept the first candidate with zero hard violations, append it
//!    to the partial solution, and book the occupancy index.
//! 5. On an unplaceable occurrence: with `fallback`, leave the
//!    request's remaining occurrences unscheduled and continue;
//!    without it, the whole solve is infeasible.
//!
//! The seed is the only source of non-determinism: identical
//! `(problem, seed)` inputs produce identical assignment lists.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::{SolverBackend, SolverLimits};
use crate::constraints::{ConstraintContext, Violation};
use crate::diagnostics::ConflictScorer;
use crate::error::SolveError;
use crate::models::{
    Assignment, Calendar, Modality, OccupiedInterval, Problem, ProblemIndices, SessionRequest,
    SolveResult, SolveStatus,
};
use crate::objectives::MultiObjective;
use crate::spread::OccurrenceSpreader;

/// How many rejected-candidate violations are kept per failed
/// occurrence; the rest would repeat the same few conflicts.
const MAX_RECORDED_REJECTIONS: usize = 5;

/// The greedy heuristic engine.
#[derive(Debug, Clone)]
pub struct HeuristicSolver {
    limits: SolverLimits,
    operating_window: (NaiveTime, NaiveTime),
}

impl HeuristicSolver {
    /// Creates a solver with no budget and the default 09:00–17:00
    /// operating window.
    pub fn new() -> Self {
        Self {
            limits: SolverLimits::none(),
            operating_window: (
                NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
                NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is a valid time"),
            ),
        }
    }

    /// Sets the time/iteration budget.
    pub fn with_limits(mut self, limits: SolverLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Overrides the daily operating window.
    pub fn with_operating_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.operating_window = (start, end);
        self
    }

    fn run(
        &self,
        problem: &Problem,
        seed: Option<u64>,
        fallback: bool,
    ) -> Result<SolveResult, SolveError> {
        let started = Instant::now();

        let validation_errors = problem.validate();
        if !validation_errors.is_empty() {
            return Err(SolveError::Validation(validation_errors));
        }

        let mut problem = problem.clone();
        problem.canonicalize();
        let indices = problem.build_indices();
        let ctx = ConstraintContext::new(
            &indices,
            problem.holiday_calendar.as_ref(),
            problem.time_blocker.as_ref(),
            problem.institutional_calendar_id.as_deref(),
        );
        let institutional_calendar = ctx.institutional_calendar();

        let seed_used = seed.unwrap_or(0);
        let mut rng = SmallRng::seed_from_u64(seed_used);

        let spreader = OccurrenceSpreader::new(problem.holiday_calendar.as_ref())
            .with_operating_window(self.operating_window.0, self.operating_window.1);

        let mut solution: Vec<Assignment> = problem.locked_assignments.clone();
        let mut produced: Vec<Assignment> = Vec::new();
        let mut occupancy: HashMap<String, Vec<OccupiedInterval>> =
            indices.locked_occupancy.clone();
        let mut violations: Vec<Violation> = Vec::new();
        let mut scheduled: HashMap<String, u32> = HashMap::new();
        let mut iterations: u64 = 0;
        let mut infeasible = false;

        info!(
            requests = problem.requests.len(),
            resources = problem.resources.len(),
            seed = seed_used,
            fallback,
            "starting heuristic solve"
        );

        let ordered = order_requests(&problem.requests);
        'requests: for request in ordered {
            let dates = spreader.occurrence_dates(request);
            debug!(
                request = %request.id,
                occurrences = request.number_of_occurrences,
                candidate_dates = dates.len(),
                "generated occurrence dates"
            );

            for occurrence in 0..request.number_of_occurrences {
                if self.limits.exceeded(started, iterations) {
                    warn!(
                        request = %request.id,
                        iterations,
                        "solve budget exhausted, remaining occurrences left unscheduled"
                    );
                    break 'requests;
                }
                iterations += 1;

                let placed = match dates.get(occurrence as usize) {
                    Some(&date) => self.place_occurrence(
                        request,
                        occurrence,
                        date,
                        &spreader,
                        institutional_calendar,
                        &indices,
                        &ctx,
                        &problem,
                        &solution,
                        &occupancy,
                        &mut rng,
                        &mut violations,
                    ),
                    None => {
                        violations.push(Violation::new(
                            "solver.no_candidate_date",
                            &request.id,
                            format!(
                                "no candidate date available for occurrence {occurrence} of '{}'",
                                request.id
                            ),
                        ));
                        None
                    }
                };

                match placed {
                    Some(assignment) => {
                        for constraint in problem.constraints.iter().filter(|c| !c.is_hard()) {
                            if let Some(violation) = constraint.check(&assignment, &solution, &ctx)
                            {
                                violations.push(violation);
                            }
                        }
                        self.book(&mut occupancy, &assignment, &ctx);
                        *scheduled.entry(request.id.clone()).or_insert(0) += 1;
                        solution.push(assignment.clone());
                        produced.push(assignment);
                    }
                    None => {
                        warn!(
                            request = %request.id,
                            occurrence,
                            "no feasible candidate for occurrence"
                        );
                        if !fallback {
                            infeasible = true;
                            break 'requests;
                        }
                        break;
                    }
                }
            }
        }

        if infeasible {
            produced.clear();
            scheduled.clear();
        }

        let mut unscheduled = Vec::new();
        for request in &problem.requests {
            let done = scheduled.get(&request.id).copied().unwrap_or(0);
            for _ in done..request.number_of_occurrences {
                unscheduled.push(request.id.clone());
            }
        }

        let status = if infeasible {
            SolveStatus::Infeasible
        } else if unscheduled.is_empty() {
            SolveStatus::Feasible
        } else {
            SolveStatus::Partial
        };

        let objective_score = if problem.objectives.is_empty() {
            None
        } else {
            Some(MultiObjective::from_objectives(&problem.objectives).weighted_sum(&produced))
        };

        let diagnostics = if violations.is_empty() && unscheduled.is_empty() {
            None
        } else {
            Some(ConflictScorer::new().build_report(&violations, unscheduled.clone()))
        };

        let solve_time_seconds = started.elapsed().as_secs_f64();
        info!(
            status = %status,
            assignments = produced.len(),
            unscheduled = unscheduled.len(),
            elapsed_seconds = solve_time_seconds,
            "heuristic solve finished"
        );

        Ok(SolveResult {
            status,
            assignments: produced,
            unscheduled_requests: unscheduled,
            objective_score,
            backend_used: self.backend_name().to_string(),
            seed_used: Some(seed_used),
            solve_time_seconds,
            diagnostics,
        })
    }

    /// Tries every shuffled `(start, resource combination)` candidate
    /// for one occurrence; returns the first that passes every hard
    /// check. Rejection violations are recorded only when the whole
    /// occurrence fails.
    #[allow(clippy::too_many_arguments)]
    fn place_occurrence(
        &self,
        request: &SessionRequest,
        occurrence: u32,
        date: NaiveDate,
        spreader: &OccurrenceSpreader,
        calendar: Option<&Calendar>,
        indices: &ProblemIndices,
        ctx: &ConstraintContext<'_>,
        problem: &Problem,
        solution: &[Assignment],
        occupancy: &HashMap<String, Vec<OccupiedInterval>>,
        rng: &mut SmallRng,
        violations: &mut Vec<Violation>,
    ) -> Option<Assignment> {
        let starts = spreader.start_times(date, request, calendar);
        let combinations = resource_combinations(request, indices);

        if starts.is_empty() || combinations.is_empty() {
            violations.push(Violation::new(
                "solver.no_qualified_candidates",
                &request.id,
                format!(
                    "occurrence {occurrence} of '{}' on {date} has {} start time(s) and {} \
                     qualified resource combination(s)",
                    request.id,
                    starts.len(),
                    combinations.len()
                ),
            ));
            return None;
        }

        let mut candidates: Vec<(DateTime<FixedOffset>, usize)> = starts
            .iter()
            .flat_map(|&start| (0..combinations.len()).map(move |index| (start, index)))
            .collect();
        candidates.shuffle(rng);

        let mut rejected: Vec<Violation> = Vec::new();
        for (start, combination_index) in candidates {
            let assignment = Assignment::new(&request.id, occurrence, start, start + request.duration())
                .with_cohort(request.cohort_id.clone())
                .with_resources(combinations[combination_index].clone());

            match self.first_hard_violation(&assignment, request, solution, occupancy, ctx, problem)
            {
                Some(violation) => {
                    if rejected.len() < MAX_RECORDED_REJECTIONS {
                        rejected.push(violation);
                    }
                }
                None => return Some(assignment),
            }
        }

        violations.append(&mut rejected);
        violations.push(Violation::new(
            "solver.no_feasible_candidate",
            &request.id,
            format!(
                "every candidate for occurrence {occurrence} of '{}' on {date} violates a hard \
                 constraint",
                request.id
            ),
        ));
        None
    }

    /// Built-in hard checks plus the problem's hard constraints.
    fn first_hard_violation(
        &self,
        assignment: &Assignment,
        request: &SessionRequest,
        solution: &[Assignment],
        occupancy: &HashMap<String, Vec<OccupiedInterval>>,
        ctx: &ConstraintContext<'_>,
        problem: &Problem,
    ) -> Option<Violation> {
        if assignment.start_time < request.earliest_date
            || assignment.end_time > request.latest_date
        {
            return Some(Violation::new(
                "hard.within_date_range",
                &request.id,
                format!(
                    "assignment outside date range [{}, {}]",
                    request.earliest_date, request.latest_date
                ),
            ));
        }

        // The spreader already filters holiday dates; this guards
        // constraint-supplied candidates and locked-date edge cases.
        if request.avoid_holidays {
            if let Some(holidays) = ctx.holiday_calendar {
                let date = assignment.start_time.date_naive();
                if holidays.is_holiday(date) {
                    return Some(Violation::new(
                        "hard.holiday_avoidance",
                        &request.id,
                        format!("assignment on {date} falls in a holiday period"),
                    ));
                }
            }
        }

        if let Some(blocker) = ctx.time_blocker {
            if let Some(block_name) = blocker.blocking(
                assignment.start_time.date_naive(),
                assignment.start_time.time(),
                assignment.end_time.time(),
            ) {
                return Some(Violation::new(
                    "hard.time_block",
                    &request.id,
                    format!("session conflicts with '{block_name}'"),
                ));
            }
        }

        let (setup_minutes, cleanup_minutes) = self.booking_buffers(request, ctx);
        let padded_start = assignment.start_time - Duration::minutes(setup_minutes);
        let padded_end = assignment.end_time + Duration::minutes(cleanup_minutes);

        for (resource_type, ids) in &assignment.assigned_resources {
            for id in ids {
                if let Some(resource) = ctx.resource(id) {
                    if let Some(calendar_id) = &resource.availability_calendar_id {
                        if let Some(calendar) = ctx.calendar(calendar_id) {
                            if !calendar.is_available(assignment.start_time, assignment.end_time) {
                                return Some(
                                    Violation::new(
                                        "hard.blackout_dates",
                                        &request.id,
                                        format!(
                                            "Resource '{id}' is unavailable in calendar \
                                             '{calendar_id}'"
                                        ),
                                    )
                                    .with_resource(id),
                                );
                            }
                        }
                    }
                }

                if let Some(intervals) = occupancy.get(id.as_str()) {
                    if intervals
                        .iter()
                        .any(|(start, end)| padded_start < *end && padded_end > *start)
                    {
                        return Some(
                            Violation::new(
                                "hard.no_overlap",
                                &request.id,
                                format!("Resource '{id}' ({resource_type}) is double-booked"),
                            )
                            .with_resource(id),
                        );
                    }
                }
            }
        }

        for constraint in problem.constraints.iter().filter(|c| c.is_hard()) {
            if let Some(violation) = constraint.check(assignment, solution, ctx) {
                return Some(violation);
            }
        }

        None
    }

    /// Setup/cleanup padding from the request's teacher, in minutes.
    fn booking_buffers(&self, request: &SessionRequest, ctx: &ConstraintContext<'_>) -> (i64, i64) {
        request
            .teacher_id
            .as_deref()
            .and_then(|id| ctx.teacher(id))
            .map(|t| (t.setup_minutes as i64, t.cleanup_minutes as i64))
            .unwrap_or((0, 0))
    }

    /// Books an accepted assignment into the occupancy index, padded
    /// with the teacher's buffers.
    fn book(
        &self,
        occupancy: &mut HashMap<String, Vec<OccupiedInterval>>,
        assignment: &Assignment,
        ctx: &ConstraintContext<'_>,
    ) {
        let (setup_minutes, cleanup_minutes) = ctx
            .request(&assignment.request_id)
            .map(|request| self.booking_buffers(request, ctx))
            .unwrap_or((0, 0));

        let start = assignment.start_time - Duration::minutes(setup_minutes);
        let end = assignment.end_time + Duration::minutes(cleanup_minutes);

        for id in assignment.resource_ids() {
            occupancy.entry(id.clone()).or_default().push((start, end));
        }
    }
}

impl Default for HeuristicSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for HeuristicSolver {
    fn solve(
        &self,
        problem: &Problem,
        seed: Option<u64>,
        fallback: bool,
    ) -> Result<SolveResult, SolveError> {
        self.run(problem, seed, fallback)
    }

    fn backend_name(&self) -> &'static str {
        "heuristic"
    }
}

/// Duration-derived priority tier; longer sessions rank higher.
fn priority_tier(request: &SessionRequest) -> u8 {
    if request.duration_minutes >= 180 {
        4
    } else if request.duration_minutes >= 120 {
        3
    } else if request.duration_minutes >= 90 {
        2
    } else {
        1
    }
}

/// Requests ordered by descending priority tier, then earlier deadline,
/// then id.
fn order_requests(requests: &[SessionRequest]) -> Vec<&SessionRequest> {
    let mut ordered: Vec<&SessionRequest> = requests.iter().collect();
    ordered.sort_by(|a, b| {
        priority_tier(b)
            .cmp(&priority_tier(a))
            .then_with(|| a.latest_date.cmp(&b.latest_date))
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}

/// Every way to fill the request's resource demand from qualified
/// resources, as resource-type → chosen ids maps.
fn resource_combinations(
    request: &SessionRequest,
    indices: &ProblemIndices,
) -> Vec<BTreeMap<String, Vec<String>>> {
    let empty = Vec::new();
    let qualified = indices
        .qualified_resources
        .get(&request.id)
        .unwrap_or(&empty);

    let mut per_type: Vec<(String, Vec<Vec<String>>)> = Vec::new();
    for (resource_type, count) in request.resource_demand() {
        if count == 0 {
            continue;
        }

        let pool: Vec<String> = qualified
            .iter()
            .filter(|id| {
                let Some(resource) = indices.resources.get(id.as_str()) else {
                    return false;
                };
                if !resource.can_serve_as(&resource_type) {
                    return false;
                }
                if let (Some(required_building), Some(building)) = (
                    request.required_building_id.as_deref(),
                    resource.building_id.as_deref(),
                ) {
                    if building != required_building {
                        return false;
                    }
                }
                if let Some(role) = resource.fallback_role(&resource_type) {
                    if let Some(min_capacity) = role.min_capacity {
                        if request.enrollment_count < min_capacity {
                            return false;
                        }
                    }
                }
                if request.modality != Modality::Online
                    && !resource.fits_enrollment(
                        request.enrollment_count,
                        request.min_capacity,
                        request.max_capacity,
                    )
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        let combinations = k_combinations(&pool, count as usize);
        if combinations.is_empty() {
            return Vec::new();
        }
        per_type.push((resource_type, combinations));
    }

    let mut result: Vec<BTreeMap<String, Vec<String>>> = vec![BTreeMap::new()];
    for (resource_type, combinations) in per_type {
        let mut next = Vec::with_capacity(result.len() * combinations.len());
        for base in &result {
            for combination in &combinations {
                let mut map = base.clone();
                map.insert(resource_type.clone(), combination.clone());
                next.push(map);
            }
        }
        result = next;
    }
    result
}

/// All k-element combinations of `items`, in lexicographic index order.
fn k_combinations(items: &[String], k: usize) -> Vec<Vec<String>> {
    let n = items.len();
    if k == 0 {
        return vec![Vec::new()];
    }
    if k > n {
        return Vec::new();
    }

    let mut indexes: Vec<usize> = (0..k).collect();
    let mut result = Vec::new();
    loop {
        result.push(indexes.iter().map(|&i| items[i].clone()).collect());

        let mut position = k;
        loop {
            if position == 0 {
                return result;
            }
            position -= 1;
            if indexes[position] < n - k + position {
                indexes[position] += 1;
                for next in position + 1..k {
                    indexes[next] = indexes[next - 1] + 1;
                }
                break;
            }
            if position == 0 {
                return result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HolidayCalendar, Resource, Teacher};
    use crate::solver::solve_with_backend;
    use crate::solver::Backend;
    use chrono::{Datelike, TimeZone, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    // Ten-week term: 2025-01-06 (Mon) .. 2025-03-14 (Fri)
    fn term_request(id: &str) -> SessionRequest {
        SessionRequest::new(id, utc(2025, 1, 6, 0, 0), utc(2025, 3, 14, 23, 0))
            .with_duration_minutes(60)
    }

    fn term_problem() -> Problem {
        Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1").with_capacity(50))
    }

    #[test]
    fn test_single_request_feasible() {
        let problem = term_problem().with_request(term_request("CS101").with_occurrences(3));
        let result = HeuristicSolver::new().solve(&problem, Some(1), true).unwrap();

        assert_eq!(result.status, SolveStatus::Feasible);
        assert_eq!(result.assignments.len(), 3);
        assert!(result.unscheduled_requests.is_empty());
        assert_eq!(result.backend_used, "heuristic");
        assert_eq!(result.seed_used, Some(1));
    }

    #[test]
    fn test_determinism_same_seed_same_result() {
        let problem = term_problem()
            .with_request(term_request("CS101").with_occurrences(5))
            .with_request(term_request("CS102").with_occurrences(5))
            .with_resource(Resource::room("R2").with_capacity(80));

        let solver = HeuristicSolver::new();
        let first = solver.solve(&problem, Some(42), true).unwrap();
        let second = solver.solve(&problem, Some(42), true).unwrap();

        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.status, second.status);
        assert_eq!(first.unscheduled_requests, second.unscheduled_requests);
        assert_eq!(first.objective_score, second.objective_score);
    }

    #[test]
    fn test_assignments_inside_date_range() {
        let problem = term_problem().with_request(term_request("CS101").with_occurrences(8));
        let result = HeuristicSolver::new().solve(&problem, Some(7), true).unwrap();

        let request = &problem.requests[0];
        for assignment in &result.assignments {
            assert!(assignment.start_time >= request.earliest_date);
            assert!(assignment.end_time <= request.latest_date);
        }
    }

    #[test]
    fn test_start_times_on_granularity_boundaries() {
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(30))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1"))
            .with_request(term_request("CS101").with_occurrences(6));

        let result = HeuristicSolver::new().solve(&problem, Some(3), true).unwrap();
        assert_eq!(result.status, SolveStatus::Feasible);
        for assignment in &result.assignments {
            let minutes = assignment.start_time.time().num_seconds_from_midnight() / 60;
            assert_eq!(minutes % 30, 0);
        }
    }

    #[test]
    fn test_conservation() {
        // Second request cannot fit anywhere (no qualified room)
        let problem = term_problem()
            .with_request(term_request("CS101").with_occurrences(4))
            .with_request(
                term_request("CS102")
                    .with_occurrences(3)
                    .with_required_attribute("planetarium", true),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(5), true).unwrap();
        assert_eq!(
            result.assignments.len() + result.unscheduled_requests.len(),
            problem.total_requested_occurrences()
        );
        assert_eq!(result.status, SolveStatus::Partial);
        assert_eq!(result.unscheduled_requests, vec!["CS102"; 3]);
    }

    #[test]
    fn test_competing_requests_infeasible_without_fallback() {
        // One room, and both requests only fit the single 09:00-11:00
        // slot on one Monday
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1").with_capacity(1))
            .with_request(
                SessionRequest::new("CS101", utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                    .with_duration_minutes(120),
            )
            .with_request(
                SessionRequest::new("CS102", utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                    .with_duration_minutes(120),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(11), false).unwrap();

        assert_eq!(result.status, SolveStatus::Infeasible);
        assert!(result.assignments.is_empty());
        let mut unscheduled = result.unscheduled_requests.clone();
        unscheduled.sort();
        assert_eq!(unscheduled, vec!["CS101".to_string(), "CS102".to_string()]);

        let report = result.diagnostics.expect("diagnostics expected");
        assert_eq!(report.unscheduled_requests, result.unscheduled_requests);
        assert!(!report.top_conflicts.is_empty());
    }

    #[test]
    fn test_competing_requests_partial_with_fallback() {
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1").with_capacity(1))
            .with_request(
                SessionRequest::new("CS101", utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                    .with_duration_minutes(120),
            )
            .with_request(
                SessionRequest::new("CS102", utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                    .with_duration_minutes(120),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(11), true).unwrap();
        assert_eq!(result.status, SolveStatus::Partial);
        assert_eq!(result.assignments.len(), 1);
        assert_eq!(result.unscheduled_requests.len(), 1);
    }

    #[test]
    fn test_fallback_never_infeasible() {
        // Nothing can ever be scheduled, yet fallback keeps it partial
        let problem = Problem::new()
            .with_request(term_request("CS101").with_required_attribute("impossible", true));
        let result = HeuristicSolver::new().solve(&problem, Some(1), true).unwrap();
        assert_eq!(result.status, SolveStatus::Partial);
    }

    #[test]
    fn test_pattern_restricts_weekdays() {
        let problem = term_problem().with_request(
            term_request("CS101")
                .with_occurrences(9)
                .with_pattern("3days_mw"),
        );
        let result = HeuristicSolver::new().solve(&problem, Some(2), true).unwrap();

        assert_eq!(result.status, SolveStatus::Feasible);
        for assignment in &result.assignments {
            let weekday = assignment.start_time.weekday().num_days_from_monday();
            assert!(weekday <= 2, "weekday {weekday} violates 3days_mw");
        }
    }

    #[test]
    fn test_avoid_holidays() {
        let holidays = HolidayCalendar::new("ay", "AY 2024/25", 2024)
            .with_weekends_excluded()
            .with_holiday(
                NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
                "Winter Break",
            );
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1"))
            .with_holiday_calendar(holidays.clone())
            .with_request(
                SessionRequest::new("CS101", utc(2024, 12, 1, 0, 0), utc(2025, 1, 31, 23, 0))
                    .with_duration_minutes(60)
                    .with_occurrences(6)
                    .with_avoid_holidays(true),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(9), true).unwrap();
        assert_eq!(result.status, SolveStatus::Feasible);
        for assignment in &result.assignments {
            let date = assignment.start_time.date_naive();
            assert!(!holidays.is_holiday(date), "scheduled on holiday {date}");
        }
    }

    #[test]
    fn test_locked_assignment_blocks_slot() {
        let locked = Assignment::new("EXTERN", 0, utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
            .with_resource("room", "R1");
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1"))
            .with_locked_assignment(locked)
            .with_request(
                SessionRequest::new("CS101", utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                    .with_duration_minutes(120),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(4), true).unwrap();
        assert_eq!(result.status, SolveStatus::Partial);
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn test_teacher_buffers_keep_sessions_apart() {
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1"))
            .with_teacher(Teacher::new("prof_x", "Dr. X").with_buffers(30, 30))
            .with_request(
                SessionRequest::new("CS101", utc(2025, 1, 6, 0, 0), utc(2025, 1, 6, 23, 0))
                    .with_duration_minutes(60)
                    .with_teacher("prof_x"),
            )
            .with_request(
                SessionRequest::new("CS102", utc(2025, 1, 6, 0, 0), utc(2025, 1, 6, 23, 0))
                    .with_duration_minutes(60)
                    .with_teacher("prof_x"),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(6), true).unwrap();
        assert_eq!(result.status, SolveStatus::Feasible);

        let mut spans: Vec<_> = result
            .assignments
            .iter()
            .map(|a| (a.start_time, a.end_time))
            .collect();
        spans.sort();
        // 30-minute cleanup plus 30-minute setup demand a full hour gap
        assert!(spans[1].0 - spans[0].1 >= Duration::minutes(60));
    }

    #[test]
    fn test_priority_order_prefers_longer_sessions() {
        let requests = vec![
            term_request("short").with_duration_minutes(60),
            term_request("long").with_duration_minutes(180),
            term_request("medium").with_duration_minutes(120),
        ];
        let ordered = order_requests(&requests);
        assert_eq!(ordered[0].id, "long");
        assert_eq!(ordered[1].id, "medium");
        assert_eq!(ordered[2].id, "short");
    }

    #[test]
    fn test_priority_tie_breaks_on_deadline_then_id() {
        let requests = vec![
            SessionRequest::new("late", utc(2025, 1, 6, 0, 0), utc(2025, 3, 28, 0, 0)),
            SessionRequest::new("early", utc(2025, 1, 6, 0, 0), utc(2025, 2, 14, 0, 0)),
            SessionRequest::new("also_late", utc(2025, 1, 6, 0, 0), utc(2025, 3, 28, 0, 0)),
        ];
        let ordered = order_requests(&requests);
        assert_eq!(ordered[0].id, "early");
        assert_eq!(ordered[1].id, "also_late");
        assert_eq!(ordered[2].id, "late");
    }

    #[test]
    fn test_iteration_limit_leaves_rest_unscheduled() {
        let problem = term_problem().with_request(term_request("CS101").with_occurrences(5));
        let solver =
            HeuristicSolver::new().with_limits(SolverLimits::none().with_max_iterations(2));

        let result = solver.solve(&problem, Some(1), true).unwrap();
        assert_eq!(result.status, SolveStatus::Partial);
        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.unscheduled_requests.len(), 3);
    }

    #[test]
    fn test_validation_error_is_fatal() {
        let problem = term_problem().with_request(term_request("CS101").with_duration_minutes(0));
        let error = HeuristicSolver::new().solve(&problem, Some(1), true).unwrap_err();
        assert!(matches!(error, SolveError::Validation(_)));
    }

    #[test]
    fn test_cp_backend_unavailable() {
        let problem = term_problem().with_request(term_request("CS101"));

        let error = solve_with_backend(&problem, Backend::Cp, Some(1), false).unwrap_err();
        assert!(matches!(error, SolveError::Backend { .. }));

        // With fallback the heuristic engine answers instead
        let result = solve_with_backend(&problem, Backend::Cp, Some(1), true).unwrap();
        assert_eq!(result.backend_used, "heuristic");
        assert_eq!(result.status, SolveStatus::Feasible);
    }

    #[test]
    fn test_objective_score_populated() {
        let problem = term_problem()
            .with_request(term_request("CS101").with_occurrences(4))
            .with_objective(crate::objectives::SpreadEvenlyAcrossTerm::new());

        let result = HeuristicSolver::new().solve(&problem, Some(8), true).unwrap();
        let score = result.objective_score.expect("score expected");
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_no_objectives_no_score() {
        let problem = term_problem().with_request(term_request("CS101"));
        let result = HeuristicSolver::new().solve(&problem, Some(8), true).unwrap();
        assert!(result.objective_score.is_none());
    }

    #[test]
    fn test_cohort_copied_onto_assignments() {
        let problem =
            term_problem().with_request(term_request("CS101").with_cohort("cohort-a"));
        let result = HeuristicSolver::new().solve(&problem, Some(8), true).unwrap();
        assert_eq!(result.assignments[0].cohort_id.as_deref(), Some("cohort-a"));
    }

    #[test]
    fn test_multi_resource_demand() {
        let problem = Problem::new()
            .with_calendar(Calendar::new("main").with_granularity_minutes(60))
            .with_institutional_calendar("main")
            .with_resource(Resource::room("R1"))
            .with_resource(Resource::instructor("prof_a"))
            .with_request(
                term_request("CS101")
                    .with_resource_requirement("room", 1)
                    .with_resource_requirement("instructor", 1),
            );

        let result = HeuristicSolver::new().solve(&problem, Some(2), true).unwrap();
        assert_eq!(result.status, SolveStatus::Feasible);
        let assignment = &result.assignments[0];
        assert_eq!(assignment.assigned_resources["room"], vec!["R1".to_string()]);
        assert_eq!(
            assignment.assigned_resources["instructor"],
            vec!["prof_a".to_string()]
        );
    }

    #[test]
    fn test_k_combinations() {
        let items: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(k_combinations(&items, 0), vec![Vec::<String>::new()]);
        assert_eq!(k_combinations(&items, 4), Vec::<Vec<String>>::new());

        let pairs = k_combinations(&items, 2);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&vec!["a".to_string(), "b".to_string()]));
        assert!(pairs.contains(&vec!["a".to_string(), "c".to_string()]));
        assert!(pairs.contains(&vec!["b".to_string(), "c".to_string()]));
    }
}
