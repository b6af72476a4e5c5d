//! Problem model — the complete scheduling scenario.
//!
//! A problem bundles session requests, resources, calendars, constraint
//! and objective instances, optional locked assignments, and the
//! auxiliary institutional collections constraints resolve against.
//!
//! # Lifecycle
//! A problem is constructed once per solve call. [`Problem::canonicalize`]
//! sorts every collection by identifier so search order (and therefore
//! output) is deterministic; [`Problem::build_indices`] derives read-only
//! lookup structures owned exclusively by that solve call.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use super::assignment::Assignment;
use super::calendar::Calendar;
use super::holiday::HolidayCalendar;
use super::institution::{Building, Department, Teacher};
use super::request::SessionRequest;
use super::resource::Resource;
use super::time_blocker::TimeBlocker;
use crate::constraints::Constraint;
use crate::error::{ValidationError, ValidationErrorKind};
use crate::objectives::Objective;

/// A booked time interval on a resource.
pub type OccupiedInterval = (DateTime<FixedOffset>, DateTime<FixedOffset>);

/// Read-only lookup structures derived from a canonicalized problem.
///
/// Recomputed per solve call, never mutated in place.
#[derive(Debug, Clone, Default)]
pub struct ProblemIndices {
    /// Resource id → resource.
    pub resources: HashMap<String, Resource>,
    /// Calendar id → calendar.
    pub calendars: HashMap<String, Calendar>,
    /// Request id → request.
    pub requests: HashMap<String, SessionRequest>,
    /// Building id → building.
    pub buildings: HashMap<String, Building>,
    /// Department id → department.
    pub departments: HashMap<String, Department>,
    /// Teacher id → teacher.
    pub teachers: HashMap<String, Teacher>,
    /// Resource type → resource ids of that type, in canonical order.
    pub resources_by_type: BTreeMap<String, Vec<String>>,
    /// Request id → ids of resources whose attributes satisfy it.
    pub qualified_resources: HashMap<String, Vec<String>>,
    /// Resource id → intervals occupied by locked assignments.
    pub locked_occupancy: HashMap<String, Vec<OccupiedInterval>>,
}

/// A complete scheduling scenario.
#[derive(Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Session requests to schedule.
    pub requests: Vec<SessionRequest>,
    /// Bookable resources.
    pub resources: Vec<Resource>,
    /// Calendars referenced by the institution and by resources.
    pub calendars: Vec<Calendar>,
    /// Constraint instances checked against every candidate placement.
    #[serde(skip)]
    pub constraints: Vec<Arc<dyn Constraint>>,
    /// Objective instances scored against the finished solution.
    #[serde(skip)]
    pub objectives: Vec<Arc<dyn Objective>>,
    /// Pre-existing assignments that occupy resources before search.
    pub locked_assignments: Vec<Assignment>,
    /// The institution's main calendar, driving timezone and granularity.
    pub institutional_calendar_id: Option<String>,
    /// Campus buildings.
    pub buildings: Vec<Building>,
    /// Academic departments.
    pub departments: Vec<Department>,
    /// Teaching staff.
    pub teachers: Vec<Teacher>,
    /// Academic holiday calendar.
    pub holiday_calendar: Option<HolidayCalendar>,
    /// Institutional time blocks (lunch breaks, common exams).
    pub time_blocker: Option<TimeBlocker>,
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem {
    /// Creates an empty problem.
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            resources: Vec::new(),
            calendars: Vec::new(),
            constraints: Vec::new(),
            objectives: Vec::new(),
            locked_assignments: Vec::new(),
            institutional_calendar_id: None,
            buildings: Vec::new(),
            departments: Vec::new(),
            teachers: Vec::new(),
            holiday_calendar: None,
            time_blocker: None,
        }
    }

    /// Adds a session request.
    pub fn with_request(mut self, request: SessionRequest) -> Self {
        self.requests.push(request);
        self
    }

    /// Adds a resource.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Adds a calendar.
    pub fn with_calendar(mut self, calendar: Calendar) -> Self {
        self.calendars.push(calendar);
        self
    }

    /// Registers a constraint instance.
    pub fn with_constraint<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        self.constraints.push(Arc::new(constraint));
        self
    }

    /// Registers an objective instance.
    pub fn with_objective<O: Objective + 'static>(mut self, objective: O) -> Self {
        self.objectives.push(Arc::new(objective));
        self
    }

    /// Adds a locked assignment.
    pub fn with_locked_assignment(mut self, assignment: Assignment) -> Self {
        self.locked_assignments.push(assignment);
        self
    }

    /// Sets the institutional calendar reference.
    pub fn with_institutional_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.institutional_calendar_id = Some(calendar_id.into());
        self
    }

    /// Adds a building.
    pub fn with_building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    /// Adds a department.
    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.push(department);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Sets the holiday calendar.
    pub fn with_holiday_calendar(mut self, calendar: HolidayCalendar) -> Self {
        self.holiday_calendar = Some(calendar);
        self
    }

    /// Sets the institutional time blocker.
    pub fn with_time_blocker(mut self, blocker: TimeBlocker) -> Self {
        self.time_blocker = Some(blocker);
        self
    }

    /// Total occurrences requested across all requests.
    pub fn total_requested_occurrences(&self) -> usize {
        self.requests
            .iter()
            .map(|r| r.number_of_occurrences as usize)
            .sum()
    }

    /// Validates the whole scenario.
    ///
    /// Checks per-request invariants, duplicate identifiers, calendar
    /// reference integrity, calendar granularity, and holiday periods.
    /// Returns every detected issue; an empty vector means valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for request in &self.requests {
            errors.extend(request.validate());
        }

        let mut request_ids = HashSet::new();
        for request in &self.requests {
            if !request_ids.insert(request.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate request ID: {}", request.id),
                ));
            }
        }

        let mut resource_ids = HashSet::new();
        for resource in &self.resources {
            if !resource_ids.insert(resource.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate resource ID: {}", resource.id),
                ));
            }
        }

        let mut calendar_ids = HashSet::new();
        for calendar in &self.calendars {
            if !calendar_ids.insert(calendar.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("duplicate calendar ID: {}", calendar.id),
                ));
            }
            if calendar.timeslot_granularity_minutes == 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidGranularity,
                    format!("calendar '{}' has zero timeslot granularity", calendar.id),
                ));
            }
        }

        if let Some(id) = &self.institutional_calendar_id {
            if !calendar_ids.contains(id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingCalendarReference,
                    format!("institutional_calendar_id '{id}' not found in calendars"),
                ));
            }
        }

        for resource in &self.resources {
            if let Some(id) = &resource.availability_calendar_id {
                if !calendar_ids.contains(id.as_str()) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::MissingCalendarReference,
                        format!(
                            "resource '{}' references unknown calendar '{id}'",
                            resource.id
                        ),
                    ));
                }
            }
        }

        if let Some(holidays) = &self.holiday_calendar {
            errors.extend(holidays.validate());
        }

        errors
    }

    /// Sorts every collection by identifier for deterministic processing.
    ///
    /// Locked assignments sort by `(request_id, occurrence_index)`.
    pub fn canonicalize(&mut self) {
        self.requests.sort_by(|a, b| a.id.cmp(&b.id));
        self.resources.sort_by(|a, b| a.id.cmp(&b.id));
        self.calendars.sort_by(|a, b| a.id.cmp(&b.id));
        self.buildings.sort_by(|a, b| a.id.cmp(&b.id));
        self.departments.sort_by(|a, b| a.id.cmp(&b.id));
        self.teachers.sort_by(|a, b| a.id.cmp(&b.id));
        self.locked_assignments
            .sort_by(|a, b| (&a.request_id, a.occurrence_index).cmp(&(&b.request_id, b.occurrence_index)));
    }

    /// Builds the lookup indices for one solve call.
    pub fn build_indices(&self) -> ProblemIndices {
        let resources: HashMap<String, Resource> = self
            .resources
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        let calendars = self
            .calendars
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        let requests = self
            .requests
            .iter()
            .map(|r| (r.id.clone(), r.clone()))
            .collect();
        let buildings = self
            .buildings
            .iter()
            .map(|b| (b.id.clone(), b.clone()))
            .collect();
        let departments = self
            .departments
            .iter()
            .map(|d| (d.id.clone(), d.clone()))
            .collect();
        let teachers = self
            .teachers
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();

        let mut resources_by_type: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for resource in &self.resources {
            resources_by_type
                .entry(resource.resource_type.clone())
                .or_default()
                .push(resource.id.clone());
        }

        let mut qualified_resources: HashMap<String, Vec<String>> = HashMap::new();
        for request in &self.requests {
            let qualified = self
                .resources
                .iter()
                .filter(|r| r.satisfies(&request.required_attributes))
                .map(|r| r.id.clone())
                .collect();
            qualified_resources.insert(request.id.clone(), qualified);
        }

        let mut locked_occupancy: HashMap<String, Vec<OccupiedInterval>> = HashMap::new();
        for assignment in &self.locked_assignments {
            for ids in assignment.assigned_resources.values() {
                for id in ids {
                    locked_occupancy
                        .entry(id.clone())
                        .or_default()
                        .push((assignment.start_time, assignment.end_time));
                }
            }
        }

        ProblemIndices {
            resources,
            calendars,
            requests,
            buildings,
            departments,
            teachers,
            resources_by_type,
            qualified_resources,
            locked_occupancy,
        }
    }
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("requests", &self.requests.len())
            .field("resources", &self.resources.len())
            .field("calendars", &self.calendars.len())
            .field("constraints", &self.constraints.len())
            .field("objectives", &self.objectives.len())
            .field("locked_assignments", &self.locked_assignments.len())
            .field("institutional_calendar_id", &self.institutional_calendar_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn sample_request(id: &str) -> SessionRequest {
        SessionRequest::new(id, utc(2025, 1, 6, 0, 0), utc(2025, 3, 28, 23, 0))
    }

    #[test]
    fn test_canonicalize_sorts_by_id() {
        let mut problem = Problem::new()
            .with_request(sample_request("B"))
            .with_request(sample_request("A"))
            .with_resource(Resource::room("R2"))
            .with_resource(Resource::room("R1"))
            .with_calendar(Calendar::new("z"))
            .with_calendar(Calendar::new("a"));

        problem.canonicalize();
        assert_eq!(problem.requests[0].id, "A");
        assert_eq!(problem.requests[1].id, "B");
        assert_eq!(problem.resources[0].id, "R1");
        assert_eq!(problem.calendars[0].id, "a");
    }

    #[test]
    fn test_canonicalize_sorts_locked_assignments() {
        let mut problem = Problem::new()
            .with_locked_assignment(Assignment::new(
                "B",
                1,
                utc(2025, 1, 6, 9, 0),
                utc(2025, 1, 6, 10, 0),
            ))
            .with_locked_assignment(Assignment::new(
                "B",
                0,
                utc(2025, 1, 7, 9, 0),
                utc(2025, 1, 7, 10, 0),
            ))
            .with_locked_assignment(Assignment::new(
                "A",
                0,
                utc(2025, 1, 8, 9, 0),
                utc(2025, 1, 8, 10, 0),
            ));

        problem.canonicalize();
        let keys: Vec<(String, u32)> = problem
            .locked_assignments
            .iter()
            .map(|a| (a.request_id.clone(), a.occurrence_index))
            .collect();
        assert_eq!(keys, vec![("A".into(), 0), ("B".into(), 0), ("B".into(), 1)]);
    }

    #[test]
    fn test_validate_missing_institutional_calendar() {
        let problem = Problem::new()
            .with_request(sample_request("A"))
            .with_institutional_calendar("ghost");
        let errors = problem.validate();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingCalendarReference));
    }

    #[test]
    fn test_validate_missing_resource_calendar() {
        let problem = Problem::new().with_resource(Resource::room("R1").with_calendar("ghost"));
        let errors = problem.validate();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingCalendarReference));
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let problem = Problem::new()
            .with_request(sample_request("A"))
            .with_request(sample_request("A"))
            .with_resource(Resource::room("R1"))
            .with_resource(Resource::room("R1"));
        let errors = problem.validate();
        let duplicates = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::DuplicateId)
            .count();
        assert_eq!(duplicates, 2);
    }

    #[test]
    fn test_build_indices_qualified_resources() {
        let problem = Problem::new()
            .with_request(sample_request("A").with_required_attribute("projector", true))
            .with_resource(Resource::room("R1").with_attribute("projector", true))
            .with_resource(Resource::room("R2"));

        let indices = problem.build_indices();
        assert_eq!(indices.qualified_resources["A"], vec!["R1".to_string()]);
        assert_eq!(indices.resources_by_type["room"].len(), 2);
    }

    #[test]
    fn test_build_indices_locked_occupancy() {
        let problem = Problem::new().with_locked_assignment(
            Assignment::new("A", 0, utc(2025, 1, 6, 9, 0), utc(2025, 1, 6, 11, 0))
                .with_resource("room", "R1"),
        );

        let indices = problem.build_indices();
        let intervals = &indices.locked_occupancy["R1"];
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].0, utc(2025, 1, 6, 9, 0));
    }

    #[test]
    fn test_total_requested_occurrences() {
        let problem = Problem::new()
            .with_request(sample_request("A").with_occurrences(3))
            .with_request(sample_request("B").with_occurrences(2));
        assert_eq!(problem.total_requested_occurrences(), 5);
    }
}
