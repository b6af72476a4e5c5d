//! Pluggable constraint framework.
//!
//! A [`Constraint`] is checked against one candidate [`Assignment`], the
//! accumulating partial solution, and a read-only [`ConstraintContext`],
//! and returns an optional [`Violation`]. Checks are pure functions of
//! their inputs — no hidden state, no side effects — so they can run in
//! any order and be safely re-evaluated.
//!
//! Constraints are tagged hard or soft: hard violations block acceptance
//! of a candidate, soft violations are advisory and only surface through
//! diagnostics. Composite combinators ([`AllOf`], [`AnyOf`], [`Not`],
//! [`ExactlyOne`]) combine child constraints with boolean semantics.

pub mod hard;
pub mod soft;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{
    Assignment, Calendar, HolidayCalendar, ProblemIndices, Resource, SessionRequest, Teacher,
    TimeBlocker,
};

/// A constraint violation. Pure data: produced by checks, consumed by
/// diagnostics, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Constraint type tag (e.g. `"hard.no_overlap"`).
    pub constraint_type: String,
    /// The request whose placement violated the constraint.
    pub affected_request_id: String,
    /// The resource involved, when one is.
    pub affected_resource_id: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        constraint_type: impl Into<String>,
        request_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            constraint_type: constraint_type.into(),
            affected_request_id: request_id.into(),
            affected_resource_id: None,
            message: message.into(),
        }
    }

    /// Attaches the involved resource.
    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.affected_resource_id = Some(resource_id.into());
        self
    }
}

/// Immutable lookup bundle shared read-only by every check call.
///
/// Built once per solve from the canonicalized problem's indices.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintContext<'a> {
    /// Lookup indices from the canonicalized problem.
    pub indices: &'a ProblemIndices,
    /// The problem's holiday calendar, if any.
    pub holiday_calendar: Option<&'a HolidayCalendar>,
    /// The problem's institutional time blocks, if any.
    pub time_blocker: Option<&'a TimeBlocker>,
    /// The institutional calendar id, if declared.
    pub institutional_calendar_id: Option<&'a str>,
}

impl<'a> ConstraintContext<'a> {
    /// Creates a context over prebuilt indices.
    pub fn new(
        indices: &'a ProblemIndices,
        holiday_calendar: Option<&'a HolidayCalendar>,
        time_blocker: Option<&'a TimeBlocker>,
        institutional_calendar_id: Option<&'a str>,
    ) -> Self {
        Self {
            indices,
            holiday_calendar,
            time_blocker,
            institutional_calendar_id,
        }
    }

    /// Looks up a resource by id.
    pub fn resource(&self, id: &str) -> Option<&'a Resource> {
        self.indices.resources.get(id)
    }

    /// Looks up a calendar by id.
    pub fn calendar(&self, id: &str) -> Option<&'a Calendar> {
        self.indices.calendars.get(id)
    }

    /// Looks up a request by id.
    pub fn request(&self, id: &str) -> Option<&'a SessionRequest> {
        self.indices.requests.get(id)
    }

    /// Looks up a teacher by id.
    pub fn teacher(&self, id: &str) -> Option<&'a Teacher> {
        self.indices.teachers.get(id)
    }

    /// The institutional calendar, when declared and resolvable.
    pub fn institutional_calendar(&self) -> Option<&'a Calendar> {
        self.institutional_calendar_id
            .and_then(|id| self.indices.calendars.get(id))
    }
}

/// A schedulability rule checked against one candidate placement.
pub trait Constraint: Send + Sync {
    /// Checks the candidate against the partial solution.
    ///
    /// Returns a violation when the constraint is not satisfied, `None`
    /// otherwise. Must be a pure function of its inputs.
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation>;

    /// Unique type tag (e.g. `"hard.no_overlap"`).
    fn constraint_type(&self) -> &'static str;

    /// Whether a violation blocks candidate acceptance.
    ///
    /// Soft constraints return `false`; their violations are advisory.
    fn is_hard(&self) -> bool {
        true
    }

    /// Human-readable explanation of a violation of this constraint.
    fn explain(&self, violation: &Violation) -> String {
        violation.message.clone()
    }
}

// ======================== Composite combinators ========================

/// Satisfied iff every child is satisfied. Fails on the first child
/// failure.
pub struct AllOf {
    children: Vec<Arc<dyn Constraint>>,
}

impl AllOf {
    /// Creates a conjunction over child constraints.
    pub fn new(children: Vec<Arc<dyn Constraint>>) -> Self {
        Self { children }
    }
}

impl Constraint for AllOf {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        for child in &self.children {
            if let Some(violation) = child.check(assignment, solution, ctx) {
                return Some(Violation::new(
                    self.constraint_type(),
                    &assignment.request_id,
                    format!("conjunction failed: {}", violation.message),
                ));
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "composite.all_of"
    }
}

/// Satisfied iff at least one child is satisfied. Fails only when every
/// child fails.
pub struct AnyOf {
    children: Vec<Arc<dyn Constraint>>,
}

impl AnyOf {
    /// Creates a disjunction over child constraints.
    pub fn new(children: Vec<Arc<dyn Constraint>>) -> Self {
        Self { children }
    }
}

impl Constraint for AnyOf {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        let failures = self
            .children
            .iter()
            .filter(|c| c.check(assignment, solution, ctx).is_some())
            .count();

        if !self.children.is_empty() && failures == self.children.len() {
            return Some(Violation::new(
                self.constraint_type(),
                &assignment.request_id,
                format!("all {failures} alternatives violated"),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "composite.any_of"
    }
}

/// Satisfied iff the single child is violated.
pub struct Not {
    child: Arc<dyn Constraint>,
}

impl Not {
    /// Creates a negation of a child constraint.
    pub fn new(child: Arc<dyn Constraint>) -> Self {
        Self { child }
    }
}

impl Constraint for Not {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if self.child.check(assignment, solution, ctx).is_none() {
            return Some(Violation::new(
                self.constraint_type(),
                &assignment.request_id,
                "negated constraint was satisfied",
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "composite.not"
    }
}

/// Satisfied iff exactly one child is satisfied.
pub struct ExactlyOne {
    children: Vec<Arc<dyn Constraint>>,
}

impl ExactlyOne {
    /// Creates an exclusive disjunction over child constraints.
    pub fn new(children: Vec<Arc<dyn Constraint>>) -> Self {
        Self { children }
    }
}

impl Constraint for ExactlyOne {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        let satisfied = self
            .children
            .iter()
            .filter(|c| c.check(assignment, solution, ctx).is_none())
            .count();

        if satisfied != 1 {
            return Some(Violation::new(
                self.constraint_type(),
                &assignment.request_id,
                format!("{satisfied} constraints satisfied, exactly 1 required"),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "composite.exactly_one"
    }
}
