//! Built-in soft constraints.
//!
//! Soft constraints never block a candidate; their violations are
//! advisory and surface only through diagnostics.

use chrono::Duration;

use super::{Constraint, ConstraintContext, Violation};
use crate::models::Assignment;

/// Encourages sessions to start inside the request's preferred time
/// slots.
pub struct PreferredTimeSlots {
    request_id: String,
}

impl PreferredTimeSlots {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for PreferredTimeSlots {
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
        if request.preferred_time_slots.is_empty() {
            return None;
        }

        let start = assignment.start_time.time();
        let end = assignment.end_time.time();
        if !request
            .preferred_time_slots
            .iter()
            .any(|slot| slot.contains(start, end))
        {
            return Some(Violation::new(
                self.constraint_type(),
                &self.request_id,
                format!("session at {start} is outside the preferred time slots"),
            ));
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "soft.time_slot_preference"
    }

    fn is_hard(&self) -> bool {
        false
    }
}

/// Encourages spreading occurrences of one request apart.
pub struct OccurrenceSpread {
    request_id: String,
    min_days_between: i64,
}

impl OccurrenceSpread {
    /// Creates the constraint; `min_days_between` defaults to a week.
    pub fn new(request_id: impl Into<String>, min_days_between: i64) -> Self {
        Self {
            request_id: request_id.into(),
            min_days_between,
        }
    }

    /// Weekly spread.
    pub fn weekly(request_id: impl Into<String>) -> Self {
        Self::new(request_id, 7)
    }
}

impl Constraint for OccurrenceSpread {
    fn check(
        &self,
        assignment: &Assignment,
        solution: &[Assignment],
        _ctx: &ConstraintContext<'_>,
    ) -> Option<Violation> {
        if assignment.request_id != self.request_id {
            return None;
        }

        let mut dates: Vec<_> = solution
            .iter()
            .filter(|a| a.request_id == self.request_id)
            .map(|a| a.start_time.date_naive())
            .collect();
        dates.push(assignment.start_time.date_naive());
        dates.sort();

        for pair in dates.windows(2) {
            let gap = pair[1] - pair[0];
            if gap < Duration::days(self.min_days_between) {
                return Some(Violation::new(
                    self.constraint_type(),
                    &self.request_id,
                    format!(
                        "occurrences are {} day(s) apart, preferred minimum is {}",
                        gap.num_days(),
                        self.min_days_between
                    ),
                ));
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "soft.occurrence_spread"
    }

    fn is_hard(&self) -> bool {
        false
    }
}

/// Encourages rooms from the request's preferred building.
pub struct PreferredBuilding {
    request_id: String,
}

impl PreferredBuilding {
    /// Creates the constraint for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }
}

impl Constraint for PreferredBuilding {
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
        let preferred = request.preferred_building_id.as_deref()?;

        for resource_id in assignment.resource_ids() {
            let Some(resource) = ctx.resource(resource_id) else {
                continue;
            };
            if let Some(building) = resource.building_id.as_deref() {
                if building != preferred {
                    return Some(
                        Violation::new(
                            self.constraint_type(),
                            &self.request_id,
                            format!(
                                "Resource '{resource_id}' is in building '{building}', \
                                 preference is '{preferred}'"
                            ),
                        )
                        .with_resource(resource_id),
                    );
                }
            }
        }
        None
    }

    fn constraint_type(&self) -> &'static str {
        "soft.preferred_building"
    }

    fn is_hard(&self) -> bool {
        false
    }
}
