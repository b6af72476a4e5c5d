//! Infeasibility diagnostics.
//!
//! Ranks and aggregates the violations produced during a solve attempt.
//! Each violation gets a priority tier (derived from its constraint-type
//! tag and message content) and an impact score in `[0, 1]` (a base
//! score per conflict kind, boosted for multi-party impact and explicit
//! "exceeds" language). Violations rank by (priority, impact) descending
//! and aggregate into an [`InfeasibilityReport`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constraints::Violation;
use crate::models::{ConflictNote, InfeasibilityReport};

/// How many conflicts an infeasibility report lists at most.
const MAX_REPORTED_CONFLICTS: usize = 10;

/// Impact boost per additional affected party.
const PARTY_BOOST: f64 = 0.1;
/// Cap on the total multi-party boost.
const PARTY_BOOST_CAP: f64 = 0.3;
/// Impact boost for explicit "exceeds" language.
const EXCEEDS_BOOST: f64 = 0.2;

/// Priority tier of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationPriority {
    /// Nice to have.
    Low,
    /// Important but flexible.
    Medium,
    /// Very important to satisfy.
    High,
    /// Cannot stand in any accepted solution.
    Critical,
}

/// The specific kind of scheduling conflict a violation describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    RoomDoubleBooking,
    TeacherDoubleBooking,
    CapacityExceeded,
    EquipmentMissing,
    PatternViolation,
    HolidayViolation,
    ResourceUnavailable,
    PreferenceViolation,
    Other,
}

impl ConflictKind {
    /// Base impact score for this kind of conflict.
    fn base_impact(self) -> f64 {
        match self {
            ConflictKind::RoomDoubleBooking => 1.0,
            ConflictKind::TeacherDoubleBooking => 1.0,
            ConflictKind::CapacityExceeded => 0.8,
            ConflictKind::EquipmentMissing => 0.7,
            ConflictKind::PatternViolation => 0.6,
            ConflictKind::HolidayViolation => 0.8,
            ConflictKind::ResourceUnavailable => 0.7,
            ConflictKind::PreferenceViolation => 0.3,
            ConflictKind::Other => 0.5,
        }
    }
}

/// A violation with its computed severity.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictScore {
    /// The underlying violation.
    pub violation: Violation,
    /// Priority tier.
    pub priority: ViolationPriority,
    /// Impact in `[0, 1]`.
    pub impact: f64,
    /// Entity ids involved (request and resource).
    pub affected_parties: Vec<String>,
    /// Heuristic suggestion for resolving the conflict.
    pub suggested_resolution: String,
}

/// Scores and ranks violations into an [`InfeasibilityReport`].
#[derive(Debug, Clone, Default)]
pub struct ConflictScorer;

impl ConflictScorer {
    /// Creates a scorer.
    pub fn new() -> Self {
        Self
    }

    /// Scores a single violation.
    pub fn score(&self, violation: &Violation) -> ConflictScore {
        let kind = identify_conflict_kind(violation);
        let affected_parties = affected_parties(violation);

        let mut impact = kind.base_impact();
        if affected_parties.len() > 1 {
            let boost = PARTY_BOOST * (affected_parties.len() - 1) as f64;
            impact += boost.min(PARTY_BOOST_CAP);
        }
        if violation.message.to_lowercase().contains("exceeds") {
            impact += EXCEEDS_BOOST;
        }

        ConflictScore {
            violation: violation.clone(),
            priority: priority_of(violation),
            impact: impact.min(1.0),
            affected_parties,
            suggested_resolution: suggest_resolution(violation),
        }
    }

    /// Scores and ranks violations by (priority, impact) descending.
    pub fn rank(&self, violations: &[Violation]) -> Vec<ConflictScore> {
        let mut scores: Vec<ConflictScore> = violations.iter().map(|v| self.score(v)).collect();
        scores.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| b.impact.total_cmp(&a.impact))
                .then_with(|| {
                    a.violation
                        .affected_request_id
                        .cmp(&b.violation.affected_request_id)
                })
        });
        scores
    }

    /// Aggregates violations and the unscheduled set into a report.
    ///
    /// The report's unscheduled set is exactly the one passed in — it
    /// must come verbatim from the solve result.
    pub fn build_report(
        &self,
        violations: &[Violation],
        unscheduled_requests: Vec<String>,
    ) -> InfeasibilityReport {
        let mut summary: BTreeMap<String, usize> = BTreeMap::new();
        for violation in violations {
            *summary.entry(violation.constraint_type.clone()).or_insert(0) += 1;
        }

        let top_conflicts = self
            .rank(violations)
            .into_iter()
            .take(MAX_REPORTED_CONFLICTS)
            .map(|score| ConflictNote {
                message: score.violation.message,
                suggested_resolution: score.suggested_resolution,
            })
            .collect();

        InfeasibilityReport {
            unscheduled_requests,
            violated_constraints_summary: summary,
            top_conflicts,
        }
    }
}

/// Derives a priority tier from the constraint type and message.
fn priority_of(violation: &Violation) -> ViolationPriority {
    let constraint_type = violation.constraint_type.to_lowercase();
    let message = violation.message.to_lowercase();

    if constraint_type.contains("no_overlap")
        || constraint_type.contains("critical")
        || message.contains("double-book")
    {
        ViolationPriority::Critical
    } else if constraint_type.contains("capacity") {
        ViolationPriority::High
    } else if constraint_type.contains("pattern") || constraint_type.contains("holiday") {
        ViolationPriority::Medium
    } else if constraint_type.contains("preference") || constraint_type.starts_with("soft") {
        ViolationPriority::Low
    } else {
        ViolationPriority::Medium
    }
}

/// Identifies the conflict kind from the type tag and message content.
fn identify_conflict_kind(violation: &Violation) -> ConflictKind {
    let constraint_type = violation.constraint_type.to_lowercase();
    let message = violation.message.to_lowercase();

    if message.contains("double-book") {
        if message.contains("instructor") || message.contains("teacher") {
            return ConflictKind::TeacherDoubleBooking;
        }
        return ConflictKind::RoomDoubleBooking;
    }
    if constraint_type.contains("capacity") || message.contains("capacity") {
        return ConflictKind::CapacityExceeded;
    }
    if message.contains("equipment") || constraint_type.contains("attribute") {
        return ConflictKind::EquipmentMissing;
    }
    if constraint_type.contains("pattern") {
        return ConflictKind::PatternViolation;
    }
    if constraint_type.contains("holiday") {
        return ConflictKind::HolidayViolation;
    }
    if constraint_type.contains("blackout")
        || constraint_type.contains("time_block")
        || message.contains("unavailable")
    {
        return ConflictKind::ResourceUnavailable;
    }
    if constraint_type.contains("preference") || constraint_type.starts_with("soft") {
        return ConflictKind::PreferenceViolation;
    }
    ConflictKind::Other
}

/// Entity ids a violation names.
fn affected_parties(violation: &Violation) -> Vec<String> {
    let mut parties = vec![violation.affected_request_id.clone()];
    if let Some(resource_id) = &violation.affected_resource_id {
        if !parties.contains(resource_id) {
            parties.push(resource_id.clone());
        }
    }
    parties
}

/// Heuristic resolution suggestion per conflict kind.
fn suggest_resolution(violation: &Violation) -> String {
    match identify_conflict_kind(violation) {
        ConflictKind::RoomDoubleBooking | ConflictKind::TeacherDoubleBooking => {
            "Reschedule one of the conflicting classes".to_string()
        }
        ConflictKind::CapacityExceeded => {
            "Use a larger room or split into multiple sections".to_string()
        }
        ConflictKind::EquipmentMissing => {
            "Choose a room with the required equipment".to_string()
        }
        ConflictKind::PatternViolation => {
            "Adjust the scheduling pattern or move to a different day".to_string()
        }
        ConflictKind::HolidayViolation => {
            "Schedule on a different date outside the holiday period".to_string()
        }
        ConflictKind::ResourceUnavailable => {
            "Pick a time when the resource is available".to_string()
        }
        ConflictKind::PreferenceViolation => {
            "Consider an alternative time if the preference cannot be met".to_string()
        }
        ConflictKind::Other => "Review the constraint and adjust scheduling accordingly".to_string(),
    }
}
