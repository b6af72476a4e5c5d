//! Solve result and infeasibility report models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::assignment::Assignment;

/// Terminal status of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Every requested occurrence was scheduled.
    Feasible,
    /// Some but not all occurrences were scheduled.
    Partial,
    /// Fallback was disabled and a blocking request could not be placed.
    Infeasible,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Feasible => write!(f, "feasible"),
            SolveStatus::Partial => write!(f, "partial"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
        }
    }
}

/// One ranked conflict description with a suggested resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictNote {
    /// Human-readable conflict description.
    pub message: String,
    /// Heuristic suggestion for resolving it.
    pub suggested_resolution: String,
}

/// Structured explanation of why occurrences went unscheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfeasibilityReport {
    /// Request ids with one entry per unscheduled occurrence. Always
    /// equals the solve result's `unscheduled_requests` exactly.
    pub unscheduled_requests: Vec<String>,
    /// Violated constraint type → violation count.
    pub violated_constraints_summary: BTreeMap<String, usize>,
    /// The most severe conflicts, ranked, bounded in length.
    pub top_conflicts: Vec<ConflictNote>,
}

impl InfeasibilityReport {
    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} occurrence(s) could not be scheduled",
            self.unscheduled_requests.len()
        )];
        if !self.violated_constraints_summary.is_empty() {
            lines.push("Violated constraints:".to_string());
            for (constraint_type, count) in &self.violated_constraints_summary {
                lines.push(format!("  - {constraint_type}: {count} violation(s)"));
            }
        }
        lines.join("\n")
    }
}

/// Outcome of a solve call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Terminal status.
    pub status: SolveStatus,
    /// Produced assignments, in placement order.
    pub assignments: Vec<Assignment>,
    /// Request ids with one entry per unscheduled occurrence, ordered by
    /// canonical request order.
    pub unscheduled_requests: Vec<String>,
    /// Weighted multi-objective score when the problem declares
    /// objectives, in `[0, 1]`.
    pub objective_score: Option<f64>,
    /// Name of the backend that produced this result.
    pub backend_used: String,
    /// Seed that drove candidate ordering.
    pub seed_used: Option<u64>,
    /// Wall-clock solve duration in seconds.
    pub solve_time_seconds: f64,
    /// Diagnostics, present when anything went unscheduled or any
    /// violation was recorded.
    pub diagnostics: Option<InfeasibilityReport>,
}

impl SolveResult {
    /// Whether every requested occurrence was scheduled.
    pub fn is_feasible(&self) -> bool {
        self.status == SolveStatus::Feasible
    }

    /// Assignments for one request, in occurrence order.
    pub fn assignments_for(&self, request_id: &str) -> Vec<&Assignment> {
        let mut out: Vec<&Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.request_id == request_id)
            .collect();
        out.sort_by_key(|a| a.occurrence_index);
        out
    }
}
