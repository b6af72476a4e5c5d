//! Solver backends and the top-level solve entry point.
//!
//! Every backend implements the same [`SolverBackend`] contract so
//! callers can swap engines transparently. This build ships the greedy
//! [`HeuristicSolver`]; the constraint-programming backend is an
//! unavailable capability here, and selecting it either fails with
//! [`SolveError::Backend`] or, with `fallback` enabled, answers through
//! the heuristic engine instead.

mod heuristic;

pub use heuristic::HeuristicSolver;

use std::time::Instant;

use tracing::warn;

use crate::error::SolveError;
use crate::models::{Problem, SolveResult};

/// The common solver contract.
pub trait SolverBackend {
    /// Solves a problem.
    ///
    /// `seed` fully determines candidate ordering; identical
    /// `(problem, seed)` inputs yield identical results. `fallback`
    /// permits a partial solution instead of an infeasible outcome when
    /// some occurrence cannot be placed.
    fn solve(
        &self,
        problem: &Problem,
        seed: Option<u64>,
        fallback: bool,
    ) -> Result<SolveResult, SolveError>;

    /// Stable backend identifier.
    fn backend_name(&self) -> &'static str;
}

/// Backend selector for [`solve_with_backend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Pick the best available backend.
    #[default]
    Auto,
    /// The greedy heuristic engine.
    Heuristic,
    /// The constraint-programming engine (not available in this build).
    Cp,
}

/// Time and iteration budget for a solve call.
///
/// Checked between occurrence placements; one iteration is one
/// occurrence placement attempt. On exhaustion the remaining
/// occurrences are left unscheduled and the result degrades to a
/// partial solution — never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverLimits {
    /// Wall-clock budget in milliseconds.
    pub max_solve_millis: Option<u64>,
    /// Placement-attempt budget.
    pub max_iterations: Option<u64>,
}

impl SolverLimits {
    /// No limits.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the wall-clock budget.
    pub fn with_max_solve_millis(mut self, millis: u64) -> Self {
        self.max_solve_millis = Some(millis);
        self
    }

    /// Sets the placement-attempt budget.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    /// Whether the budget is spent.
    pub fn exceeded(&self, started: Instant, iterations: u64) -> bool {
        if let Some(max_millis) = self.max_solve_millis {
            if started.elapsed().as_millis() as u64 >= max_millis {
                return true;
            }
        }
        if let Some(max_iterations) = self.max_iterations {
            if iterations >= max_iterations {
                return true;
            }
        }
        false
    }
}

/// Solves a problem with the default backend selection.
///
/// A missing `seed` is replaced by a random one, reported back through
/// `SolveResult::seed_used` for reproducibility.
pub fn solve(
    problem: &Problem,
    seed: Option<u64>,
    fallback: bool,
) -> Result<SolveResult, SolveError> {
    solve_with_backend(problem, Backend::Auto, seed, fallback)
}

/// Solves a problem with an explicit backend selection.
pub fn solve_with_backend(
    problem: &Problem,
    backend: Backend,
    seed: Option<u64>,
    fallback: bool,
) -> Result<SolveResult, SolveError> {
    let seed = Some(seed.unwrap_or_else(rand::random));

    match backend {
        Backend::Auto | Backend::Heuristic => {
            HeuristicSolver::new().solve(problem, seed, fallback)
        }
        Backend::Cp => {
            if fallback {
                warn!("cp backend unavailable, falling back to the heuristic engine");
                HeuristicSolver::new().solve(problem, seed, fallback)
            } else {
                Err(SolveError::Backend {
                    backend: "cp".to_string(),
                    reason: "constraint-programming backend is not available in this build"
                        .to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_limits_none_never_exceeded() {
        let limits = SolverLimits::none();
        assert!(!limits.exceeded(Instant::now(), u64::MAX));
    }

    #[test]
    fn test_iteration_limit() {
        let limits = SolverLimits::none().with_max_iterations(10);
        let started = Instant::now();
        assert!(!limits.exceeded(started, 9));
        assert!(limits.exceeded(started, 10));
    }

    #[test]
    fn test_time_limit() {
        let limits = SolverLimits::none().with_max_solve_millis(1);
        let started = Instant::now() - Duration::from_millis(5);
        assert!(limits.exceeded(started, 0));
    }
}
