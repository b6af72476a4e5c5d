//! Multi-objective combination.
//!
//! Combines several objectives through a weighted sum (weights
//! normalized to sum to 1), Pareto-frontier extraction over weighted
//! scores, and an achievement scalarizing function using a reference
//! point with a weighted Tchebycheff distance.

use std::sync::Arc;

use super::Objective;
use crate::models::Assignment;

/// A weighted set of objectives scored together.
#[derive(Clone, Default)]
pub struct MultiObjective {
    objectives: Vec<(Arc<dyn Objective>, f64)>,
}

impl MultiObjective {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an objective with an explicit weight.
    pub fn add(&mut self, objective: Arc<dyn Objective>, weight: f64) {
        self.objectives.push((objective, weight));
    }

    /// Builder: adds an objective with an explicit weight.
    pub fn with_objective<O: Objective + 'static>(mut self, objective: O, weight: f64) -> Self {
        self.objectives.push((Arc::new(objective), weight));
        self
    }

    /// Builds a set from shared objective instances, weighting each by
    /// its own declared weight.
    pub fn from_objectives(objectives: &[Arc<dyn Objective>]) -> Self {
        let mut set = Self::new();
        for objective in objectives {
            let weight = objective.weight();
            set.add(Arc::clone(objective), weight);
        }
        set
    }

    /// Number of objectives in the set.
    pub fn len(&self) -> usize {
        self.objectives.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    /// Per-objective weighted scores for one solution.
    pub fn weighted_scores(&self, solution: &[Assignment]) -> Vec<f64> {
        self.objectives
            .iter()
            .map(|(objective, weight)| objective.score(solution) * weight)
            .collect()
    }

    /// Weighted sum with weights normalized to sum to 1.
    ///
    /// An empty objective set is vacuously optimal.
    pub fn weighted_sum(&self, solution: &[Assignment]) -> f64 {
        let total_weight: f64 = self.objectives.iter().map(|(_, w)| w).sum();
        if total_weight <= 0.0 {
            return 1.0;
        }

        self.objectives
            .iter()
            .map(|(objective, weight)| objective.score(solution) * weight)
            .sum::<f64>()
            / total_weight
    }

    /// Indices of solutions on the Pareto frontier.
    ///
    /// Solution A dominates B when every weighted objective score of A
    /// is ≥ B's and at least one is strictly greater.
    pub fn pareto_frontier(&self, solutions: &[Vec<Assignment>]) -> Vec<usize> {
        let scores: Vec<Vec<f64>> = solutions
            .iter()
            .map(|solution| self.weighted_scores(solution))
            .collect();

        (0..solutions.len())
            .filter(|&i| {
                !scores
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && dominates(other, &scores[i]))
            })
            .collect()
    }
}

/// Whether score vector `a` dominates `b`.
fn dominates(a: &[f64], b: &[f64]) -> bool {
    let mut strictly_better = false;
    for (&sa, &sb) in a.iter().zip(b) {
        if sa < sb {
            return false;
        }
        if sa > sb {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Achievement scalarizing function over a reference point.
///
/// Computes the weighted Tchebycheff distance from a solution's
/// objective scores to the reference point; smaller is better.
#[derive(Debug, Clone)]
pub struct AchievementScalarizing {
    reference_point: Vec<f64>,
}

impl AchievementScalarizing {
    /// Creates the function with per-objective ideal values.
    pub fn new(reference_point: Vec<f64>) -> Self {
        Self { reference_point }
    }

    /// Weighted Tchebycheff distance; `weights` defaults to equal.
    pub fn distance(&self, scores: &[f64], weights: Option<&[f64]>) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }

        let equal = vec![1.0 / scores.len() as f64; scores.len()];
        let weights = weights.unwrap_or(&equal);

        scores
            .iter()
            .zip(&self.reference_point)
            .zip(weights)
            .map(|((score, reference), weight)| weight * (score - reference).abs())
            .fold(f64::NEG_INFINITY, f64::max)
    }
}
