//! Post-hoc solution scoring.
//!
//! An [`Objective`] maps a (possibly partial) solution to a quality score
//! in `[0, 1]`, 1 being best. An empty solution is vacuously optimal and
//! scores exactly 1.0. Objectives are preferences — they are never
//! enforced during search, only measured afterwards.
//!
//! Built-in objectives: [`SpreadEvenlyAcrossTerm`],
//! [`MinimizeEveningSessions`], [`BalanceInstructorLoad`]. Several
//! objectives combine through [`MultiObjective`].

mod multi;

pub use multi::{AchievementScalarizing, MultiObjective};

use std::collections::HashMap;

use crate::models::Assignment;

/// A solution-quality preference.
pub trait Objective: Send + Sync {
    /// Scores a solution in `[0, 1]`, 1 being best.
    ///
    /// Must return exactly 1.0 for an empty solution and must never
    /// return a value outside `[0, 1]`.
    fn score(&self, solution: &[Assignment]) -> f64;

    /// Unique type tag (e.g. `"soft.spread_evenly_across_term"`).
    fn objective_type(&self) -> &'static str;

    /// Relative weight when combined with other objectives.
    fn weight(&self) -> f64 {
        1.0
    }
}

/// Rewards an even distribution of sessions across days.
///
/// Computes the variance of per-day session counts and normalizes it
/// against the worst case of every session landing on one day.
pub struct SpreadEvenlyAcrossTerm {
    weight: f64,
}

impl SpreadEvenlyAcrossTerm {
    /// Creates the objective with weight 1.0.
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for SpreadEvenlyAcrossTerm {
    fn default() -> Self {
        Self::new()
    }
}

impl Objective for SpreadEvenlyAcrossTerm {
    fn score(&self, solution: &[Assignment]) -> f64 {
        if solution.is_empty() {
            return 1.0;
        }

        let mut daily_counts: HashMap<chrono::NaiveDate, usize> = HashMap::new();
        for assignment in solution {
            *daily_counts
                .entry(assignment.start_time.date_naive())
                .or_insert(0) += 1;
        }

        let counts: Vec<f64> = daily_counts.values().map(|&c| c as f64).collect();
        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        let variance =
            counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;

        // Worst case: every session on a single day
        let max_variance = (solution.len() as f64).powi(2) / daily_counts.len() as f64;
        if max_variance == 0.0 {
            return 1.0;
        }

        (1.0 - variance / max_variance).clamp(0.0, 1.0)
    }

    fn objective_type(&self) -> &'static str {
        "soft.spread_evenly_across_term"
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Penalizes sessions starting at or after an evening threshold hour.
pub struct MinimizeEveningSessions {
    weight: f64,
    evening_threshold_hour: u32,
}

impl MinimizeEveningSessions {
    /// Creates the objective with the default 17:00 threshold.
    pub fn new() -> Self {
        Self {
            weight: 1.0,
            evening_threshold_hour: 17,
        }
    }

    /// Sets the threshold hour (sessions starting at or after it count
    /// as evening sessions).
    pub fn with_threshold_hour(mut self, hour: u32) -> Self {
        self.evening_threshold_hour = hour;
        self
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for MinimizeEveningSessions {
    fn default() -> Self {
        Self::new()
    }
}

impl Objective for MinimizeEveningSessions {
    fn score(&self, solution: &[Assignment]) -> f64 {
        use chrono::Timelike;

        if solution.is_empty() {
            return 1.0;
        }

        let evening = solution
            .iter()
            .filter(|a| a.start_time.time().hour() >= self.evening_threshold_hour)
            .count();

        (1.0 - evening as f64 / solution.len() as f64).clamp(0.0, 1.0)
    }

    fn objective_type(&self) -> &'static str {
        "soft.minimize_evening_sessions"
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Rewards balanced teaching loads.
///
/// Computes the variance of per-instructor total hours across resources
/// assigned under the `"instructor"` type, normalized against the worst
/// case of one instructor carrying every hour.
pub struct BalanceInstructorLoad {
    weight: f64,
}

impl BalanceInstructorLoad {
    /// Creates the objective with weight 1.0.
    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    /// Sets the weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for BalanceInstructorLoad {
    fn default() -> Self {
        Self::new()
    }
}

impl Objective for BalanceInstructorLoad {
    fn score(&self, solution: &[Assignment]) -> f64 {
        if solution.is_empty() {
            return 1.0;
        }

        let mut hours_by_instructor: HashMap<&str, f64> = HashMap::new();
        for assignment in solution {
            if let Some(instructors) = assignment.assigned_resources.get("instructor") {
                let hours = assignment.duration_minutes() as f64 / 60.0;
                for instructor in instructors {
                    *hours_by_instructor.entry(instructor.as_str()).or_insert(0.0) += hours;
                }
            }
        }

        if hours_by_instructor.is_empty() {
            return 1.0;
        }

        let loads: Vec<f64> = hours_by_instructor.values().copied().collect();
        let total: f64 = loads.iter().sum();
        let mean = total / loads.len() as f64;
        let variance = loads.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / loads.len() as f64;

        // Worst case: one instructor carries every hour
        let max_variance = total.powi(2) / loads.len() as f64;
        if max_variance == 0.0 {
            return 1.0;
        }

        (1.0 - variance / max_variance).clamp(0.0, 1.0)
    }

    fn objective_type(&self) -> &'static str {
        "soft.balance_instructor_load"
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}
