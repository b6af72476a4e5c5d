//! Error types for the timetabling engine.
//!
//! Three failure kinds exist in the engine:
//! - [`ValidationError`]: malformed input data, reported before any search
//!   begins. Fatal to the solve call.
//! - [`crate::constraints::Violation`]: a business-rule failure discovered
//!   while checking one candidate placement. Always returned as data and
//!   surfaced through diagnostics, never raised.
//! - [`SolveError::Backend`]: a solver backend failure. Recoverable: with
//!   `fallback` enabled the heuristic engine answers instead.
//!
//! Ordinary infeasibility is not an error — it is a normal
//! [`crate::models::SolveStatus::Infeasible`] or `Partial` outcome.

use std::fmt;

use thiserror::Error;

/// Categories of input validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// `earliest_date` is after `latest_date`.
    InvalidDateRange,
    /// A duration is zero or negative.
    NonPositiveDuration,
    /// A request asks for zero occurrences.
    NonPositiveOccurrences,
    /// `min_capacity` exceeds `max_capacity`.
    InconsistentCapacityBounds,
    /// A calendar reference does not resolve.
    MissingCalendarReference,
    /// A holiday period ends before it starts.
    InvalidHolidayPeriod,
    /// A calendar declares a non-positive timeslot granularity.
    InvalidGranularity,
}

/// A single input validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A fatal solve failure.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The problem failed input validation; no search was attempted.
    #[error("problem validation failed ({} error(s))", .0.len())]
    Validation(Vec<ValidationError>),

    /// A solver backend failed or is unavailable.
    #[error("backend '{backend}' failed: {reason}")]
    Backend { backend: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let e = ValidationError::new(
            ValidationErrorKind::InvalidDateRange,
            "earliest_date is after latest_date",
        );
        assert_eq!(e.to_string(), "earliest_date is after latest_date");
    }

    #[test]
    fn test_solve_error_display() {
        let e = SolveError::Validation(vec![ValidationError::new(
            ValidationErrorKind::DuplicateId,
            "duplicate request ID: CS101",
        )]);
        assert_eq!(e.to_string(), "problem validation failed (1 error(s))");

        let b = SolveError::Backend {
            backend: "cp".into(),
            reason: "not available in this build".into(),
        };
        assert!(b.to_string().contains("cp"));
        assert!(b.to_string().contains("not available"));
    }
}
