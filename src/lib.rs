//! Course timetabling engine.
//!
//! Assigns recurring scheduling requests (course sessions) to scarce,
//! typed resources (rooms, instructor slots, equipment) across a bounded
//! academic calendar, subject to hard feasibility rules and soft
//! preference objectives.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Problem`, `SessionRequest`,
//!   `Resource`, `Assignment`, `Calendar`, `HolidayCalendar`,
//!   `TimeBlocker`, `SolveResult`
//! - **`constraints`**: The pluggable constraint framework — the
//!   `Constraint` trait, built-in hard/soft rules, composite combinators
//! - **`spread`**: Occurrence generation and anti-clustering spreading
//! - **`solver`**: The `SolverBackend` contract, the greedy
//!   `HeuristicSolver`, and the `solve` entry point
//! - **`objectives`**: Multi-objective solution scoring
//! - **`diagnostics`**: Violation ranking and infeasibility reporting
//!
//! # Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use timetabler::models::{Calendar, Problem, Resource, SessionRequest};
//! use timetabler::solve;
//!
//! let tz = FixedOffset::east_opt(0).unwrap();
//! let problem = Problem::new()
//!     .with_calendar(Calendar::new("main").with_granularity_minutes(60))
//!     .with_institutional_calendar("main")
//!     .with_resource(Resource::room("R101").with_capacity(40))
//!     .with_request(
//!         SessionRequest::new(
//!             "CS101",
//!             tz.with_ymd_and_hms(2025, 1, 6, 0, 0, 0).unwrap(),
//!             tz.with_ymd_and_hms(2025, 3, 14, 23, 0, 0).unwrap(),
//!         )
//!         .with_duration_minutes(90)
//!         .with_occurrences(10),
//!     );
//!
//! let result = solve(&problem, Some(42), true).unwrap();
//! assert_eq!(result.assignments.len(), 10);
//! ```
//!
//! # Determinism
//!
//! The `seed` parameter is the sole source of non-determinism: identical
//! `(Problem, seed)` inputs always yield identical assignment lists.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated
//!   Timetabling"

pub mod constraints;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod objectives;
pub mod solver;
pub mod spread;

pub use error::{SolveError, ValidationError, ValidationErrorKind};
pub use solver::{solve, solve_with_backend, Backend, HeuristicSolver, SolverBackend, SolverLimits};
