//! Domain models for the timetabling engine.
//!
//! Pure value/entity types with validation and lookup-index construction:
//! [`Problem`], [`SessionRequest`], [`Resource`], [`Assignment`],
//! [`Calendar`], [`HolidayCalendar`], [`TimeBlocker`], and the solve
//! outcome types [`SolveResult`] / [`InfeasibilityReport`].

mod assignment;
mod attributes;
mod calendar;
mod holiday;
mod institution;
mod problem;
mod request;
mod resource;
mod result;
mod time_blocker;

pub use assignment::Assignment;
pub use attributes::{AttrValue, AttributeMap};
pub use calendar::{Calendar, TimeWindow, DEFAULT_GRANULARITY_MINUTES};
pub use holiday::{HolidayCalendar, HolidayPeriod};
pub use institution::{Building, Department, Teacher};
pub use problem::{OccupiedInterval, Problem, ProblemIndices};
pub use request::{Modality, PreferredSlot, SessionRequest};
pub use resource::{FallbackRole, Resource};
pub use result::{ConflictNote, InfeasibilityReport, SolveResult, SolveStatus};
pub use time_blocker::{TimeBlock, TimeBlocker};
