//! Session request model.
//!
//! A session request is one schedulable need: a course that must meet
//! `number_of_occurrences` times inside a date window, each meeting
//! lasting `duration_minutes`, with attribute requirements that qualify
//! the resources it may use. Requests are immutable after validation and
//! never mutated during solving.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attributes::{AttrValue, AttributeMap};
use crate::error::{ValidationError, ValidationErrorKind};

/// Delivery modality of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Delivered remotely; no physical room capacity applies.
    Online,
    /// Delivered in a physical room.
    #[default]
    InPerson,
    /// Mixed delivery.
    Hybrid,
}

/// A preferred local-time interval for session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredSlot {
    /// Interval start (inclusive).
    pub start: NaiveTime,
    /// Interval end (inclusive for containment of the session end).
    pub end: NaiveTime,
}

impl PreferredSlot {
    /// Creates a preferred slot.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether a session spanning `[start, end]` fits inside this slot.
    pub fn contains(&self, start: NaiveTime, end: NaiveTime) -> bool {
        start >= self.start && end <= self.end
    }
}

/// A request to schedule one or more session occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Unique request identifier.
    pub id: String,
    /// Length of each occurrence in minutes.
    pub duration_minutes: u32,
    /// How many occurrences must be scheduled.
    pub number_of_occurrences: u32,
    /// Earliest allowed session start (timezone-aware, inclusive).
    pub earliest_date: DateTime<FixedOffset>,
    /// Latest allowed session end (timezone-aware, inclusive).
    pub latest_date: DateTime<FixedOffset>,
    /// Cohort label copied onto every produced assignment.
    pub cohort_id: Option<String>,
    /// Delivery modality.
    pub modality: Modality,
    /// Attributes a resource must offer to qualify.
    pub required_attributes: AttributeMap,
    /// Enrolled student count.
    pub enrollment_count: u32,
    /// Minimum acceptable room capacity.
    pub min_capacity: Option<u32>,
    /// Maximum acceptable room capacity.
    pub max_capacity: Option<u32>,
    /// Assigned teacher, if fixed.
    pub teacher_id: Option<String>,
    /// Offering department.
    pub department_id: Option<String>,
    /// Preferred building (advisory).
    pub preferred_building_id: Option<String>,
    /// Required building (hard).
    pub required_building_id: Option<String>,
    /// Resource-type → how many resources of that type each occurrence
    /// needs. Empty means one `"room"`.
    pub required_resource_types: BTreeMap<String, u32>,
    /// Named weekday pattern (e.g. `"3days_mw"`); `None` = every weekday.
    pub scheduling_pattern: Option<String>,
    /// Whether occurrence dates must avoid holiday periods.
    pub avoid_holidays: bool,
    /// Minimum days between two occurrences.
    pub min_gap_days: Option<u32>,
    /// Cap on occurrences placed in a single week.
    pub max_occurrences_per_week: Option<u32>,
    /// Preferred start-time intervals; empty = any time.
    pub preferred_time_slots: Vec<PreferredSlot>,
}

impl SessionRequest {
    /// Creates a request with a 60-minute duration and one occurrence.
    pub fn new(
        id: impl Into<String>,
        earliest_date: DateTime<FixedOffset>,
        latest_date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            duration_minutes: 60,
            number_of_occurrences: 1,
            earliest_date,
            latest_date,
            cohort_id: None,
            modality: Modality::InPerson,
            required_attributes: AttributeMap::new(),
            enrollment_count: 0,
            min_capacity: None,
            max_capacity: None,
            teacher_id: None,
            department_id: None,
            preferred_building_id: None,
            required_building_id: None,
            required_resource_types: BTreeMap::new(),
            scheduling_pattern: None,
            avoid_holidays: false,
            min_gap_days: None,
            max_occurrences_per_week: None,
            preferred_time_slots: Vec::new(),
        }
    }

    /// Sets the occurrence duration in minutes.
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the number of occurrences.
    pub fn with_occurrences(mut self, count: u32) -> Self {
        self.number_of_occurrences = count;
        self
    }

    /// Sets the cohort label.
    pub fn with_cohort(mut self, cohort_id: impl Into<String>) -> Self {
        self.cohort_id = Some(cohort_id.into());
        self
    }

    /// Sets the modality.
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    /// Adds a required attribute.
    pub fn with_required_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Self {
        self.required_attributes.insert(key, value);
        self
    }

    /// Sets the enrollment count.
    pub fn with_enrollment(mut self, count: u32) -> Self {
        self.enrollment_count = count;
        self
    }

    /// Sets min/max acceptable room capacity.
    pub fn with_capacity_bounds(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_capacity = min;
        self.max_capacity = max;
        self
    }

    /// Fixes the teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }

    /// Sets the offering department.
    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    /// Sets the preferred building (advisory).
    pub fn with_preferred_building(mut self, building_id: impl Into<String>) -> Self {
        self.preferred_building_id = Some(building_id.into());
        self
    }

    /// Requires a specific building (hard).
    pub fn with_required_building(mut self, building_id: impl Into<String>) -> Self {
        self.required_building_id = Some(building_id.into());
        self
    }

    /// Requires `count` resources of `resource_type` per occurrence.
    pub fn with_resource_requirement(
        mut self,
        resource_type: impl Into<String>,
        count: u32,
    ) -> Self {
        self.required_resource_types.insert(resource_type.into(), count);
        self
    }

    /// Sets the weekday scheduling pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.scheduling_pattern = Some(pattern.into());
        self
    }

    /// Sets holiday avoidance.
    pub fn with_avoid_holidays(mut self, avoid: bool) -> Self {
        self.avoid_holidays = avoid;
        self
    }

    /// Sets the minimum gap between occurrences in days.
    pub fn with_min_gap_days(mut self, days: u32) -> Self {
        self.min_gap_days = Some(days);
        self
    }

    /// Caps occurrences per week.
    pub fn with_max_per_week(mut self, count: u32) -> Self {
        self.max_occurrences_per_week = Some(count);
        self
    }

    /// Adds a preferred start-time slot.
    pub fn with_preferred_slot(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.preferred_time_slots.push(PreferredSlot::new(start, end));
        self
    }

    /// Occurrence duration as a chrono duration.
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes as i64)
    }

    /// Resource demand per occurrence; defaults to one `"room"` when the
    /// request declares nothing.
    pub fn resource_demand(&self) -> BTreeMap<String, u32> {
        if self.required_resource_types.is_empty() {
            BTreeMap::from([("room".to_string(), 1)])
        } else {
            self.required_resource_types.clone()
        }
    }

    /// Validates request parameters.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.earliest_date > self.latest_date {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDateRange,
                format!(
                    "request '{}': earliest_date {} is after latest_date {}",
                    self.id, self.earliest_date, self.latest_date
                ),
            ));
        }

        if self.duration_minutes == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!("request '{}': duration must be positive", self.id),
            ));
        }

        if self.number_of_occurrences == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveOccurrences,
                format!("request '{}': number_of_occurrences must be positive", self.id),
            ));
        }

        if let (Some(min), Some(max)) = (self.min_capacity, self.max_capacity) {
            if min > max {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InconsistentCapacityBounds,
                    format!(
                        "request '{}': min_capacity {} exceeds max_capacity {}",
                        self.id, min, max
                    ),
                ));
            }
        }

        errors
    }
}
