//! Assignment model — the atomic scheduling output.
//!
//! An assignment places one occurrence of a session request into a
//! concrete time interval with a concrete set of resources. Assignments
//! are created exclusively by the solver and are immutable once produced;
//! the growing assignment list is the "partial solution" every constraint
//! check runs against.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Placement of one session occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Originating request.
    pub request_id: String,
    /// Zero-based occurrence index within the request.
    pub occurrence_index: u32,
    /// Session start (timezone-aware).
    pub start_time: DateTime<FixedOffset>,
    /// Session end (timezone-aware).
    pub end_time: DateTime<FixedOffset>,
    /// Cohort label copied from the originating request.
    pub cohort_id: Option<String>,
    /// Resource-type → resource ids placed there.
    pub assigned_resources: BTreeMap<String, Vec<String>>,
}

impl Assignment {
    /// Creates an assignment with no resources attached yet.
    pub fn new(
        request_id: impl Into<String>,
        occurrence_index: u32,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            occurrence_index,
            start_time,
            end_time,
            cohort_id: None,
            assigned_resources: BTreeMap::new(),
        }
    }

    /// Sets the cohort label.
    pub fn with_cohort(mut self, cohort_id: Option<String>) -> Self {
        self.cohort_id = cohort_id;
        self
    }

    /// Places a resource under a resource type.
    pub fn with_resource(mut self, resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        self.assigned_resources
            .entry(resource_type.into())
            .or_default()
            .push(resource_id.into());
        self
    }

    /// Replaces the full resource mapping.
    pub fn with_resources(mut self, resources: BTreeMap<String, Vec<String>>) -> Self {
        self.assigned_resources = resources;
        self
    }

    /// Session length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Whether a specific resource is used by this assignment.
    pub fn uses_resource(&self, resource_id: &str) -> bool {
        self.assigned_resources
            .values()
            .any(|ids| ids.iter().any(|id| id == resource_id))
    }

    /// All resource ids used, in resource-type order.
    pub fn resource_ids(&self) -> impl Iterator<Item = &String> {
        self.assigned_resources.values().flatten()
    }

    /// Whether two assignments overlap in time.
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }
}
