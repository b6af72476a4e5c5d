//! Auxiliary institutional entities referenced by constraints.
//!
//! Buildings, departments, and teaching staff are lookup data: requests
//! and resources reference them by id, and constraint checks resolve the
//! references through the problem indices.

use serde::{Deserialize, Serialize};

/// A campus building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Building identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Building {
    /// Creates a building.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An academic department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Department identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Department {
    /// Creates a department.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A member of teaching staff.
///
/// Setup and cleanup buffers pad the teacher's bookings when the solver
/// checks resource occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Teacher identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Home department, if any.
    pub department_id: Option<String>,
    /// Minutes needed before a session starts.
    pub setup_minutes: u32,
    /// Minutes needed after a session ends.
    pub cleanup_minutes: u32,
}

impl Teacher {
    /// Creates a teacher with no buffers.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department_id: None,
            setup_minutes: 0,
            cleanup_minutes: 0,
        }
    }

    /// Sets the home department.
    pub fn with_department(mut self, department_id: impl Into<String>) -> Self {
        self.department_id = Some(department_id.into());
        self
    }

    /// Sets setup/cleanup buffers in minutes.
    pub fn with_buffers(mut self, setup_minutes: u32, cleanup_minutes: u32) -> Self {
        self.setup_minutes = setup_minutes;
        self.cleanup_minutes = cleanup_minutes;
        self
    }
}
