//! Resource model.
//!
//! A resource is a bookable unit: a room, an instructor slot, a piece of
//! equipment. Each carries a type, an optional physical capacity, a typed
//! attribute map for capability matching, and an ordered list of fallback
//! roles describing which other room types it can stand in for.
//!
//! Resources are immutable during solving; occupancy bookkeeping lives in
//! the solver, never on the resource itself.

use serde::{Deserialize, Serialize};

use super::attributes::AttributeMap;

/// Extra headroom applied when fitting enrollment into a room.
const CAPACITY_BUFFER: f64 = 0.10;

/// A room type this resource can stand in for, with priority and
/// conversion metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRole {
    /// The room type served.
    pub room_type: String,
    /// Priority when several fallbacks compete (1 = highest).
    pub priority: u32,
    /// Minimum enrollment for this alternative use, if any.
    pub min_capacity: Option<u32>,
    /// Setup time needed to convert the room, in minutes.
    pub conversion_minutes: u32,
}

impl FallbackRole {
    /// Creates a fallback role with no capacity floor or conversion time.
    pub fn new(room_type: impl Into<String>, priority: u32) -> Self {
        Self {
            room_type: room_type.into(),
            priority,
            min_capacity: None,
            conversion_minutes: 0,
        }
    }

    /// Sets the minimum enrollment for this use.
    pub fn with_min_capacity(mut self, min_capacity: u32) -> Self {
        self.min_capacity = Some(min_capacity);
        self
    }

    /// Sets the conversion time in minutes.
    pub fn with_conversion_minutes(mut self, minutes: u32) -> Self {
        self.conversion_minutes = minutes;
        self
    }
}

/// A bookable resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Resource classification (e.g. `"room"`, `"instructor"`, `"lab"`).
    pub resource_type: String,
    /// Physical capacity (seats), when applicable.
    pub capacity: Option<u32>,
    /// Offered attributes for capability matching.
    pub attributes: AttributeMap,
    /// Availability calendar reference, if restricted.
    pub availability_calendar_id: Option<String>,
    /// Containing building, when applicable.
    pub building_id: Option<String>,
    /// Floor within the building.
    pub floor: Option<i32>,
    /// Room types this resource can stand in for, in declaration order.
    pub fallback_roles: Vec<FallbackRole>,
}

impl Resource {
    /// Creates a resource.
    pub fn new(id: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            capacity: None,
            attributes: AttributeMap::new(),
            availability_calendar_id: None,
            building_id: None,
            floor: None,
            fallback_roles: Vec::new(),
        }
    }

    /// Creates a room.
    pub fn room(id: impl Into<String>) -> Self {
        Self::new(id, "room")
    }

    /// Creates an instructor slot.
    pub fn instructor(id: impl Into<String>) -> Self {
        Self::new(id, "instructor")
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Adds an offered attribute.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<super::attributes::AttrValue>,
    ) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Sets the availability calendar reference.
    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.availability_calendar_id = Some(calendar_id.into());
        self
    }

    /// Sets the containing building.
    pub fn with_building(mut self, building_id: impl Into<String>) -> Self {
        self.building_id = Some(building_id.into());
        self
    }

    /// Sets the floor.
    pub fn with_floor(mut self, floor: i32) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Adds a fallback role.
    pub fn with_fallback_role(mut self, role: FallbackRole) -> Self {
        self.fallback_roles.push(role);
        self
    }

    /// Whether this resource's attributes satisfy a requirement map.
    pub fn satisfies(&self, required: &AttributeMap) -> bool {
        self.attributes.satisfies(required)
    }

    /// Whether this resource can serve as the given room type, either
    /// natively or through a fallback role.
    pub fn can_serve_as(&self, room_type: &str) -> bool {
        self.resource_type == room_type
            || self.fallback_roles.iter().any(|r| r.room_type == room_type)
    }

    /// Fallback priority when serving as `room_type` (1 = highest).
    /// Native use is priority 0; unknown types sink to the bottom.
    pub fn fallback_priority(&self, room_type: &str) -> u32 {
        if self.resource_type == room_type {
            return 0;
        }
        self.fallback_roles
            .iter()
            .find(|r| r.room_type == room_type)
            .map(|r| r.priority)
            .unwrap_or(u32::MAX)
    }

    /// The fallback role for a room type, if declared.
    pub fn fallback_role(&self, room_type: &str) -> Option<&FallbackRole> {
        self.fallback_roles.iter().find(|r| r.room_type == room_type)
    }

    /// Whether the room fits an enrollment within capacity bounds.
    ///
    /// Resources without a declared capacity always fit. A 10% headroom
    /// buffer is applied on top of the required seat count; rooms larger
    /// than `max_capacity` are rejected.
    pub fn fits_enrollment(
        &self,
        enrollment: u32,
        min_capacity: Option<u32>,
        max_capacity: Option<u32>,
    ) -> bool {
        let Some(capacity) = self.capacity else {
            return true;
        };

        let required = enrollment.max(min_capacity.unwrap_or(0));
        if required == 0 {
            return true;
        }

        let with_buffer = (required as f64 * (1.0 + CAPACITY_BUFFER)) as u32;
        if capacity < with_buffer {
            return false;
        }

        if let Some(max) = max_capacity {
            if capacity > max {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_builder() {
        let r = Resource::room("R101")
            .with_capacity(60)
            .with_attribute("projector", true)
            .with_attribute("lab_type", "chemistry")
            .with_building("science-hall")
            .with_floor(2);

        assert_eq!(r.resource_type, "room");
        assert_eq!(r.capacity, Some(60));
        assert_eq!(r.building_id.as_deref(), Some("science-hall"));
    }

    #[test]
    fn test_satisfies_requirements() {
        let r = Resource::room("R101")
            .with_attribute("projector", true)
            .with_attribute("outlets", 24_i64);

        let required = AttributeMap::new().with("projector", true);
        assert!(r.satisfies(&required));

        let missing = AttributeMap::new().with("smart_board", true);
        assert!(!r.satisfies(&missing));
    }

    #[test]
    fn test_capacity_fit_with_buffer() {
        let r = Resource::room("R101").with_capacity(50);
        // 45 students need 49 seats after the 10% buffer
        assert!(r.fits_enrollment(45, None, None));
        // 46 students need 50 seats after the buffer
        assert!(r.fits_enrollment(46, None, None));
        // 47 students need 51 seats
        assert!(!r.fits_enrollment(47, None, None));
    }

    #[test]
    fn test_capacity_bounds() {
        let r = Resource::room("AUD1").with_capacity(300);
        // Room exceeds the maximum acceptable capacity
        assert!(!r.fits_enrollment(20, None, Some(100)));
        assert!(r.fits_enrollment(20, None, Some(300)));
        // min_capacity raises the seat requirement
        let small = Resource::room("R1").with_capacity(30);
        assert!(!small.fits_enrollment(10, Some(40), None));
    }

    #[test]
    fn test_no_capacity_always_fits() {
        let r = Resource::instructor("prof_chen");
        assert!(r.fits_enrollment(500, None, None));
    }

    #[test]
    fn test_zero_requirement_always_fits() {
        let r = Resource::room("R101").with_capacity(10);
        assert!(r.fits_enrollment(0, None, None));
    }

    #[test]
    fn test_fallback_roles() {
        let r = Resource::new("CONF1", "conference_room").with_fallback_role(
            FallbackRole::new("seminar_room", 2)
                .with_min_capacity(10)
                .with_conversion_minutes(20),
        );

        assert!(r.can_serve_as("conference_room"));
        assert!(r.can_serve_as("seminar_room"));
        assert!(!r.can_serve_as("computer_lab"));

        assert_eq!(r.fallback_priority("conference_room"), 0);
        assert_eq!(r.fallback_priority("seminar_room"), 2);
        assert_eq!(r.fallback_priority("computer_lab"), u32::MAX);

        let role = r.fallback_role("seminar_room").unwrap();
        assert_eq!(role.min_capacity, Some(10));
        assert_eq!(role.conversion_minutes, 20);
    }
}
