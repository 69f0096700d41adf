//! Classroom model

use serde::{Deserialize, Serialize};

/// A physical room that sections can be mapped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    /// Room identifier (e.g., "CR-101")
    pub id: String,

    /// Display name
    pub name: String,

    /// Door number
    #[serde(default)]
    pub number: Option<String>,

    /// Room type; only `classroom` and `conference` are eligible for scheduling
    #[serde(rename = "type")]
    pub room_type: String,

    /// Seating capacity
    pub capacity: u32,

    /// Floor the room is on
    #[serde(default)]
    pub floor: Option<i32>,

    /// Building name
    #[serde(default)]
    pub building: Option<String>,

    /// Owning department
    #[serde(default)]
    pub department: Option<String>,

    /// Operational status
    #[serde(default)]
    pub status: Option<String>,
}

impl Classroom {
    /// Create a new classroom record
    #[must_use]
    pub const fn new(id: String, name: String, room_type: String, capacity: u32) -> Self {
        Self {
            id,
            name,
            number: None,
            room_type,
            capacity,
            floor: None,
            building: None,
            department: None,
            status: None,
        }
    }

    /// Whether this room may be assigned to a section.
    /// Lab rooms are pooled globally and never mapped per section.
    #[must_use]
    pub fn is_schedulable(&self) -> bool {
        matches!(
            self.room_type.to_ascii_lowercase().as_str(),
            "classroom" | "conference"
        )
    }
}
