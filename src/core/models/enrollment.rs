//! Elective enrollment records

use serde::{Deserialize, Serialize};

/// One elective option picked inside a section, with its headcount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveChoice {
    /// Subject identifier of the elective option
    pub subject_id: String,

    /// Display name
    pub name: String,

    /// Required contact hours for the semester
    pub hours: u32,

    /// Whether the option is a lab
    #[serde(default)]
    pub is_lab: bool,

    /// Students from this section enrolled in the option
    #[serde(rename = "studentsEnrolled")]
    pub students_enrolled: u32,
}

/// Elective enrollments of one real section in one elective group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveEnrollment {
    /// Real section the enrollments come from
    pub section_id: String,

    /// Display name of that section
    #[serde(rename = "sectionName")]
    pub section_name: String,

    /// Semester label; must refer to a semester present in the section list
    pub semester: String,

    /// Section headcount
    #[serde(rename = "totalStudents")]
    pub total_students: u32,

    /// Elective group label
    pub elective_group: String,

    /// Options picked within the group, with per-option headcounts
    pub subjects: Vec<ElectiveChoice>,
}
