//! Section models: raw department sections and normalized planning sections

use super::Subject;
use serde::{Deserialize, Serialize};

/// A cohort of students as loaded from the department dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier (e.g., "aiml-3-a")
    pub id: String,

    /// Display name
    pub name: String,

    /// Year of study
    pub year: u32,

    /// Section letter within the year (e.g., "a")
    pub section: String,

    /// Semester label (e.g., "3-2")
    pub semester: String,

    /// Enrolled student count
    #[serde(rename = "totalStudents")]
    pub total_students: u32,

    /// Class teacher, if designated
    #[serde(rename = "classTeacher", default)]
    pub class_teacher: Option<String>,
}

/// A section after normalization: subjects attached, classroom mapped.
///
/// Virtual sections are synthesized from elective enrollments; a section is
/// virtual iff `is_virtual` is set and `elective_group` names its group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSection {
    /// Section identifier; virtual sections use the
    /// `VIRTUAL-{semester}-{group}-{subject_id}` format
    pub id: String,

    /// Display name
    pub name: String,

    /// Year of study
    pub year: u32,

    /// Section letter, or `{group}-{subject_id}` for virtual sections
    pub section: String,

    /// Semester label
    pub semester: String,

    /// Enrolled student count (pooled across real sections when virtual)
    pub total_students: u32,

    /// Class teacher, if designated
    #[serde(default)]
    pub class_teacher: Option<String>,

    /// Subjects this section teaches, in timetable order
    pub subjects: Vec<Subject>,

    /// Classroom chosen by the room mapper
    #[serde(default)]
    pub mapped_classroom: Option<String>,

    /// Whether this section was synthesized from elective enrollments
    #[serde(default)]
    pub is_virtual: bool,

    /// Elective group label, set only for virtual sections
    #[serde(default)]
    pub elective_group: Option<String>,
}

impl NormalizedSection {
    /// Build a normalized section from a raw section plus its subject list
    #[must_use]
    pub fn from_section(
        section: &Section,
        subjects: Vec<Subject>,
        mapped_classroom: Option<String>,
    ) -> Self {
        Self {
            id: section.id.clone(),
            name: section.name.clone(),
            year: section.year,
            section: section.section.clone(),
            semester: section.semester.clone(),
            total_students: section.total_students,
            class_teacher: section.class_teacher.clone(),
            subjects,
            mapped_classroom,
            is_virtual: false,
            elective_group: None,
        }
    }
}
