//! Subject model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents one teachable subject (theory or lab)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject identifier (e.g., "SUBJ012")
    pub id: String,

    /// Short code shown on printed timetables (e.g., "CS301")
    #[serde(default)]
    pub code: Option<String>,

    /// Display name
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// Total required contact hours over the semester
    #[serde(rename = "totalHours")]
    pub total_hours: u32,

    /// Credit value
    #[serde(default)]
    pub credits: Option<u32>,

    /// Lab subjects occupy a block of 2 consecutive periods
    #[serde(default)]
    pub is_lab: bool,

    /// Faculty chosen by the workload balancer for this subject in a section
    #[serde(default)]
    pub assigned_faculty_id: Option<String>,
}

impl Subject {
    /// Create a new subject
    ///
    /// # Arguments
    /// * `id` - Subject identifier
    /// * `name` - Display name
    /// * `total_hours` - Required contact hours for the semester
    /// * `is_lab` - Whether sessions occupy a 2-period block
    #[must_use]
    pub const fn new(id: String, name: String, total_hours: u32, is_lab: bool) -> Self {
        Self {
            id,
            code: None,
            name,
            description: None,
            total_hours,
            credits: None,
            is_lab,
            assigned_faculty_id: None,
        }
    }

    /// Number of consecutive periods one session of this subject occupies
    #[must_use]
    pub const fn block_length(&self) -> u32 {
        if self.is_lab {
            2
        } else {
            1
        }
    }
}

/// One elective group: a set of mutually exclusive subject options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectiveGroup {
    /// The subject options offered within this group
    pub subjects: Vec<Subject>,
}

/// Subjects taught in one semester: core subjects plus elective groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterSubjects {
    /// Core subjects every section of the semester teaches
    pub subjects: Vec<Subject>,

    /// Elective groups keyed by group label
    #[serde(default)]
    pub electives: BTreeMap<String, ElectiveGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theory_occupies_one_period() {
        let subject = Subject::new("SUBJ001".to_string(), "Algorithms".to_string(), 45, false);
        assert_eq!(subject.block_length(), 1);
    }

    #[test]
    fn lab_occupies_two_periods() {
        let subject = Subject::new("SUBJ002".to_string(), "OS Lab".to_string(), 30, true);
        assert_eq!(subject.block_length(), 2);
    }

    #[test]
    fn deserializes_master_record() {
        let json = r#"{
            "id": "SUBJ044",
            "name": "Deep Learning",
            "totalHours": 45,
            "is_lab": false
        }"#;
        let subject: Subject = serde_json::from_str(json).expect("subject record");
        assert_eq!(subject.id, "SUBJ044");
        assert_eq!(subject.total_hours, 45);
        assert!(!subject.is_lab);
        assert!(subject.assigned_faculty_id.is_none());
    }
}
