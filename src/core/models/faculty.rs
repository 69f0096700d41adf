//! Faculty model

use serde::{Deserialize, Serialize};

/// A faculty member and the subjects they can teach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    /// Faculty identifier used throughout the model (e.g., "FAC009")
    pub id: String,

    /// Display name
    pub name: String,

    /// Institutional staff number
    #[serde(rename = "facultyId", default)]
    pub faculty_id: Option<String>,

    /// Home department
    #[serde(default)]
    pub department: String,

    /// Areas of specialization
    #[serde(default)]
    pub specialization: Vec<String>,

    /// Subject identifiers this faculty is eligible to teach
    /// (matched case-insensitively against the subject masters)
    pub subjects: Vec<String>,
}

impl Faculty {
    /// Create a new faculty record
    #[must_use]
    pub const fn new(id: String, name: String, subjects: Vec<String>) -> Self {
        Self {
            id,
            name,
            faculty_id: None,
            department: String::new(),
            specialization: Vec::new(),
            subjects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_detailed_record() {
        let json = r#"{
            "id": "FAC003",
            "name": "Dr. Rao",
            "facultyId": "EMP-1104",
            "department": "AIML",
            "subjects": ["subj001", "SUBJ007"]
        }"#;
        let faculty: Faculty = serde_json::from_str(json).expect("faculty record");
        assert_eq!(faculty.id, "FAC003");
        assert_eq!(faculty.subjects.len(), 2);
        assert!(faculty.specialization.is_empty());
    }
}
