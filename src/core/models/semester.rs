//! Semester window, exam range, and holiday records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The date window one semester runs over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterWindow {
    /// Semester identifier, matched against `Section::semester` (e.g., "3-2")
    pub id: String,

    /// Display name
    pub name: String,

    /// First day of the semester
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,

    /// Last day of the semester (inclusive)
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,

    /// Total contact hours planned for the semester
    #[serde(rename = "totalHours", default)]
    pub total_hours: u32,
}

/// An inclusive range of exam days; no classes are scheduled inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRange {
    /// Exam block identifier
    pub id: String,

    /// Semester this exam block belongs to
    #[serde(rename = "semesterId")]
    pub semester_id: String,

    /// First exam day
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,

    /// Last exam day (inclusive)
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
}

/// A single full-day holiday
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Date of the holiday
    pub holiday_date: NaiveDate,

    /// What is being observed
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_window_record() {
        let json = r#"{
            "id": "3-2",
            "name": "Third Year Even Semester",
            "startDate": "2025-01-06",
            "endDate": "2025-05-10",
            "totalHours": 540
        }"#;
        let window: SemesterWindow = serde_json::from_str(json).expect("semester window");
        assert_eq!(window.id, "3-2");
        assert!(window.start_date < window.end_date);
    }

    #[test]
    fn deserializes_holiday_record() {
        let json = r#"{"holiday_date": "2025-01-26", "description": "Republic Day"}"#;
        let holiday: Holiday = serde_json::from_str(json).expect("holiday");
        assert_eq!(holiday.description, "Republic Day");
    }
}
