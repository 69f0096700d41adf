//! Dataset loading.
//!
//! Reads the department dataset from a directory of JSON files into typed
//! records. Calendar files and enrollments are optional and default to
//! empty with a warning; everything else is required and fails the load.

use crate::core::error::Error;
use crate::core::models::{
    Classroom, ElectiveEnrollment, ExamRange, Faculty, Holiday, Section, SemesterSubjects,
    SemesterWindow, Subject,
};
use crate::{info, warn};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// File name of the semester windows list
pub const SEMESTER_DATES_FILE: &str = "semesterdates.json";
/// File name of the exam date ranges
pub const EXAM_DATES_FILE: &str = "semester-exam-dates.json";
/// File name of the holiday list
pub const HOLIDAYS_FILE: &str = "semester-holidays.json";
/// File name of the subject masters
pub const SUBJECTS_MASTER_FILE: &str = "aiml_subjects_master.json";
/// File name of the per-semester subject enumeration
pub const SEMESTER_SUBJECTS_FILE: &str = "aiml-semester_subjects.json";
/// File name of the faculty records
pub const FACULTY_FILE: &str = "aiml-faculty-detailed.json";
/// File name of the section list
pub const SECTIONS_FILE: &str = "department-sections-semester2.json";
/// File name of the classroom list
pub const CLASSROOMS_FILE: &str = "classrooms.json";
/// File name of the elective enrollments
pub const ENROLLMENTS_FILE: &str = "elective-subjects-enrollment.json";

/// The fully loaded dataset
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Semester calendar windows
    pub semester_windows: Vec<SemesterWindow>,
    /// Exam date ranges (full-day exclusions)
    pub exam_ranges: Vec<ExamRange>,
    /// Holidays (full-day exclusions)
    pub holidays: Vec<Holiday>,
    /// Subject master records
    pub subjects_master: Vec<Subject>,
    /// Per-semester subjects, core and elective
    pub semester_subjects: BTreeMap<String, SemesterSubjects>,
    /// Faculty records
    pub faculty: Vec<Faculty>,
    /// Department sections
    pub sections: Vec<Section>,
    /// Classrooms
    pub classrooms: Vec<Classroom>,
    /// Elective enrollments
    pub elective_enrollments: Vec<ElectiveEnrollment>,
}

fn read_required<T: DeserializeOwned>(dir: &Path, name: &str) -> Result<T, Error> {
    let path = dir.join(name);
    info!("loading {name}...");
    let raw = fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::MissingInput(path.clone())
        } else {
            Error::Io {
                path: path.clone(),
                source,
            }
        }
    })?;
    serde_json::from_str(&raw).map_err(|source| Error::Parse { path, source })
}

fn read_optional<T: DeserializeOwned + Default>(dir: &Path, name: &str) -> Result<T, Error> {
    let path = dir.join(name);
    if !path.exists() {
        warn!("optional input {name} not found; continuing without it");
        return Ok(T::default());
    }
    read_required(dir, name)
}

/// Load all input files from a dataset directory
pub fn load_inputs(dir: &Path) -> Result<Inputs, Error> {
    let inputs = Inputs {
        semester_windows: read_required(dir, SEMESTER_DATES_FILE)?,
        exam_ranges: read_optional(dir, EXAM_DATES_FILE)?,
        holidays: read_optional(dir, HOLIDAYS_FILE)?,
        subjects_master: read_required(dir, SUBJECTS_MASTER_FILE)?,
        semester_subjects: read_required(dir, SEMESTER_SUBJECTS_FILE)?,
        faculty: read_required(dir, FACULTY_FILE)?,
        sections: read_required(dir, SECTIONS_FILE)?,
        classrooms: read_required(dir, CLASSROOMS_FILE)?,
        elective_enrollments: read_optional(dir, ENROLLMENTS_FILE)?,
    };
    info!(
        "loaded dataset: sections={} faculty={} classrooms={} subjects={}",
        inputs.sections.len(),
        inputs.faculty.len(),
        inputs.classrooms.len(),
        inputs.subjects_master.len()
    );
    Ok(inputs)
}
