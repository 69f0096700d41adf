//! Section normalization.
//!
//! Attaches per-semester subjects to each real section, synthesizes virtual
//! sections from elective enrollments, converts subject hours into period
//! requirements, and validates that requirements fit the calendar.

use crate::core::calendar::AcademicCalendar;
use crate::core::models::{
    ElectiveEnrollment, NormalizedSection, Section, SemesterSubjects, Subject,
};
use crate::{info, warn};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Identifier prefix of synthesized elective sections.
///
/// The full format `VIRTUAL-{semester}-{group}-{subject_id}` is a contract
/// with the output enrichment step, which parses the second `-`-separated
/// token as the year.
pub const VIRTUAL_PREFIX: &str = "VIRTUAL-";

/// Periods required per section for a subject, given the period length.
///
/// Zero-hour subjects require zero periods and later produce no variables
/// or constraints.
#[must_use]
pub fn required_periods(total_hours: u32, period_length_hours: f64) -> u32 {
    if total_hours == 0 || period_length_hours <= 0.0 {
        return 0;
    }
    let periods = (f64::from(total_hours) / period_length_hours).ceil();
    if periods >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        periods as u32
    }
}

/// Compute the subject → required-periods map over all semester subjects,
/// core and elective alike
#[must_use]
pub fn build_period_requirements(
    semester_subjects: &BTreeMap<String, SemesterSubjects>,
    period_length_hours: f64,
) -> HashMap<String, u32> {
    let mut requirements = HashMap::new();
    for entry in semester_subjects.values() {
        for subject in &entry.subjects {
            requirements.insert(
                subject.id.clone(),
                required_periods(subject.total_hours, period_length_hours),
            );
        }
        for group in entry.electives.values() {
            for subject in &group.subjects {
                requirements.insert(
                    subject.id.clone(),
                    required_periods(subject.total_hours, period_length_hours),
                );
            }
        }
    }
    requirements
}

/// Synthesize one virtual section per `(semester, elective_group, subject)`
/// triple, pooling enrolled students across real sections.
///
/// Enrollments referring to semesters absent from the section list are
/// dropped with a warning.
#[must_use]
pub fn generate_virtual_sections(
    sections: &[Section],
    enrollments: &[ElectiveEnrollment],
) -> Vec<NormalizedSection> {
    let valid_semesters: HashSet<&str> =
        sections.iter().map(|s| s.semester.as_str()).collect();

    // Group by (semester, group, subject) in first-seen order
    let mut order: Vec<(String, String, String)> = Vec::new();
    let mut pooled: HashMap<(String, String, String), (Subject, u32)> = HashMap::new();

    for enrollment in enrollments {
        if !valid_semesters.contains(enrollment.semester.as_str()) {
            warn!(
                "ignoring enrollment for semester '{}' (not in section list)",
                enrollment.semester
            );
            continue;
        }
        for choice in &enrollment.subjects {
            let key = (
                enrollment.semester.clone(),
                enrollment.elective_group.clone(),
                choice.subject_id.clone(),
            );
            if let Some((_, students)) = pooled.get_mut(&key) {
                *students += choice.students_enrolled;
            } else {
                let subject = Subject::new(
                    choice.subject_id.clone(),
                    choice.name.clone(),
                    choice.hours,
                    choice.is_lab,
                );
                order.push(key.clone());
                pooled.insert(key, (subject, choice.students_enrolled));
            }
        }
    }

    let mut virtual_sections = Vec::with_capacity(order.len());
    for key in order {
        let (semester, group, subject_id) = key.clone();
        let (subject, total_students) = pooled.remove(&key).unwrap_or_else(|| {
            (Subject::new(subject_id.clone(), subject_id.clone(), 0, false), 0)
        });

        let year_token = semester.split('-').next().unwrap_or_default();
        let year = year_token.parse::<u32>().unwrap_or_else(|_| {
            warn!("semester '{semester}' has a non-numeric year token '{year_token}'");
            0
        });

        let id = format!("{VIRTUAL_PREFIX}{semester}-{group}-{subject_id}");
        virtual_sections.push(NormalizedSection {
            id: id.clone(),
            name: id,
            year,
            section: format!("{group}-{subject_id}"),
            semester,
            total_students,
            class_teacher: None,
            subjects: vec![subject],
            mapped_classroom: None,
            is_virtual: true,
            elective_group: Some(group),
        });
    }

    info!("generated {} virtual elective sections", virtual_sections.len());
    virtual_sections
}

/// Attach per-semester core subjects to each real section.
///
/// Sections whose semester has no subject entry get an empty subject list
/// with a warning.
#[must_use]
pub fn normalize_sections(
    sections: &[Section],
    semester_subjects: &BTreeMap<String, SemesterSubjects>,
    room_map: &HashMap<String, String>,
) -> Vec<NormalizedSection> {
    let mut normalized = Vec::with_capacity(sections.len());
    for section in sections {
        let subjects = match semester_subjects.get(&section.semester) {
            Some(entry) => entry.subjects.clone(),
            None => {
                warn!(
                    "section '{}' semester '{}' has no subject entry",
                    section.id, section.semester
                );
                Vec::new()
            }
        };
        normalized.push(NormalizedSection::from_section(
            section,
            subjects,
            room_map.get(&section.id).cloned(),
        ));
    }
    normalized
}

/// Result of the pre-model fit validation
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Whether every section and elective group fits the calendar
    pub ok: bool,
    /// Human-readable findings, one per section or elective group
    pub details: Vec<String>,
}

/// Check that each section's required periods fit the available periods,
/// and that each elective group fits the free periods its semester's real
/// sections leave over.
#[must_use]
pub fn validate_section_capacity(
    sections: &[NormalizedSection],
    period_requirements: &HashMap<String, u32>,
    calendar: &AcademicCalendar,
) -> ValidationReport {
    let available = i64::from(calendar.total_periods());
    let mut report = ValidationReport {
        ok: true,
        details: Vec::new(),
    };

    // Free periods accumulate per semester while walking real sections
    let mut semester_free: HashMap<&str, i64> = HashMap::new();

    for section in sections.iter().filter(|s| !s.is_virtual) {
        let required: i64 = section
            .subjects
            .iter()
            .map(|subject| i64::from(*period_requirements.get(&subject.id).unwrap_or(&0)))
            .sum();
        let free = available - required;
        if required > available {
            report.ok = false;
            report.details.push(format!(
                "section {} insufficient periods: required={required}, available={available}",
                section.id
            ));
        } else {
            report.details.push(format!(
                "section {} ok: required={required}, available={available}, free={free}",
                section.id
            ));
        }
        *semester_free.entry(section.semester.as_str()).or_insert(0) += free;
    }

    // Elective options of one group run in parallel, so a group needs the
    // max over its options, drawn from the semester's pooled free periods
    let mut group_order: Vec<(&str, &str)> = Vec::new();
    let mut group_required: HashMap<(&str, &str), i64> = HashMap::new();
    for section in sections.iter().filter(|s| s.is_virtual) {
        let Some(group) = section.elective_group.as_deref() else {
            continue;
        };
        let key = (section.semester.as_str(), group);
        let required = section
            .subjects
            .iter()
            .map(|subject| i64::from(*period_requirements.get(&subject.id).unwrap_or(&0)))
            .max()
            .unwrap_or(0);
        match group_required.get_mut(&key) {
            Some(max_required) => *max_required = (*max_required).max(required),
            None => {
                group_order.push(key);
                group_required.insert(key, required);
            }
        }
    }

    for key in group_order {
        let (semester, group) = key;
        let required = group_required.get(&key).copied().unwrap_or(0);
        let free = semester_free.get(semester).copied().unwrap_or(0);
        if required > free {
            report.ok = false;
            report.details.push(format!(
                "elective group {group} (sem={semester}) insufficient: required={required}, free={free}"
            ));
        } else {
            report.details.push(format!(
                "elective group {group} (sem={semester}) ok: required={required}, free={free}"
            ));
            semester_free.insert(semester, free - required);
        }
    }

    report
}
