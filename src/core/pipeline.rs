//! Run orchestration: loader → calendar → normalization → room mapping →
//! eligibility → workload balancing → model build → diagnostics → solve →
//! outputs.
//!
//! Solver status is data, never an error: INFEASIBLE and UNKNOWN runs
//! write a diagnostics file and return normally. Only structural input
//! failures abort.

use crate::core::calendar::AcademicCalendar;
use crate::core::eligibility::{build_faculty_subject_map, invert_faculty_subject_map};
use crate::core::error::Error;
use crate::core::loader::{load_inputs, Inputs};
use crate::core::model::{build_model, DiagnosticsReport, TimetableModel};
use crate::core::models::Subject;
use crate::core::normalize::{
    build_period_requirements, generate_virtual_sections, normalize_sections,
    validate_section_capacity, ValidationReport,
};
use crate::core::outputs::{expand_assignments, write_outputs};
use crate::core::rooms::map_sections_to_classrooms;
use crate::core::solve::{BranchAndBound, SolveStatus, SolverBackend, SolverParams};
use crate::core::workload::{assign_faculty_to_sections, compute_faculty_workloads};
use crate::{error, info, warn};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Options of one pipeline run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Solver and model parameters
    pub params: SolverParams,
    /// Length of one teaching period in hours, for the hours → periods
    /// conversion
    pub period_length_hours: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            params: SolverParams::default(),
            period_length_hours: 0.75,
        }
    }
}

/// Summary of a completed run, also written to `summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Solver termination status
    pub status: SolveStatus,
    /// Objective value (soft violations), when a solution was found
    pub objective: Option<i64>,
    /// Violated soft constraints in the chosen solution
    pub violations: i64,
    /// Number of chosen assignment keys
    pub assigned_count: usize,
    /// Model variable count
    pub var_count: usize,
    /// Model constraint count
    pub constraint_count: usize,
    /// Working days of the semester calendar
    pub working_days: u32,
    /// Weeks modeled
    pub weeks: u32,
    /// Whether the pre-solve diagnostics were clean
    pub diagnostics_clean: bool,
    /// Warnings accumulated during the build
    pub warnings: Vec<String>,
}

/// Result of the solver-free feasibility check
#[derive(Debug)]
pub struct CheckReport {
    /// Calendar-fit validation of sections and elective groups
    pub validation: ValidationReport,
    /// Pre-solve capacity diagnostics
    pub diagnostics: DiagnosticsReport,
    /// Model variable count
    pub var_count: usize,
    /// Model constraint count
    pub constraint_count: usize,
    /// Warnings accumulated during the build
    pub warnings: Vec<String>,
}

struct Prepared {
    model: TimetableModel,
    calendar: AcademicCalendar,
    validation: ValidationReport,
    weeks: u32,
}

fn all_semester_subjects(inputs: &Inputs) -> Vec<Subject> {
    let mut subjects = Vec::new();
    for entry in inputs.semester_subjects.values() {
        subjects.extend(entry.subjects.iter().cloned());
        for group in entry.electives.values() {
            subjects.extend(group.subjects.iter().cloned());
        }
    }
    subjects
}

fn prepare(inputs: &Inputs, options: &RunOptions) -> Result<Prepared, Error> {
    let params = &options.params;

    let Some(first_section) = inputs.sections.first() else {
        return Err(Error::NoSections);
    };
    let semester = first_section.semester.clone();
    info!("using semester '{semester}' for the calendar window");
    let window = inputs
        .semester_windows
        .iter()
        .find(|w| w.id == semester)
        .ok_or_else(|| Error::MissingSemesterWindow(semester.clone()))?;

    let calendar = AcademicCalendar::compute(
        window,
        &inputs.holidays,
        &inputs.exam_ranges,
        params.days_per_week,
        params.periods_per_day,
    );
    info!(
        "semester {semester}: {} working days, {} available periods",
        calendar.working_days(),
        calendar.total_periods()
    );
    let weeks = calendar.weeks_or_default(params.default_weeks);

    let mut virtual_sections =
        generate_virtual_sections(&inputs.sections, &inputs.elective_enrollments);
    let room_map = map_sections_to_classrooms(
        &inputs.sections,
        &mut virtual_sections,
        &inputs.classrooms,
    );

    let mut normalized =
        normalize_sections(&inputs.sections, &inputs.semester_subjects, &room_map);
    normalized.extend(virtual_sections);
    info!("normalized sections (incl. virtual electives): {}", normalized.len());

    let period_requirements =
        build_period_requirements(&inputs.semester_subjects, options.period_length_hours);

    let validation = validate_section_capacity(&normalized, &period_requirements, &calendar);
    for line in &validation.details {
        if validation.ok {
            info!("{line}");
        } else {
            warn!("{line}");
        }
    }

    let subjects = all_semester_subjects(inputs);
    let faculty_subject_map = build_faculty_subject_map(&inputs.faculty, &subjects);
    let subject_faculty_map = invert_faculty_subject_map(&inputs.faculty, &faculty_subject_map);

    let faculty_ids: Vec<String> = inputs.faculty.iter().map(|f| f.id.clone()).collect();
    let mut workloads = compute_faculty_workloads(
        &faculty_ids,
        &faculty_subject_map,
        &period_requirements,
        &normalized,
        calendar.total_periods(),
    );
    let skipped = assign_faculty_to_sections(
        &mut normalized,
        &subject_faculty_map,
        &period_requirements,
        &mut workloads,
    );
    if !skipped.is_empty() {
        warn!("{} (section, subject) pairs have no faculty", skipped.len());
    }

    let model = build_model(&normalized, &period_requirements, &room_map, weeks, params);

    Ok(Prepared {
        model,
        calendar,
        validation,
        weeks,
    })
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), Error> {
    let body = serde_json::to_string_pretty(value).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Run the whole pipeline and write outputs into `output_dir`.
///
/// On FEASIBLE/OPTIMAL the grouped timetable views and `summary.json` are
/// written; on INFEASIBLE/UNKNOWN a `diagnostics.json` is written instead.
pub fn generate(
    input_dir: &Path,
    output_dir: &Path,
    options: &RunOptions,
) -> Result<RunSummary, Error> {
    info!("starting timetable generation pipeline");
    let inputs = load_inputs(input_dir)?;
    let prepared = prepare(&inputs, options)?;
    let model = &prepared.model;

    info!(
        "solving (limit={}s, workers={})",
        options.params.time_limit_seconds, options.params.num_workers
    );
    let result = BranchAndBound.solve(&model.cp, &options.params);
    info!("solver finished with status: {}", result.status.as_str());

    fs::create_dir_all(output_dir).map_err(|source| Error::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let chosen = if result.status.has_solution() {
        model.chosen_assignments(&result)
    } else {
        Vec::new()
    };

    let summary = RunSummary {
        status: result.status,
        objective: result.objective,
        violations: result.objective.unwrap_or(0),
        assigned_count: chosen.len(),
        var_count: model.cp.var_count(),
        constraint_count: model.cp.constraint_count(),
        working_days: prepared.calendar.working_days(),
        weeks: prepared.weeks,
        diagnostics_clean: model.diagnostics.is_clean(),
        warnings: model.warnings.clone(),
    };

    if result.status.has_solution() {
        info!("assigned timetable start-keys: {}", chosen.len());
        let expanded = expand_assignments(model, &chosen, &prepared.calendar.working_dates);
        write_outputs(&expanded, &output_dir.join("timetable"))?;
        write_json(&summary, &output_dir.join("summary.json"))?;
    } else {
        error!(
            "solver returned {}; writing diagnostics instead of a timetable",
            result.status.as_str()
        );
        #[derive(Serialize)]
        struct FailureDiagnostics<'a> {
            status: SolveStatus,
            diagnostics: &'a DiagnosticsReport,
            validation_ok: bool,
            note: &'static str,
        }
        write_json(
            &FailureDiagnostics {
                status: result.status,
                diagnostics: &model.diagnostics,
                validation_ok: prepared.validation.ok,
                note: "check subject coverage and lab capacity, or relax soft constraints",
            },
            &output_dir.join("diagnostics.json"),
        )?;
    }

    Ok(summary)
}

/// Run everything up to and including the pre-solve diagnostics, without
/// invoking the solver
pub fn check(input_dir: &Path, options: &RunOptions) -> Result<CheckReport, Error> {
    let inputs = load_inputs(input_dir)?;
    let prepared = prepare(&inputs, options)?;
    Ok(CheckReport {
        validation: prepared.validation,
        diagnostics: prepared.model.diagnostics.clone(),
        var_count: prepared.model.cp.var_count(),
        constraint_count: prepared.model.cp.constraint_count(),
        warnings: prepared.model.warnings.clone(),
    })
}
