//! Faculty workload metrics and the tank-filling assignment pass.
//!
//! Each faculty has a fixed "tank": the periods they could teach if handed
//! every section of every subject they are eligible for. Assignment walks
//! sections in order and feeds the smallest tanks first, skipping anyone
//! already at 50% actual utilization so load spreads before anyone tops up.

use crate::core::models::NormalizedSection;
use crate::{info, warn};
use std::collections::HashMap;

/// Workload state for one faculty member.
///
/// `max_possible_periods` is captured once and frozen;
/// `actual_allocated_periods` is the only field assignment mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacultyWorkload {
    /// Faculty identifier
    pub faculty_id: String,

    /// Schedulable periods in the semester
    pub periods_available: u32,

    /// Periods this faculty would teach if assigned everything they are
    /// eligible for (computed once, never updated)
    pub max_possible_periods: u32,

    /// Periods assigned so far; monotonically increasing
    pub actual_allocated_periods: u32,
}

impl FacultyWorkload {
    /// Periods not yet allocated
    #[must_use]
    pub const fn free_periods(&self) -> u32 {
        self.periods_available.saturating_sub(self.actual_allocated_periods)
    }

    /// Tank size as a percentage of available periods
    #[must_use]
    pub fn max_possible_utilization(&self) -> f64 {
        if self.periods_available == 0 {
            0.0
        } else {
            100.0 * f64::from(self.max_possible_periods) / f64::from(self.periods_available)
        }
    }

    /// Allocated load as a percentage of available periods
    #[must_use]
    pub fn actual_utilization(&self) -> f64 {
        if self.periods_available == 0 {
            0.0
        } else {
            100.0 * f64::from(self.actual_allocated_periods) / f64::from(self.periods_available)
        }
    }
}

/// Faculty at or above this actual utilization are passed over while any
/// emptier colleague remains eligible
const UTILIZATION_CUTOFF: f64 = 50.0;

/// Compute pre-assignment workload metrics for every faculty member.
///
/// The tank of faculty `f` sums, over each subject `f` is eligible for,
/// the per-section requirement times the number of sections teaching it
/// (virtual sections included).
#[must_use]
pub fn compute_faculty_workloads(
    faculty_order: &[String],
    faculty_subject_map: &HashMap<String, Vec<String>>,
    period_requirements: &HashMap<String, u32>,
    sections: &[NormalizedSection],
    total_periods: u32,
) -> Vec<FacultyWorkload> {
    let mut section_counts: HashMap<&str, u32> = HashMap::new();
    for section in sections {
        for subject in &section.subjects {
            *section_counts.entry(subject.id.as_str()).or_insert(0) += 1;
        }
    }

    faculty_order
        .iter()
        .map(|faculty_id| {
            let max_possible_periods = faculty_subject_map
                .get(faculty_id)
                .map(|subjects| {
                    subjects
                        .iter()
                        .map(|subject_id| {
                            let per_section =
                                period_requirements.get(subject_id).copied().unwrap_or(0);
                            let sections_teaching =
                                section_counts.get(subject_id.as_str()).copied().unwrap_or(0);
                            per_section * sections_teaching
                        })
                        .sum()
                })
                .unwrap_or(0);

            FacultyWorkload {
                faculty_id: faculty_id.clone(),
                periods_available: total_periods,
                max_possible_periods,
                actual_allocated_periods: 0,
            }
        })
        .collect()
}

/// Assign exactly one faculty to every `(section, subject)` pair.
///
/// For each pair, eligible faculty are sorted ascending by tank size
/// (stable, so ties keep input order); the first under the utilization
/// cutoff wins, with the smallest tank as fallback when everyone is over.
/// Pairs with no eligible faculty are skipped with a warning and returned.
pub fn assign_faculty_to_sections(
    sections: &mut [NormalizedSection],
    subject_faculty_map: &HashMap<String, Vec<String>>,
    period_requirements: &HashMap<String, u32>,
    workloads: &mut [FacultyWorkload],
) -> Vec<(String, String)> {
    let index: HashMap<String, usize> = workloads
        .iter()
        .enumerate()
        .map(|(i, w)| (w.faculty_id.clone(), i))
        .collect();

    let mut skipped = Vec::new();

    for section in sections.iter_mut() {
        for subject in &mut section.subjects {
            let periods = period_requirements.get(&subject.id).copied().unwrap_or(0);
            let Some(eligible) = subject_faculty_map.get(&subject.id) else {
                warn!(
                    "no eligible faculty for subject '{}' in section '{}'",
                    subject.id, section.id
                );
                skipped.push((section.id.clone(), subject.id.clone()));
                continue;
            };
            let mut candidates: Vec<usize> =
                eligible.iter().filter_map(|id| index.get(id).copied()).collect();
            if candidates.is_empty() {
                warn!(
                    "no eligible faculty for subject '{}' in section '{}'",
                    subject.id, section.id
                );
                skipped.push((section.id.clone(), subject.id.clone()));
                continue;
            }

            // Smallest tanks first; stable sort keeps input order on ties
            candidates.sort_by(|&a, &b| {
                workloads[a]
                    .max_possible_utilization()
                    .total_cmp(&workloads[b].max_possible_utilization())
            });

            let chosen = candidates
                .iter()
                .copied()
                .find(|&i| workloads[i].actual_utilization() < UTILIZATION_CUTOFF)
                .unwrap_or(candidates[0]);

            let workload = &mut workloads[chosen];
            workload.actual_allocated_periods += periods;
            subject.assigned_faculty_id = Some(workload.faculty_id.clone());

            info!(
                "assigned subject '{}' (periods={periods}) in section '{}' -> faculty '{}' (util={:.2}%)",
                subject.id,
                section.id,
                workload.faculty_id,
                workload.actual_utilization()
            );
        }
    }

    skipped
}
