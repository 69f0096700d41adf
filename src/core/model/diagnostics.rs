//! Pre-solve capacity diagnostics.
//!
//! Three quick checks run after candidate enumeration and before the model
//! is handed to the solver, plus a structural check rejecting lab subjects
//! with an odd period requirement (their 2-period blocks cannot sum to an
//! odd total). Diagnostics never mutate the model and never abort; they
//! surface as a structured report.

use super::context::{Assignment, Interner, Sym};
use crate::{error, info};
use serde::Serialize;
use std::collections::HashMap;

/// A `(section, subject)` whose candidate starts cannot carry the
/// required periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectCapacityIssue {
    /// Section identifier
    pub section: String,
    /// Subject identifier
    pub subject: String,
    /// Required periods
    pub required: u32,
    /// Sum of block lengths over candidate starts
    pub capacity: u64,
    /// Number of candidate starts
    pub candidates: usize,
}

/// A lab `(section, subject)` with more sessions required than candidate
/// start positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabSessionIssue {
    /// Section identifier
    pub section: String,
    /// Subject identifier
    pub subject: String,
    /// Required periods over the semester
    pub semester_periods: u32,
    /// Sessions needed (`ceil(required / 2)`)
    pub sessions_required: u32,
    /// Number of candidate starts
    pub candidates: usize,
}

/// A lab subject whose required periods are odd and thus unreachable by
/// 2-period blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OddLabRequirementIssue {
    /// Section identifier
    pub section: String,
    /// Subject identifier
    pub subject: String,
    /// Required periods
    pub required: u32,
}

/// A faculty whose gross demand exceeds the candidate capacity carrying
/// them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacultyLoadIssue {
    /// Faculty identifier
    pub faculty: String,
    /// Periods demanded across assigned sections
    pub required: u64,
    /// Sum of block lengths over candidate starts carrying this faculty
    pub capacity: u64,
}

/// Structured output of the pre-solve checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    /// Subject capacity shortfalls
    pub subject_issues: Vec<SubjectCapacityIssue>,
    /// Lab session shortfalls
    pub lab_issues: Vec<LabSessionIssue>,
    /// Odd lab period requirements
    pub odd_lab_issues: Vec<OddLabRequirementIssue>,
    /// Faculty demand/supply shortfalls
    pub faculty_issues: Vec<FacultyLoadIssue>,
}

impl DiagnosticsReport {
    /// Whether no check fired
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.subject_issues.is_empty()
            && self.lab_issues.is_empty()
            && self.odd_lab_issues.is_empty()
            && self.faculty_issues.is_empty()
    }
}

/// Run the feasibility diagnostics over the enumerated candidates
#[must_use]
pub fn run_feasibility_diagnostics(
    interner: &Interner,
    assignments: &[Assignment],
    pair_order: &[(Sym, Sym)],
    pair_starts: &HashMap<(Sym, Sym), Vec<usize>>,
    period_requirements: &HashMap<Sym, u32>,
) -> DiagnosticsReport {
    info!("running feasibility diagnostics before constraints");
    let mut report = DiagnosticsReport::default();

    // 1) Subject capacity: required periods vs candidate capacity
    for pair in pair_order {
        let (section, subject) = *pair;
        let starts = pair_starts.get(pair).map_or(&[][..], Vec::as_slice);
        let required = period_requirements.get(&subject).copied().unwrap_or(0);
        let capacity: u64 = starts
            .iter()
            .map(|&idx| u64::from(assignments[idx].length))
            .sum();
        if u64::from(required) > capacity {
            report.subject_issues.push(SubjectCapacityIssue {
                section: interner.resolve(section).to_string(),
                subject: interner.resolve(subject).to_string(),
                required,
                capacity,
                candidates: starts.len(),
            });
        }
    }

    // 2) Lab sessions: ceil(required / 2) vs candidate start positions,
    //    and odd requirements rejected outright
    for pair in pair_order {
        let (section, subject) = *pair;
        let starts = pair_starts.get(pair).map_or(&[][..], Vec::as_slice);
        let Some(&first) = starts.first() else {
            continue;
        };
        if assignments[first].length != 2 {
            continue;
        }
        let required = period_requirements.get(&subject).copied().unwrap_or(0);
        if required % 2 == 1 {
            report.odd_lab_issues.push(OddLabRequirementIssue {
                section: interner.resolve(section).to_string(),
                subject: interner.resolve(subject).to_string(),
                required,
            });
        }
        let sessions_required = required.div_ceil(2);
        if sessions_required as usize > starts.len() {
            report.lab_issues.push(LabSessionIssue {
                section: interner.resolve(section).to_string(),
                subject: interner.resolve(subject).to_string(),
                semester_periods: required,
                sessions_required,
                candidates: starts.len(),
            });
        }
    }

    // 3) Faculty gross demand vs candidate supply
    let mut demand_order: Vec<Sym> = Vec::new();
    let mut demand: HashMap<Sym, u64> = HashMap::new();
    for pair in pair_order {
        let (_, subject) = *pair;
        let starts = pair_starts.get(pair).map_or(&[][..], Vec::as_slice);
        let Some(&first) = starts.first() else {
            continue;
        };
        let faculty = assignments[first].faculty;
        let required = u64::from(period_requirements.get(&subject).copied().unwrap_or(0));
        if let Some(total) = demand.get_mut(&faculty) {
            *total += required;
        } else {
            demand_order.push(faculty);
            demand.insert(faculty, required);
        }
    }
    let mut supply: HashMap<Sym, u64> = HashMap::new();
    for assignment in assignments {
        *supply.entry(assignment.faculty).or_insert(0) += u64::from(assignment.length);
    }
    for faculty in demand_order {
        let required = demand.get(&faculty).copied().unwrap_or(0);
        let capacity = supply.get(&faculty).copied().unwrap_or(0);
        if required > capacity {
            report.faculty_issues.push(FacultyLoadIssue {
                faculty: interner.resolve(faculty).to_string(),
                required,
                capacity,
            });
        }
    }

    if report.is_clean() {
        info!("diagnostics: no immediate infeasibility detected");
    } else {
        error!(
            "diagnostics found potential feasibility problems: subjects={} labs={} odd_labs={} faculty={}",
            report.subject_issues.len(),
            report.lab_issues.len(),
            report.odd_lab_issues.len(),
            report.faculty_issues.len()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::context::{AssignKey, SlotKey};

    fn assignment(
        section: Sym,
        subject: Sym,
        faculty: Sym,
        length: u32,
        period: u32,
        var: usize,
    ) -> Assignment {
        Assignment {
            key: AssignKey {
                section,
                subject,
                slot: SlotKey {
                    week: 0,
                    day: 0,
                    period,
                },
            },
            faculty,
            length,
            var,
        }
    }

    #[test]
    fn flags_subject_with_insufficient_candidates() {
        let mut interner = Interner::new();
        let section = interner.intern("aiml-3-a");
        let subject = interner.intern("SUBJ001");
        let faculty = interner.intern("FAC001");

        let assignments = vec![
            assignment(section, subject, faculty, 1, 0, 0),
            assignment(section, subject, faculty, 1, 1, 1),
        ];
        let pair_order = vec![(section, subject)];
        let mut pair_starts = HashMap::new();
        pair_starts.insert((section, subject), vec![0, 1]);
        let mut requirements = HashMap::new();
        requirements.insert(subject, 5);

        let report = run_feasibility_diagnostics(
            &interner,
            &assignments,
            &pair_order,
            &pair_starts,
            &requirements,
        );
        assert_eq!(report.subject_issues.len(), 1);
        assert_eq!(report.subject_issues[0].required, 5);
        assert_eq!(report.subject_issues[0].capacity, 2);
    }

    #[test]
    fn flags_odd_lab_requirement() {
        let mut interner = Interner::new();
        let section = interner.intern("aiml-3-a");
        let subject = interner.intern("LAB001");
        let faculty = interner.intern("FAC001");

        let assignments = vec![
            assignment(section, subject, faculty, 2, 0, 0),
            assignment(section, subject, faculty, 2, 2, 1),
            assignment(section, subject, faculty, 2, 4, 2),
        ];
        let pair_order = vec![(section, subject)];
        let mut pair_starts = HashMap::new();
        pair_starts.insert((section, subject), vec![0, 1, 2]);
        let mut requirements = HashMap::new();
        requirements.insert(subject, 5);

        let report = run_feasibility_diagnostics(
            &interner,
            &assignments,
            &pair_order,
            &pair_starts,
            &requirements,
        );
        assert_eq!(report.odd_lab_issues.len(), 1);
        assert_eq!(report.odd_lab_issues[0].required, 5);
        // 3 sessions fit in 3 candidates, so no lab session issue
        assert!(report.lab_issues.is_empty());
    }

    #[test]
    fn flags_overloaded_faculty() {
        let mut interner = Interner::new();
        let section_a = interner.intern("aiml-3-a");
        let section_b = interner.intern("aiml-3-b");
        let subject = interner.intern("SUBJ001");
        let faculty = interner.intern("FAC001");

        // One candidate slot per section but 2 periods demanded per section
        let assignments = vec![
            assignment(section_a, subject, faculty, 1, 0, 0),
            assignment(section_b, subject, faculty, 1, 0, 1),
        ];
        let pair_order = vec![(section_a, subject), (section_b, subject)];
        let mut pair_starts = HashMap::new();
        pair_starts.insert((section_a, subject), vec![0]);
        pair_starts.insert((section_b, subject), vec![1]);
        let mut requirements = HashMap::new();
        requirements.insert(subject, 2);

        let report = run_feasibility_diagnostics(
            &interner,
            &assignments,
            &pair_order,
            &pair_starts,
            &requirements,
        );
        assert_eq!(report.faculty_issues.len(), 1);
        assert_eq!(report.faculty_issues[0].required, 4);
        assert_eq!(report.faculty_issues[0].capacity, 2);
    }

    #[test]
    fn clean_report_when_capacity_suffices() {
        let mut interner = Interner::new();
        let section = interner.intern("aiml-3-a");
        let subject = interner.intern("SUBJ001");
        let faculty = interner.intern("FAC001");

        let assignments: Vec<Assignment> = (0..8)
            .map(|p| assignment(section, subject, faculty, 1, p, p as usize))
            .collect();
        let pair_order = vec![(section, subject)];
        let mut pair_starts = HashMap::new();
        pair_starts.insert((section, subject), (0..8).collect());
        let mut requirements = HashMap::new();
        requirements.insert(subject, 3);

        let report = run_feasibility_diagnostics(
            &interner,
            &assignments,
            &pair_order,
            &pair_starts,
            &requirements,
        );
        assert!(report.is_clean());
    }
}
