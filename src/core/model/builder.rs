//! The model build pass.
//!
//! Materializes assignment variables, occupancy variables, elective
//! masters, hard constraints, soft penalty constraints, and the objective
//! from the normalized planning view. Everything is created in a fixed
//! order — sections as normalized, subjects as listed per section, then
//! `(week, day, period)` lexicographic — so identical inputs always yield
//! structurally identical models.

use super::context::{AssignKey, Assignment, ElectiveMaster, Interner, SlotKey, Sym};
use super::diagnostics::{run_feasibility_diagnostics, DiagnosticsReport};
use crate::core::models::NormalizedSection;
use crate::core::solve::{Cmp, CpModel, Lit, SolveResult, SolverParams, VarId};
use crate::{info, warn};
use std::collections::{HashMap, HashSet};

/// The built constraint model plus everything needed to interpret a
/// solution: assignment metadata, occupancy handles, elective masters,
/// diagnostics, and accumulated warnings.
#[derive(Debug)]
pub struct TimetableModel {
    /// The solver-facing model
    pub cp: CpModel,
    /// Identifier interner shared by all keys
    pub interner: Interner,
    /// Weeks modeled
    pub weeks: u32,
    /// Days per week
    pub days_per_week: u32,
    /// Periods per day
    pub periods_per_day: u32,
    /// Global simultaneous lab-block ceiling
    pub lab_room_capacity: u32,
    /// Assignment decisions in creation order
    pub assignments: Vec<Assignment>,
    /// Key → index into `assignments`
    pub assignment_index: HashMap<AssignKey, usize>,
    /// `(section, subject)` pairs in creation order
    pub pair_order: Vec<(Sym, Sym)>,
    /// Pair → candidate start indices into `assignments`
    pub pair_starts: HashMap<(Sym, Sym), Vec<usize>>,
    /// Section occupancy variable per slot
    pub section_occupancy: HashMap<(Sym, SlotKey), VarId>,
    /// Faculty occupancy variable per slot
    pub faculty_occupancy: HashMap<(Sym, SlotKey), VarId>,
    /// Room occupancy variable per slot
    pub room_occupancy: HashMap<(Sym, SlotKey), VarId>,
    /// Elective master booleans in creation order
    pub masters: Vec<ElectiveMaster>,
    /// Violation booleans feeding the objective
    pub penalties: Vec<VarId>,
    /// Section → mapped room
    pub section_rooms: HashMap<Sym, Sym>,
    /// Subject → required periods per section
    pub period_requirements: HashMap<Sym, u32>,
    /// Sections synthesized from elective enrollments
    pub virtual_sections: HashSet<Sym>,
    /// Non-fatal problems encountered during the build
    pub warnings: Vec<String>,
    /// Pre-solve capacity report
    pub diagnostics: DiagnosticsReport,
}

impl TimetableModel {
    /// Indices of the assignments chosen in a solution, in creation order
    #[must_use]
    pub fn chosen_assignments(&self, result: &SolveResult) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, assignment)| result.value(assignment.var))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Whether a section symbol names a virtual elective section
    #[must_use]
    pub fn is_virtual_section(&self, section: Sym) -> bool {
        self.virtual_sections.contains(&section)
    }
}

fn slots(weeks: u32, days: u32, periods: u32) -> impl Iterator<Item = SlotKey> {
    (0..weeks).flat_map(move |week| {
        (0..days).flat_map(move |day| {
            (0..periods).map(move |period| SlotKey { week, day, period })
        })
    })
}

struct OptionIndex {
    subject: Sym,
    virtuals: Vec<Sym>,
}

struct GroupIndex {
    semester: Sym,
    group: Sym,
    options: Vec<OptionIndex>,
}

struct Builder<'a> {
    sections: &'a [NormalizedSection],
    weeks: u32,
    days: u32,
    periods: u32,
    lab_room_capacity: u32,

    cp: CpModel,
    interner: Interner,

    section_syms: Vec<Sym>,
    section_semesters: Vec<Sym>,
    virtual_sections: HashSet<Sym>,
    section_rooms: HashMap<Sym, Sym>,
    period_requirements: HashMap<Sym, u32>,
    subject_lengths: HashMap<Sym, u32>,
    faculty_order: Vec<Sym>,
    room_order: Vec<Sym>,

    section_occupancy: HashMap<(Sym, SlotKey), VarId>,
    faculty_occupancy: HashMap<(Sym, SlotKey), VarId>,
    room_occupancy: HashMap<(Sym, SlotKey), VarId>,

    assignments: Vec<Assignment>,
    assignment_index: HashMap<AssignKey, usize>,
    pair_order: Vec<(Sym, Sym)>,
    pair_starts: HashMap<(Sym, Sym), Vec<usize>>,

    section_cover: HashMap<(Sym, SlotKey), Vec<VarId>>,
    faculty_cover: HashMap<(Sym, SlotKey), Vec<VarId>>,
    room_cover: HashMap<(Sym, SlotKey), Vec<VarId>>,
    lab_cover: HashMap<SlotKey, Vec<VarId>>,
    theory_by_faculty_day: HashMap<(Sym, u32, u32), Vec<(u32, VarId)>>,

    groups: Vec<GroupIndex>,
    masters: Vec<ElectiveMaster>,
    masters_by_option: Vec<Vec<Vec<VarId>>>,

    penalties: Vec<VarId>,
    warnings: Vec<String>,
}

/// Build the constraint model from the normalized planning view.
///
/// `period_requirements` maps subject identifiers to per-section required
/// periods; `room_map` maps section identifiers to their classroom. Pairs
/// without an assigned faculty are skipped with a warning, never an error.
#[must_use]
pub fn build_model(
    sections: &[NormalizedSection],
    period_requirements: &HashMap<String, u32>,
    room_map: &HashMap<String, String>,
    weeks: u32,
    params: &SolverParams,
) -> TimetableModel {
    info!(
        "starting model build: weeks={weeks} days/week={} periods/day={}",
        params.days_per_week, params.periods_per_day
    );

    let mut builder = Builder {
        sections,
        weeks,
        days: params.days_per_week,
        periods: params.periods_per_day,
        lab_room_capacity: params.lab_room_capacity,
        cp: CpModel::new(),
        interner: Interner::new(),
        section_syms: Vec::new(),
        section_semesters: Vec::new(),
        virtual_sections: HashSet::new(),
        section_rooms: HashMap::new(),
        period_requirements: HashMap::new(),
        subject_lengths: HashMap::new(),
        faculty_order: Vec::new(),
        room_order: Vec::new(),
        section_occupancy: HashMap::new(),
        faculty_occupancy: HashMap::new(),
        room_occupancy: HashMap::new(),
        assignments: Vec::new(),
        assignment_index: HashMap::new(),
        pair_order: Vec::new(),
        pair_starts: HashMap::new(),
        section_cover: HashMap::new(),
        faculty_cover: HashMap::new(),
        room_cover: HashMap::new(),
        lab_cover: HashMap::new(),
        theory_by_faculty_day: HashMap::new(),
        groups: Vec::new(),
        masters: Vec::new(),
        masters_by_option: Vec::new(),
        penalties: Vec::new(),
        warnings: Vec::new(),
    };

    builder.intern_metadata(period_requirements, room_map);
    builder.create_occupancy_vars();
    builder.create_assignment_vars();

    let diagnostics = run_feasibility_diagnostics(
        &builder.interner,
        &builder.assignments,
        &builder.pair_order,
        &builder.pair_starts,
        &builder.period_requirements,
    );

    builder.build_elective_masters();
    builder.add_group_exclusivity();
    builder.add_section_occupancy_constraints();
    builder.add_faculty_occupancy_constraints();
    builder.add_room_occupancy_constraints();
    builder.add_subject_totals();
    builder.add_elective_totals();
    builder.add_lab_capacity();
    builder.add_theory_spread_penalties();
    builder.add_consecutive_theory_penalties();

    let penalties = builder.penalties.clone();
    if penalties.is_empty() {
        info!("no soft penalties defined; model is pure feasibility");
    } else {
        info!("minimizing {} soft-violation booleans", penalties.len());
    }
    builder.cp.minimize(penalties.clone());

    info!(
        "model build complete: vars={} constraints={} penalties={}",
        builder.cp.var_count(),
        builder.cp.constraint_count(),
        penalties.len()
    );

    TimetableModel {
        cp: builder.cp,
        interner: builder.interner,
        weeks,
        days_per_week: params.days_per_week,
        periods_per_day: params.periods_per_day,
        lab_room_capacity: params.lab_room_capacity,
        assignments: builder.assignments,
        assignment_index: builder.assignment_index,
        pair_order: builder.pair_order,
        pair_starts: builder.pair_starts,
        section_occupancy: builder.section_occupancy,
        faculty_occupancy: builder.faculty_occupancy,
        room_occupancy: builder.room_occupancy,
        masters: builder.masters,
        penalties,
        section_rooms: builder.section_rooms,
        period_requirements: builder.period_requirements,
        virtual_sections: builder.virtual_sections,
        warnings: builder.warnings,
        diagnostics,
    }
}

impl Builder<'_> {
    fn slots(&self) -> impl Iterator<Item = SlotKey> {
        slots(self.weeks, self.days, self.periods)
    }

    fn intern_metadata(
        &mut self,
        period_requirements: &HashMap<String, u32>,
        room_map: &HashMap<String, String>,
    ) {
        let mut seen_faculty = HashSet::new();
        for section in self.sections {
            let section_sym = self.interner.intern(&section.id);
            let semester_sym = self.interner.intern(&section.semester);
            self.section_syms.push(section_sym);
            self.section_semesters.push(semester_sym);
            if section.is_virtual {
                self.virtual_sections.insert(section_sym);
            }
            if let Some(room) = room_map.get(&section.id) {
                let room_sym = self.interner.intern(room);
                self.section_rooms.insert(section_sym, room_sym);
                if !self.room_order.contains(&room_sym) {
                    self.room_order.push(room_sym);
                }
            }
            for subject in &section.subjects {
                let subject_sym = self.interner.intern(&subject.id);
                self.subject_lengths
                    .insert(subject_sym, subject.block_length());
                self.period_requirements.insert(
                    subject_sym,
                    period_requirements.get(&subject.id).copied().unwrap_or(0),
                );
                if let Some(faculty) = &subject.assigned_faculty_id {
                    let faculty_sym = self.interner.intern(faculty);
                    if seen_faculty.insert(faculty_sym) {
                        self.faculty_order.push(faculty_sym);
                    }
                }
            }
        }
    }

    fn create_occupancy_vars(&mut self) {
        for (idx, section) in self.sections.iter().enumerate() {
            let section_sym = self.section_syms[idx];
            for slot in self.slots() {
                let var = self.cp.new_bool(format!(
                    "occ_sec_{}_w{}_d{}_p{}",
                    section.id, slot.week, slot.day, slot.period
                ));
                self.section_occupancy.insert((section_sym, slot), var);
            }
        }
        for faculty_idx in 0..self.faculty_order.len() {
            let faculty = self.faculty_order[faculty_idx];
            let name = self.interner.resolve(faculty).to_string();
            for slot in self.slots() {
                let var = self.cp.new_bool(format!(
                    "occ_fac_{name}_w{}_d{}_p{}",
                    slot.week, slot.day, slot.period
                ));
                self.faculty_occupancy.insert((faculty, slot), var);
            }
        }
        for room_idx in 0..self.room_order.len() {
            let room = self.room_order[room_idx];
            let name = self.interner.resolve(room).to_string();
            for slot in self.slots() {
                let var = self.cp.new_bool(format!(
                    "occ_room_{name}_w{}_d{}_p{}",
                    slot.week, slot.day, slot.period
                ));
                self.room_occupancy.insert((room, slot), var);
            }
        }
        info!(
            "occupancy vars created: sections={} faculty={} rooms={}",
            self.section_occupancy.len(),
            self.faculty_occupancy.len(),
            self.room_occupancy.len()
        );
    }

    fn create_assignment_vars(&mut self) {
        let mut labs = 0usize;
        let mut theory = 0usize;

        for (idx, section) in self.sections.iter().enumerate() {
            let section_sym = self.section_syms[idx];
            let room = self.section_rooms.get(&section_sym).copied();
            for subject in &section.subjects {
                let Some(faculty_id) = &subject.assigned_faculty_id else {
                    warn!(
                        "section '{}' subject '{}' has no assigned faculty; skipping",
                        section.id, subject.id
                    );
                    self.warnings.push(format!(
                        "section '{}' subject '{}' has no assigned faculty; skipping",
                        section.id, subject.id
                    ));
                    continue;
                };
                let subject_sym = self.interner.intern(&subject.id);
                let faculty_sym = self.interner.intern(faculty_id);
                let length = subject.block_length();
                let tag = if subject.is_lab { "lab" } else { "theory" };

                // Zero-requirement subjects contribute no variables
                if self
                    .period_requirements
                    .get(&subject_sym)
                    .copied()
                    .unwrap_or(0)
                    == 0
                {
                    continue;
                }

                self.pair_order.push((section_sym, subject_sym));
                if self.periods < length {
                    continue;
                }
                // Only starts where the whole block fits
                for week in 0..self.weeks {
                    for day in 0..self.days {
                        for period in 0..=(self.periods - length) {
                            let slot = SlotKey { week, day, period };
                            let var = self.cp.new_bool(format!(
                                "assign_{tag}_{}_{}_w{week}_d{day}_p{period}",
                                section.id, subject.id
                            ));
                            self.cp.hint_decision(var);

                            let key = AssignKey {
                                section: section_sym,
                                subject: subject_sym,
                                slot,
                            };
                            let assignment = Assignment {
                                key,
                                faculty: faculty_sym,
                                length,
                                var,
                            };
                            let assignment_idx = self.assignments.len();
                            self.assignments.push(assignment);
                            self.assignment_index.insert(key, assignment_idx);
                            self.pair_starts
                                .entry((section_sym, subject_sym))
                                .or_default()
                                .push(assignment_idx);

                            for covered in assignment.cover() {
                                self.section_cover
                                    .entry((section_sym, covered))
                                    .or_default()
                                    .push(var);
                                self.faculty_cover
                                    .entry((faculty_sym, covered))
                                    .or_default()
                                    .push(var);
                                if let Some(room_sym) = room {
                                    self.room_cover
                                        .entry((room_sym, covered))
                                        .or_default()
                                        .push(var);
                                }
                                if length == 2 {
                                    self.lab_cover.entry(covered).or_default().push(var);
                                }
                            }
                            if length == 1 {
                                self.theory_by_faculty_day
                                    .entry((faculty_sym, week, day))
                                    .or_default()
                                    .push((period, var));
                            }

                            if length == 2 {
                                labs += 1;
                            } else {
                                theory += 1;
                            }
                        }
                    }
                }
            }
        }
        info!(
            "created {} start-vars (lab starts={labs} theory starts={theory})",
            self.assignments.len()
        );
    }

    /// One master boolean per elective option per slot; all virtual copies
    /// of the option are equated to it, and an active master blocks every
    /// non-virtual section of the semester at that slot.
    fn build_elective_masters(&mut self) {
        // (semester, group) -> option subjects -> virtual section syms
        let mut group_index: HashMap<(Sym, Sym), usize> = HashMap::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if !section.is_virtual {
                continue;
            }
            let Some(group_label) = &section.elective_group else {
                continue;
            };
            let section_sym = self.section_syms[idx];
            let semester_sym = self.section_semesters[idx];
            let group_sym = self.interner.intern(group_label);
            let group_idx = *group_index
                .entry((semester_sym, group_sym))
                .or_insert_with(|| {
                    self.groups.push(GroupIndex {
                        semester: semester_sym,
                        group: group_sym,
                        options: Vec::new(),
                    });
                    self.groups.len() - 1
                });
            for subject in &section.subjects {
                let subject_sym = self.interner.intern(&subject.id);
                let group = &mut self.groups[group_idx];
                match group
                    .options
                    .iter_mut()
                    .find(|option| option.subject == subject_sym)
                {
                    Some(option) => option.virtuals.push(section_sym),
                    None => group.options.push(OptionIndex {
                        subject: subject_sym,
                        virtuals: vec![section_sym],
                    }),
                }
            }
        }

        // Non-virtual (section, subject) pairs per semester, for blocking
        let mut semester_regular: HashMap<Sym, Vec<(Sym, Sym)>> = HashMap::new();
        for (idx, section) in self.sections.iter().enumerate() {
            if section.is_virtual {
                continue;
            }
            let section_sym = self.section_syms[idx];
            let semester_sym = self.section_semesters[idx];
            for subject in &section.subjects {
                if let Some(subject_sym) = self.interner.get(&subject.id) {
                    semester_regular
                        .entry(semester_sym)
                        .or_default()
                        .push((section_sym, subject_sym));
                }
            }
        }

        for group_idx in 0..self.groups.len() {
            let semester = self.groups[group_idx].semester;
            let group = self.groups[group_idx].group;
            info!(
                "elective group: semester={} group={} options={}",
                self.interner.resolve(semester),
                self.interner.resolve(group),
                self.groups[group_idx].options.len()
            );
            let mut option_columns = Vec::new();
            for option_idx in 0..self.groups[group_idx].options.len() {
                let subject = self.groups[group_idx].options[option_idx].subject;
                let virtuals = self.groups[group_idx].options[option_idx].virtuals.clone();
                let semester_name = self.interner.resolve(semester).to_string();
                let group_name = self.interner.resolve(group).to_string();
                let subject_name = self.interner.resolve(subject).to_string();

                let mut column = Vec::new();
                for slot in slots(self.weeks, self.days, self.periods) {
                    let master = self.cp.new_bool(format!(
                        "elective_master_{semester_name}_{group_name}_{subject_name}_w{}_d{}_p{}",
                        slot.week, slot.day, slot.period
                    ));
                    self.cp.hint_decision(master);
                    self.masters.push(ElectiveMaster {
                        semester,
                        group,
                        subject,
                        slot,
                        var: master,
                    });
                    column.push(master);

                    // All virtual copies rise and fall with the master
                    for &virtual_sym in &virtuals {
                        let key = AssignKey {
                            section: virtual_sym,
                            subject,
                            slot,
                        };
                        if let Some(&assignment_idx) = self.assignment_index.get(&key) {
                            let assign_var = self.assignments[assignment_idx].var;
                            self.cp
                                .add(vec![(1, assign_var), (-1, master)], Cmp::Eq, 0);
                        }
                    }

                    // A running elective blocks the whole cohort
                    let regular = semester_regular
                        .get(&semester)
                        .map_or(&[][..], Vec::as_slice);
                    for &(regular_section, regular_subject) in regular {
                        let key = AssignKey {
                            section: regular_section,
                            subject: regular_subject,
                            slot,
                        };
                        if let Some(&assignment_idx) = self.assignment_index.get(&key) {
                            let assign_var = self.assignments[assignment_idx].var;
                            self.cp
                                .add(vec![(1, assign_var), (1, master)], Cmp::Le, 1);
                        }
                    }
                }
                option_columns.push(column);
            }
            self.masters_by_option.push(option_columns);
        }
    }

    /// At most one option of a group runs in any given slot
    fn add_group_exclusivity(&mut self) {
        for group_idx in 0..self.groups.len() {
            let columns = &self.masters_by_option[group_idx];
            if columns.is_empty() {
                continue;
            }
            let slot_count = columns[0].len();
            for slot_idx in 0..slot_count {
                let terms: Vec<(i64, VarId)> = columns
                    .iter()
                    .map(|column| (1, column[slot_idx]))
                    .collect();
                self.cp.add(terms, Cmp::Le, 1);
            }
        }
    }

    fn reify_occupancy(
        cp: &mut CpModel,
        occupancy: VarId,
        covering: Option<&Vec<VarId>>,
    ) {
        match covering {
            Some(vars) if !vars.is_empty() => {
                let sum: Vec<(i64, VarId)> = vars.iter().map(|&v| (1, v)).collect();
                // No double-booking of the resource at this slot
                cp.add(sum.clone(), Cmp::Le, 1);
                // Any covering assignment forces the occupancy on
                let mut ge_terms = sum.clone();
                ge_terms.push((-1, occupancy));
                cp.add(ge_terms, Cmp::Ge, 0);
                // Occupancy off forces every covering assignment off
                let mut le_terms = sum;
                le_terms.push((-(vars.len() as i64), occupancy));
                cp.add(le_terms, Cmp::Le, 0);
            }
            _ => cp.fix(occupancy, false),
        }
    }

    fn add_section_occupancy_constraints(&mut self) {
        info!("adding section occupancy constraints");
        for idx in 0..self.sections.len() {
            let section_sym = self.section_syms[idx];
            for slot in slots(self.weeks, self.days, self.periods) {
                if let Some(&occupancy) = self.section_occupancy.get(&(section_sym, slot)) {
                    Self::reify_occupancy(
                        &mut self.cp,
                        occupancy,
                        self.section_cover.get(&(section_sym, slot)),
                    );
                }
            }
        }
    }

    fn add_faculty_occupancy_constraints(&mut self) {
        info!("adding faculty no-double-booking constraints");
        for faculty_idx in 0..self.faculty_order.len() {
            let faculty = self.faculty_order[faculty_idx];
            for slot in slots(self.weeks, self.days, self.periods) {
                if let Some(&occupancy) = self.faculty_occupancy.get(&(faculty, slot)) {
                    Self::reify_occupancy(
                        &mut self.cp,
                        occupancy,
                        self.faculty_cover.get(&(faculty, slot)),
                    );
                }
            }
        }
    }

    fn add_room_occupancy_constraints(&mut self) {
        info!("adding room occupancy constraints");
        for room_idx in 0..self.room_order.len() {
            let room = self.room_order[room_idx];
            for slot in slots(self.weeks, self.days, self.periods) {
                if let Some(&occupancy) = self.room_occupancy.get(&(room, slot)) {
                    Self::reify_occupancy(
                        &mut self.cp,
                        occupancy,
                        self.room_cover.get(&(room, slot)),
                    );
                }
            }
        }
    }

    /// Per-section totals for regular sections. Virtual sections are
    /// deliberately excluded: their totals are carried once per option on
    /// the masters, and per-copy totals would double-count through the
    /// equality coupling.
    fn add_subject_totals(&mut self) {
        info!("adding subject-total constraints for regular sections");
        for pair_idx in 0..self.pair_order.len() {
            let pair = self.pair_order[pair_idx];
            let (section, subject) = pair;
            if self.virtual_sections.contains(&section) {
                continue;
            }
            let required = self.period_requirements.get(&subject).copied().unwrap_or(0);
            if required == 0 {
                continue;
            }
            let starts = self.pair_starts.get(&pair).map_or(&[][..], Vec::as_slice);
            let terms: Vec<(i64, VarId)> = starts
                .iter()
                .map(|&idx| {
                    let assignment = &self.assignments[idx];
                    (i64::from(assignment.length), assignment.var)
                })
                .collect();
            self.cp.add(terms, Cmp::Eq, i64::from(required));
        }
    }

    fn add_elective_totals(&mut self) {
        info!("adding aggregated elective subject totals");
        for group_idx in 0..self.groups.len() {
            for option_idx in 0..self.groups[group_idx].options.len() {
                let subject = self.groups[group_idx].options[option_idx].subject;
                let required = self.period_requirements.get(&subject).copied().unwrap_or(0);
                if required == 0 {
                    continue;
                }
                let length = self.subject_lengths.get(&subject).copied().unwrap_or(1);
                let terms: Vec<(i64, VarId)> = self.masters_by_option[group_idx][option_idx]
                    .iter()
                    .map(|&master| (i64::from(length), master))
                    .collect();
                self.cp.add(terms, Cmp::Eq, i64::from(required));
            }
        }
    }

    fn add_lab_capacity(&mut self) {
        info!(
            "adding global lab-room capacity constraints (<= {})",
            self.lab_room_capacity
        );
        for slot in slots(self.weeks, self.days, self.periods) {
            if let Some(vars) = self.lab_cover.get(&slot) {
                if vars.is_empty() {
                    continue;
                }
                let terms: Vec<(i64, VarId)> = vars.iter().map(|&v| (1, v)).collect();
                self.cp
                    .add(terms, Cmp::Le, i64::from(self.lab_room_capacity));
            }
        }
    }

    /// Theory spread: prefer at most one start of a subject per day
    fn add_theory_spread_penalties(&mut self) {
        info!("adding theory-spread penalties");
        for pair_idx in 0..self.pair_order.len() {
            let pair = self.pair_order[pair_idx];
            let starts = self.pair_starts.get(&pair).cloned().unwrap_or_default();
            let Some(&first) = starts.first() else {
                continue;
            };
            if self.assignments[first].length == 2 {
                continue;
            }
            let (section, subject) = pair;
            let section_name = self.interner.resolve(section).to_string();
            let subject_name = self.interner.resolve(subject).to_string();
            for week in 0..self.weeks {
                for day in 0..self.days {
                    let day_vars: Vec<VarId> = starts
                        .iter()
                        .map(|&idx| &self.assignments[idx])
                        .filter(|a| a.key.slot.week == week && a.key.slot.day == day)
                        .map(|a| a.var)
                        .collect();
                    if day_vars.is_empty() {
                        continue;
                    }
                    let violation = self.cp.new_bool(format!(
                        "viol_theoryspread_{section_name}_{subject_name}_w{week}_d{day}"
                    ));
                    let terms: Vec<(i64, VarId)> =
                        day_vars.iter().map(|&v| (1, v)).collect();
                    self.cp
                        .add_only_if(terms.clone(), Cmp::Le, 1, Lit::neg(violation));
                    self.cp.add_only_if(terms, Cmp::Ge, 2, Lit::pos(violation));
                    self.penalties.push(violation);
                }
            }
        }
    }

    /// Consecutive-theory cap: no 3 theory starts of one faculty inside
    /// any 3-period window of a day
    fn add_consecutive_theory_penalties(&mut self) {
        info!("adding consecutive-theory penalties");
        for faculty_idx in 0..self.faculty_order.len() {
            let faculty = self.faculty_order[faculty_idx];
            let faculty_name = self.interner.resolve(faculty).to_string();
            for week in 0..self.weeks {
                for day in 0..self.days {
                    let day_starts = self
                        .theory_by_faculty_day
                        .get(&(faculty, week, day))
                        .cloned()
                        .unwrap_or_default();
                    if day_starts.is_empty() {
                        continue;
                    }
                    for window_start in 0..self.periods.saturating_sub(2) {
                        let window: Vec<VarId> = day_starts
                            .iter()
                            .filter(|(period, _)| {
                                *period >= window_start && *period <= window_start + 2
                            })
                            .map(|&(_, var)| var)
                            .collect();
                        if window.is_empty() {
                            continue;
                        }
                        let violation = self.cp.new_bool(format!(
                            "viol_consec_theory_{faculty_name}_w{week}_d{day}_p{window_start}"
                        ));
                        let terms: Vec<(i64, VarId)> =
                            window.iter().map(|&v| (1, v)).collect();
                        self.cp
                            .add_only_if(terms.clone(), Cmp::Le, 2, Lit::neg(violation));
                        self.cp.add_only_if(terms, Cmp::Ge, 3, Lit::pos(violation));
                        self.penalties.push(violation);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{NormalizedSection, Section, Subject};

    fn section(id: &str, semester: &str, subjects: Vec<Subject>) -> NormalizedSection {
        let raw = Section {
            id: id.to_string(),
            name: id.to_uppercase(),
            year: 3,
            section: "a".to_string(),
            semester: semester.to_string(),
            total_students: 60,
            class_teacher: None,
        };
        NormalizedSection::from_section(&raw, subjects, None)
    }

    fn theory(id: &str, faculty: &str) -> Subject {
        let mut subject = Subject::new(id.to_string(), id.to_string(), 3, false);
        subject.assigned_faculty_id = Some(faculty.to_string());
        subject
    }

    fn one_week_params() -> SolverParams {
        SolverParams::default()
    }

    #[test]
    fn assignment_vars_cover_every_slot_for_theory() {
        let sections = vec![section("aiml-3-a", "3-2", vec![theory("S1", "F1")])];
        let mut requirements = HashMap::new();
        requirements.insert("S1".to_string(), 3);
        let room_map = HashMap::new();

        let model = build_model(&sections, &requirements, &room_map, 1, &one_week_params());

        // 6 days x 8 periods of starts for a 1-week theory subject
        assert_eq!(model.assignments.len(), 48);
        assert_eq!(model.pair_order.len(), 1);
        // Occupancy: 48 section + 48 faculty, no room mapped
        assert_eq!(model.section_occupancy.len(), 48);
        assert_eq!(model.faculty_occupancy.len(), 48);
        assert!(model.room_occupancy.is_empty());
        assert!(model.masters.is_empty());
    }

    #[test]
    fn lab_starts_leave_room_for_the_block() {
        let mut lab = Subject::new("L1".to_string(), "L1".to_string(), 4, true);
        lab.assigned_faculty_id = Some("F1".to_string());
        let sections = vec![section("aiml-3-a", "3-2", vec![lab])];
        let mut requirements = HashMap::new();
        requirements.insert("L1".to_string(), 4);

        let model = build_model(&sections, &requirements, &HashMap::new(), 1, &one_week_params());

        // Starts only at p in 0..=6: 6 days x 7 starts
        assert_eq!(model.assignments.len(), 42);
        assert!(model
            .assignments
            .iter()
            .all(|a| a.key.slot.period + a.length <= 8));
    }

    #[test]
    fn pair_without_faculty_is_skipped_with_warning() {
        let bare = Subject::new("S1".to_string(), "S1".to_string(), 3, false);
        let sections = vec![section("aiml-3-a", "3-2", vec![bare])];
        let mut requirements = HashMap::new();
        requirements.insert("S1".to_string(), 3);

        let model = build_model(&sections, &requirements, &HashMap::new(), 1, &one_week_params());

        assert!(model.assignments.is_empty());
        assert_eq!(model.warnings.len(), 1);
        assert!(model.warnings[0].contains("no assigned faculty"));
    }

    #[test]
    fn zero_requirement_contributes_no_variables_or_constraints() {
        let sections = vec![section("aiml-3-a", "3-2", vec![theory("S1", "F1")])];
        let mut with_req = HashMap::new();
        with_req.insert("S1".to_string(), 3);
        let with_requirement =
            build_model(&sections, &with_req, &HashMap::new(), 1, &one_week_params());
        assert_eq!(with_requirement.assignments.len(), 48);

        let zero_req = HashMap::new();
        let without_requirement =
            build_model(&sections, &zero_req, &HashMap::new(), 1, &one_week_params());
        assert!(without_requirement.assignments.is_empty());
        assert!(without_requirement.pair_order.is_empty());
        assert!(without_requirement.penalties.is_empty());
    }

    #[test]
    fn building_twice_yields_identical_structure() {
        let sections = vec![
            section(
                "aiml-3-a",
                "3-2",
                vec![theory("S1", "F1"), theory("S2", "F2")],
            ),
            section("aiml-3-b", "3-2", vec![theory("S1", "F1")]),
        ];
        let mut requirements = HashMap::new();
        requirements.insert("S1".to_string(), 3);
        requirements.insert("S2".to_string(), 2);
        let mut room_map = HashMap::new();
        room_map.insert("aiml-3-a".to_string(), "CR-1".to_string());
        room_map.insert("aiml-3-b".to_string(), "CR-2".to_string());

        let first = build_model(&sections, &requirements, &room_map, 2, &one_week_params());
        let second = build_model(&sections, &requirements, &room_map, 2, &one_week_params());

        assert_eq!(first.cp.var_count(), second.cp.var_count());
        assert_eq!(first.cp.constraint_count(), second.cp.constraint_count());
        assert_eq!(first.penalties.len(), second.penalties.len());
        assert_eq!(first.cp.constraints(), second.cp.constraints());
    }

    #[test]
    fn virtual_sections_get_masters_not_totals() {
        let mut option_x = Subject::new("X".to_string(), "X".to_string(), 2, false);
        option_x.assigned_faculty_id = Some("F1".to_string());
        let mut virtual_section = section("VIRTUAL-3-2-EG1-X", "3-2", vec![option_x]);
        virtual_section.is_virtual = true;
        virtual_section.elective_group = Some("EG1".to_string());

        let sections = vec![virtual_section];
        let mut requirements = HashMap::new();
        requirements.insert("X".to_string(), 2);

        let model = build_model(&sections, &requirements, &HashMap::new(), 1, &one_week_params());

        // One master per slot for the single option
        assert_eq!(model.masters.len(), 48);
        assert!(model.is_virtual_section(
            model.interner.get("VIRTUAL-3-2-EG1-X").expect("interned")
        ));

        // The only Eq constraints with the master present should be the
        // equality couplings and the aggregated total, never a per-copy
        // total over assignment vars alone
        let master_vars: std::collections::HashSet<VarId> =
            model.masters.iter().map(|m| m.var).collect();
        let per_copy_totals = model
            .cp
            .constraints()
            .iter()
            .filter(|c| {
                c.cmp == Cmp::Eq
                    && c.rhs == 2
                    && c.terms.iter().all(|(_, v)| !master_vars.contains(v))
            })
            .count();
        assert_eq!(per_copy_totals, 0);

        let aggregated_totals = model
            .cp
            .constraints()
            .iter()
            .filter(|c| {
                c.cmp == Cmp::Eq
                    && c.rhs == 2
                    && !c.terms.is_empty()
                    && c.terms.iter().all(|(_, v)| master_vars.contains(v))
            })
            .count();
        assert_eq!(aggregated_totals, 1);
    }
}
