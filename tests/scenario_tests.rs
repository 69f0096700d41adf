//! End-to-end scenario tests: build a model from a small planning view,
//! solve it with the bundled backend, and check the solution invariants.

use std::collections::{HashMap, HashSet};
use timetabler::model::{build_model, Assignment, ElectiveMaster, SlotKey, Sym, TimetableModel};
use timetabler::models::{NormalizedSection, Section, Subject};
use timetabler::solve::{BranchAndBound, SolveResult, SolverBackend, SolverParams};

fn params() -> SolverParams {
    SolverParams {
        time_limit_seconds: 30,
        ..SolverParams::default()
    }
}

fn subject(id: &str, faculty: &str, is_lab: bool) -> Subject {
    let mut subject = Subject::new(id.to_string(), id.to_string(), 0, is_lab);
    subject.assigned_faculty_id = Some(faculty.to_string());
    subject
}

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

fn virtual_section(
    semester: &str,
    group: &str,
    copy: &str,
    option: Subject,
) -> NormalizedSection {
    let mut normalized = section(
        &format!("VIRTUAL-{semester}-{group}-{copy}"),
        semester,
        vec![option],
    );
    normalized.is_virtual = true;
    normalized.elective_group = Some(group.to_string());
    normalized
}

fn solve(model: &TimetableModel, params: &SolverParams) -> SolveResult {
    BranchAndBound.solve(&model.cp, params)
}

fn chosen<'a>(model: &'a TimetableModel, result: &SolveResult) -> Vec<&'a Assignment> {
    model
        .assignments
        .iter()
        .filter(|a| result.value(a.var))
        .collect()
}

/// Check every FEASIBLE/OPTIMAL solution invariant from the design
fn assert_invariants(
    model: &TimetableModel,
    result: &SolveResult,
    sections: &[NormalizedSection],
) {
    assert!(result.status.has_solution(), "expected a solution");
    let picked = chosen(model, result);

    // Subject totals for non-virtual pairs
    let mut totals: HashMap<(Sym, Sym), u32> = HashMap::new();
    for assignment in &picked {
        *totals
            .entry((assignment.key.section, assignment.key.subject))
            .or_insert(0) += assignment.length;
    }
    for pair in &model.pair_order {
        if model.is_virtual_section(pair.0) {
            continue;
        }
        let required = model.period_requirements.get(&pair.1).copied().unwrap_or(0);
        assert_eq!(
            totals.get(pair).copied().unwrap_or(0),
            required,
            "subject total violated for {}/{}",
            model.interner.resolve(pair.0),
            model.interner.resolve(pair.1)
        );
    }

    // No double-booking of sections, faculty, or rooms
    let mut section_slots: HashMap<(Sym, SlotKey), u32> = HashMap::new();
    let mut faculty_slots: HashMap<(Sym, SlotKey), u32> = HashMap::new();
    let mut room_slots: HashMap<(Sym, SlotKey), u32> = HashMap::new();
    let mut lab_slots: HashMap<SlotKey, u32> = HashMap::new();
    for assignment in &picked {
        for slot in assignment.cover() {
            *section_slots
                .entry((assignment.key.section, slot))
                .or_insert(0) += 1;
            *faculty_slots.entry((assignment.faculty, slot)).or_insert(0) += 1;
            if let Some(&room) = model.section_rooms.get(&assignment.key.section) {
                *room_slots.entry((room, slot)).or_insert(0) += 1;
            }
            if assignment.length == 2 {
                *lab_slots.entry(slot).or_insert(0) += 1;
            }
        }
    }
    assert!(section_slots.values().all(|&count| count <= 1));
    assert!(faculty_slots.values().all(|&count| count <= 1));
    assert!(room_slots.values().all(|&count| count <= 1));
    assert!(lab_slots
        .values()
        .all(|&count| count <= model.lab_room_capacity));

    // At most one elective option per group per slot
    let active_masters: Vec<&ElectiveMaster> = model
        .masters
        .iter()
        .filter(|master| result.value(master.var))
        .collect();
    let mut group_slots: HashMap<(Sym, Sym, SlotKey), u32> = HashMap::new();
    for master in &active_masters {
        *group_slots
            .entry((master.semester, master.group, master.slot))
            .or_insert(0) += 1;
    }
    assert!(group_slots.values().all(|&count| count <= 1));

    // All virtual copies of an option share one assignment pattern
    let mut option_patterns: HashMap<(Sym, Sym), Vec<HashSet<SlotKey>>> = HashMap::new();
    for normalized in sections.iter().filter(|s| s.is_virtual) {
        let Some(group) = normalized.elective_group.as_deref() else {
            continue;
        };
        let section_sym = model.interner.get(&normalized.id).expect("interned section");
        let group_sym = model.interner.get(group).expect("interned group");
        for taught in &normalized.subjects {
            let subject_sym = model.interner.get(&taught.id).expect("interned subject");
            let pattern: HashSet<SlotKey> = picked
                .iter()
                .filter(|a| a.key.section == section_sym && a.key.subject == subject_sym)
                .map(|a| a.key.slot)
                .collect();
            option_patterns
                .entry((group_sym, subject_sym))
                .or_default()
                .push(pattern);
        }
    }
    for patterns in option_patterns.values() {
        for pattern in patterns {
            assert_eq!(
                pattern, &patterns[0],
                "virtual copies of one option must be bit-equal"
            );
        }
    }

    // An active master blocks the semester's real sections at that slot
    let mut semester_of: HashMap<Sym, Sym> = HashMap::new();
    for normalized in sections {
        let section_sym = model.interner.get(&normalized.id).expect("interned section");
        if let Some(semester_sym) = model.interner.get(&normalized.semester) {
            semester_of.insert(section_sym, semester_sym);
        }
    }
    for master in &active_masters {
        for assignment in &picked {
            if model.is_virtual_section(assignment.key.section) {
                continue;
            }
            if semester_of.get(&assignment.key.section) != Some(&master.semester) {
                continue;
            }
            assert!(
                !assignment.cover().contains(&master.slot),
                "real section {} scheduled during an active elective",
                model.interner.resolve(assignment.key.section)
            );
        }
    }

    // Lab blocks stay inside the day
    for assignment in &picked {
        if assignment.length == 2 {
            assert!(assignment.key.slot.period <= model.periods_per_day - 2);
        }
    }
}

#[test]
fn scenario_trivial_theory_week() {
    // 1 section, 1 theory subject of 3 periods, 1 faculty, 1 room, 1 week
    let sections = vec![section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)])];
    let mut requirements = HashMap::new();
    requirements.insert("S1".to_string(), 3);
    let mut room_map = HashMap::new();
    room_map.insert("aiml-3-a".to_string(), "CR-101".to_string());

    let params = params();
    let model = build_model(&sections, &requirements, &room_map, 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);

    let picked = chosen(&model, &result);
    assert_eq!(picked.len(), 3);

    // Distinct (day, period) with period < 8
    let slots: HashSet<(u32, u32)> = picked
        .iter()
        .map(|a| (a.key.slot.day, a.key.slot.period))
        .collect();
    assert_eq!(slots.len(), 3);
    assert!(picked.iter().all(|a| a.key.slot.period < 8));

    // Exactly 3 faculty and 3 section occupancies on
    let faculty_on = model
        .faculty_occupancy
        .values()
        .filter(|&&var| result.value(var))
        .count();
    let sections_on = model
        .section_occupancy
        .values()
        .filter(|&&var| result.value(var))
        .count();
    assert_eq!(faculty_on, 3);
    assert_eq!(sections_on, 3);
}

#[test]
fn scenario_lab_blocks_fit() {
    // 1 lab subject of 4 periods with a single shared lab room
    let sections = vec![section("aiml-3-a", "3-2", vec![subject("L1", "F1", true)])];
    let mut requirements = HashMap::new();
    requirements.insert("L1".to_string(), 4);

    let params = SolverParams {
        lab_room_capacity: 1,
        ..params()
    };
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);

    let picked = chosen(&model, &result);
    assert_eq!(picked.len(), 2);
    for assignment in &picked {
        assert!(assignment.key.slot.period <= 6);
        assert_eq!(assignment.cover().len(), 2);
    }

    // The two blocks never overlap
    let covered: Vec<SlotKey> = picked.iter().flat_map(|a| a.cover()).collect();
    let unique: HashSet<SlotKey> = covered.iter().copied().collect();
    assert_eq!(covered.len(), unique.len());
}

#[test]
fn scenario_elective_synchronization() {
    // 2 real sections, elective group with options X and Y, 2 virtual
    // copies per option; copies must move in lockstep and options must
    // never share a slot
    let sections = vec![
        section("aiml-3-a", "3-2", vec![subject("CORE", "F1", false)]),
        section("aiml-3-b", "3-2", vec![subject("CORE", "F1", false)]),
        virtual_section("3-2", "EG1", "X", subject("X", "FXA", false)),
        virtual_section("3-2", "EG1", "X2", subject("X", "FXB", false)),
        virtual_section("3-2", "EG1", "Y", subject("Y", "FYA", false)),
        virtual_section("3-2", "EG1", "Y2", subject("Y", "FYB", false)),
    ];
    let mut requirements = HashMap::new();
    requirements.insert("CORE".to_string(), 1);
    requirements.insert("X".to_string(), 2);
    requirements.insert("Y".to_string(), 2);

    let params = params();
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);

    let picked = chosen(&model, &result);

    let pattern_of = |section_id: &str| -> HashSet<SlotKey> {
        let section_sym = model.interner.get(section_id).expect("interned");
        picked
            .iter()
            .filter(|a| a.key.section == section_sym)
            .map(|a| a.key.slot)
            .collect()
    };

    // Both copies of X identical; both copies of Y identical
    let x_slots = pattern_of("VIRTUAL-3-2-EG1-X");
    assert_eq!(x_slots, pattern_of("VIRTUAL-3-2-EG1-X2"));
    assert_eq!(x_slots.len(), 2);
    let y_slots = pattern_of("VIRTUAL-3-2-EG1-Y");
    assert_eq!(y_slots, pattern_of("VIRTUAL-3-2-EG1-Y2"));
    assert_eq!(y_slots.len(), 2);

    // X and Y never share a slot
    assert!(x_slots.is_disjoint(&y_slots));

    // Real sections are idle at chosen elective slots
    for real in ["aiml-3-a", "aiml-3-b"] {
        let real_slots = pattern_of(real);
        assert!(real_slots.is_disjoint(&x_slots));
        assert!(real_slots.is_disjoint(&y_slots));
    }
}

#[test]
fn scenario_theory_spread_is_free_across_days() {
    // 2 periods over a 6-day week spread onto different days
    let sections = vec![section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)])];
    let mut requirements = HashMap::new();
    requirements.insert("S1".to_string(), 2);

    let params = params();
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);
    assert_eq!(result.objective, Some(0));

    let picked = chosen(&model, &result);
    let days: HashSet<u32> = picked.iter().map(|a| a.key.slot.day).collect();
    assert_eq!(days.len(), 2);
}

#[test]
fn scenario_theory_spread_costs_one_when_cramped() {
    // A single-day week forces both periods onto one day
    let sections = vec![section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)])];
    let mut requirements = HashMap::new();
    requirements.insert("S1".to_string(), 2);

    let params = SolverParams {
        days_per_week: 1,
        ..params()
    };
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);
    assert_eq!(result.objective, Some(1));
}

#[test]
fn scenario_consecutive_cap_avoidable() {
    // One faculty teaching three sections can always dodge 3-in-a-row
    let sections = vec![
        section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)]),
        section("aiml-3-b", "3-2", vec![subject("S2", "F1", false)]),
        section("aiml-3-c", "3-2", vec![subject("S3", "F1", false)]),
    ];
    let mut requirements = HashMap::new();
    requirements.insert("S1".to_string(), 1);
    requirements.insert("S2".to_string(), 1);
    requirements.insert("S3".to_string(), 1);

    let params = params();
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    let result = solve(&model, &params);
    assert_invariants(&model, &result, &sections);
    assert_eq!(result.objective, Some(0));

    // No 3 consecutive theory periods for the faculty on any day
    let picked = chosen(&model, &result);
    let mut by_day: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
    for assignment in &picked {
        by_day
            .entry((assignment.key.slot.week, assignment.key.slot.day))
            .or_default()
            .push(assignment.key.slot.period);
    }
    for periods in by_day.values_mut() {
        periods.sort_unstable();
        for window in periods.windows(3) {
            assert!(window[2] - window[0] > 2);
        }
    }
}

#[test]
fn infeasible_when_requirement_exceeds_grid() {
    // 49 periods cannot fit one section's 48-slot week
    let sections = vec![section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)])];
    let mut requirements = HashMap::new();
    requirements.insert("S1".to_string(), 49);

    let params = params();
    let model = build_model(&sections, &requirements, &HashMap::new(), 1, &params);
    assert!(!model.diagnostics.is_clean());
    assert_eq!(model.diagnostics.subject_issues.len(), 1);

    let result = solve(&model, &params);
    assert!(!result.status.has_solution());
}

#[test]
fn building_twice_solves_to_the_same_objective() {
    let build = || {
        let sections = vec![
            section("aiml-3-a", "3-2", vec![subject("S1", "F1", false)]),
            section("aiml-3-b", "3-2", vec![subject("S1", "F1", false)]),
        ];
        let mut requirements = HashMap::new();
        requirements.insert("S1".to_string(), 2);
        build_model(&sections, &requirements, &HashMap::new(), 1, &params())
    };

    let first = build();
    let second = build();
    assert_eq!(first.cp.var_count(), second.cp.var_count());
    assert_eq!(first.cp.constraint_count(), second.cp.constraint_count());

    let params = params();
    let first_result = solve(&first, &params);
    let second_result = solve(&second, &params);
    assert_eq!(first_result.objective, second_result.objective);
    assert_eq!(first_result.values, second_result.values);
}
