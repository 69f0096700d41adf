//! Section → classroom mapping.
//!
//! Real sections get a unique classroom by first fit over rooms sorted
//! ascending by capacity. Virtual elective sections reuse rooms already
//! assigned to real sections of the same semester, spilling to still-unused
//! rooms when the semester's own rooms run out.

use crate::core::models::{Classroom, NormalizedSection, Section};
use crate::{info, warn};
use std::collections::{HashMap, HashSet};

/// Map every section (real and virtual) to a classroom.
///
/// Virtual sections have their `mapped_classroom` field set in place.
/// Sections that cannot be placed are left out of the map with a warning.
#[must_use]
pub fn map_sections_to_classrooms(
    sections: &[Section],
    virtual_sections: &mut [NormalizedSection],
    classrooms: &[Classroom],
) -> HashMap<String, String> {
    let mut mapping: HashMap<String, String> = HashMap::new();
    let mut assigned: HashSet<&str> = HashSet::new();

    let mut eligible: Vec<&Classroom> =
        classrooms.iter().filter(|c| c.is_schedulable()).collect();
    eligible.sort_by_key(|c| c.capacity);

    // Phase 1: real sections, first fit by capacity
    for section in sections {
        let chosen = eligible.iter().find(|room| {
            room.capacity >= section.total_students && !assigned.contains(room.id.as_str())
        });
        match chosen {
            Some(room) => {
                assigned.insert(room.id.as_str());
                mapping.insert(section.id.clone(), room.id.clone());
                info!(
                    "section '{}' (strength={}, sem={}) -> classroom '{}'",
                    section.id, section.total_students, section.semester, room.id
                );
            }
            None => {
                warn!(
                    "no classroom fits section '{}' (strength={})",
                    section.id, section.total_students
                );
            }
        }
    }

    // Rooms used per semester, in section order, for elective reuse
    let mut semester_rooms: HashMap<&str, Vec<String>> = HashMap::new();
    for section in sections {
        if let Some(room) = mapping.get(&section.id) {
            semester_rooms
                .entry(section.semester.as_str())
                .or_default()
                .push(room.clone());
        }
    }

    let mut remaining: Vec<String> = eligible
        .iter()
        .filter(|room| !assigned.contains(room.id.as_str()))
        .map(|room| room.id.clone())
        .collect();

    // Phase 2: virtual sections grouped by (semester, elective group)
    let mut group_order: Vec<(String, String)> = Vec::new();
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (idx, section) in virtual_sections.iter().enumerate() {
        let key = (
            section.semester.clone(),
            section.elective_group.clone().unwrap_or_default(),
        );
        if let Some(members) = groups.get_mut(&key) {
            members.push(idx);
        } else {
            group_order.push(key.clone());
            groups.insert(key, vec![idx]);
        }
    }

    for key in group_order {
        let (semester, group) = key.clone();
        let members = groups.remove(&key).unwrap_or_default();
        let mut available = semester_rooms.get(semester.as_str()).cloned().unwrap_or_default();

        for idx in members {
            let room = if available.is_empty() {
                if remaining.is_empty() {
                    None
                } else {
                    Some(remaining.remove(0))
                }
            } else {
                Some(available.remove(0))
            };

            let section = &mut virtual_sections[idx];
            match room {
                Some(room_id) => {
                    mapping.insert(section.id.clone(), room_id.clone());
                    section.mapped_classroom = Some(room_id.clone());
                    info!(
                        "virtual section '{}' (sem={semester}, group={group}) -> classroom '{room_id}'",
                        section.id
                    );
                }
                None => {
                    warn!(
                        "no classroom left for virtual section '{}' (sem={semester}, group={group})",
                        section.id
                    );
                }
            }
        }
    }

    mapping
}
