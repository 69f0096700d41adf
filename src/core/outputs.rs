//! Result expansion: explode chosen assignment keys into per-slot records
//! and group them into per-section, per-faculty, and per-room views.
//!
//! Virtual-section entries are additionally merged into every real section
//! of the same year, recognized by the `aiml-{year}-` identifier prefix.
//! The year is the second `-`-separated token of the virtual identifier.

use crate::core::error::Error;
use crate::core::model::TimetableModel;
use crate::core::normalize::VIRTUAL_PREFIX;
use crate::{info, warn};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One concrete timetable slot after expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableEntry {
    /// Calendar date of the slot, when the day index maps into the
    /// working-day list
    pub date: Option<NaiveDate>,
    /// Global day index (`week * days_per_week + day`)
    pub day_index: usize,
    /// Period within the day
    pub period: u32,
    /// Section identifier
    pub section: String,
    /// Subject identifier
    pub subject: String,
    /// Faculty delivering the slot
    pub faculty: Option<String>,
    /// Room hosting the slot
    pub room: Option<String>,
    /// Whether the slot belongs to a lab block
    pub is_lab: bool,
    /// Reserved for downstream free-slot padding
    pub free: bool,
}

/// The three grouped views of an expanded timetable
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExpandedTimetable {
    /// Entries grouped by section
    pub by_section: BTreeMap<String, Vec<TimetableEntry>>,
    /// Entries grouped by faculty
    pub by_faculty: BTreeMap<String, Vec<TimetableEntry>>,
    /// Entries grouped by room
    pub by_room: BTreeMap<String, Vec<TimetableEntry>>,
}

/// Expand chosen assignment indices into per-slot records
#[must_use]
pub fn expand_assignments(
    model: &TimetableModel,
    chosen: &[usize],
    working_dates: &[NaiveDate],
) -> ExpandedTimetable {
    let mut expanded = ExpandedTimetable::default();

    for &idx in chosen {
        let Some(assignment) = model.assignments.get(idx) else {
            warn!("chosen index {idx} is out of range; skipping");
            continue;
        };
        let section = model.interner.resolve(assignment.key.section).to_string();
        let subject = model.interner.resolve(assignment.key.subject).to_string();
        let faculty = Some(model.interner.resolve(assignment.faculty).to_string());
        let room = model
            .section_rooms
            .get(&assignment.key.section)
            .map(|&sym| model.interner.resolve(sym).to_string());
        let is_lab = assignment.length == 2;
        let day_index = (assignment.key.slot.week * model.days_per_week
            + assignment.key.slot.day) as usize;
        let date = working_dates.get(day_index).copied();

        for offset in 0..assignment.length {
            let entry = TimetableEntry {
                date,
                day_index,
                period: assignment.key.slot.period + offset,
                section: section.clone(),
                subject: subject.clone(),
                faculty: faculty.clone(),
                room: room.clone(),
                is_lab,
                free: false,
            };
            expanded
                .by_section
                .entry(section.clone())
                .or_default()
                .push(entry.clone());
            if let Some(faculty_id) = &faculty {
                expanded
                    .by_faculty
                    .entry(faculty_id.clone())
                    .or_default()
                    .push(entry.clone());
            }
            if let Some(room_id) = &room {
                expanded
                    .by_room
                    .entry(room_id.clone())
                    .or_default()
                    .push(entry);
            }
        }
    }

    info!(
        "expanded {} chosen keys into {} section slots",
        chosen.len(),
        expanded.by_section.values().map(Vec::len).sum::<usize>()
    );
    expanded
}

/// Merge virtual-section entries into every real section of the same year.
///
/// The year is parsed from the second `-`-separated token of the virtual
/// identifier; target sections are those whose identifier starts
/// `aiml-{year}`.
#[must_use]
pub fn enrich_virtual_sections(
    by_section: &BTreeMap<String, Vec<TimetableEntry>>,
) -> BTreeMap<String, Vec<TimetableEntry>> {
    let mut enriched: BTreeMap<String, Vec<TimetableEntry>> = by_section
        .iter()
        .filter(|(section, _)| !section.starts_with(VIRTUAL_PREFIX))
        .map(|(section, entries)| (section.clone(), entries.clone()))
        .collect();

    for (section, entries) in by_section {
        if !section.starts_with(VIRTUAL_PREFIX) {
            continue;
        }
        let Some(year) = section.split('-').nth(1).filter(|t| !t.is_empty()) else {
            warn!("skipping virtual section with unexpected format: {section}");
            continue;
        };
        let prefix = format!("aiml-{year}");
        for (target, target_entries) in &mut enriched {
            if target.starts_with(&prefix) {
                target_entries.extend(entries.iter().cloned());
                info!(
                    "merged {} entries from {section} -> {target}",
                    entries.len()
                );
            }
        }
    }

    enriched
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

/// Write the grouped views and the enriched per-section view next to the
/// given prefix (`{prefix}_section.json` etc.)
pub fn write_outputs(expanded: &ExpandedTimetable, out_prefix: &Path) -> Result<(), Error> {
    let prefix = out_prefix.to_string_lossy();
    write_json(
        &expanded.by_section,
        Path::new(&format!("{prefix}_section.json")),
    )?;
    write_json(
        &expanded.by_faculty,
        Path::new(&format!("{prefix}_faculty.json")),
    )?;
    write_json(&expanded.by_room, Path::new(&format!("{prefix}_room.json")))?;

    let enriched = enrich_virtual_sections(&expanded.by_section);
    write_json(
        &enriched,
        Path::new(&format!("{prefix}_enriched_section.json")),
    )?;
    info!("wrote timetable outputs with prefix {prefix}");
    Ok(())
}
