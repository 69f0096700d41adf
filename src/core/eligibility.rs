//! Faculty ↔ subject eligibility relations.
//!
//! A faculty record lists subject identifiers; matching against the subject
//! masters is case-insensitive, unknown references are dropped. The inverse
//! relation keeps faculty in input order so downstream tie-breaking is
//! deterministic.

use crate::core::models::{Faculty, Subject};
use crate::info;
use std::collections::{BTreeSet, HashMap};

/// Build the faculty → eligible subject relation.
///
/// Subject lists are sorted for stable output; unknown subject references
/// are silently dropped.
#[must_use]
pub fn build_faculty_subject_map(
    faculty: &[Faculty],
    subjects: &[Subject],
) -> HashMap<String, Vec<String>> {
    let canonical: HashMap<String, &str> = subjects
        .iter()
        .map(|s| (s.id.to_lowercase(), s.id.as_str()))
        .collect();

    let mut map = HashMap::new();
    for member in faculty {
        let eligible: BTreeSet<String> = member
            .subjects
            .iter()
            .filter_map(|reference| canonical.get(&reference.to_lowercase()))
            .map(|id| (*id).to_string())
            .collect();
        let eligible: Vec<String> = eligible.into_iter().collect();
        info!(
            "faculty '{}' eligible for {} subjects",
            member.id,
            eligible.len()
        );
        map.insert(member.id.clone(), eligible);
    }
    map
}

/// Invert the relation into subject → eligible faculty.
///
/// Faculty appear in their input order within each subject's list.
#[must_use]
pub fn invert_faculty_subject_map(
    faculty: &[Faculty],
    faculty_subject_map: &HashMap<String, Vec<String>>,
) -> HashMap<String, Vec<String>> {
    let mut inverted: HashMap<String, Vec<String>> = HashMap::new();
    for member in faculty {
        if let Some(subjects) = faculty_subject_map.get(&member.id) {
            for subject_id in subjects {
                inverted
                    .entry(subject_id.clone())
                    .or_default()
                    .push(member.id.clone());
            }
        }
    }
    inverted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(id: &str) -> Subject {
        Subject::new(id.to_string(), id.to_string(), 45, false)
    }

    #[test]
    fn matches_case_insensitively() {
        let faculty = vec![Faculty::new(
            "FAC001".to_string(),
            "Dr. Rao".to_string(),
            vec!["subj001".to_string(), "SUBJ002".to_string()],
        )];
        let subjects = vec![subject("SUBJ001"), subject("SUBJ002")];

        let map = build_faculty_subject_map(&faculty, &subjects);
        assert_eq!(
            map.get("FAC001"),
            Some(&vec!["SUBJ001".to_string(), "SUBJ002".to_string()])
        );
    }

    #[test]
    fn drops_unknown_subject_references() {
        let faculty = vec![Faculty::new(
            "FAC001".to_string(),
            "Dr. Rao".to_string(),
            vec!["SUBJ001".to_string(), "SUBJ999".to_string()],
        )];
        let subjects = vec![subject("SUBJ001")];

        let map = build_faculty_subject_map(&faculty, &subjects);
        assert_eq!(map.get("FAC001"), Some(&vec!["SUBJ001".to_string()]));
    }

    #[test]
    fn deduplicates_repeated_references() {
        let faculty = vec![Faculty::new(
            "FAC001".to_string(),
            "Dr. Rao".to_string(),
            vec!["SUBJ001".to_string(), "subj001".to_string()],
        )];
        let subjects = vec![subject("SUBJ001")];

        let map = build_faculty_subject_map(&faculty, &subjects);
        assert_eq!(map.get("FAC001").map(Vec::len), Some(1));
    }

    #[test]
    fn inverse_keeps_faculty_input_order() {
        let faculty = vec![
            Faculty::new(
                "FAC002".to_string(),
                "Dr. Iyer".to_string(),
                vec!["SUBJ001".to_string()],
            ),
            Faculty::new(
                "FAC001".to_string(),
                "Dr. Rao".to_string(),
                vec!["SUBJ001".to_string()],
            ),
        ];
        let subjects = vec![subject("SUBJ001")];

        let map = build_faculty_subject_map(&faculty, &subjects);
        let inverted = invert_faculty_subject_map(&faculty, &map);
        assert_eq!(
            inverted.get("SUBJ001"),
            Some(&vec!["FAC002".to_string(), "FAC001".to_string()])
        );
    }
}
