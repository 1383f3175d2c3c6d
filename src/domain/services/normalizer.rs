//! Collapses repeated attempts into one best-graded record per course.
//!
//! Attempts graded E are left out of the graded set on purpose: a course that
//! was only ever failed shows up neither as credited nor as in progress.

use crate::domain::model::{CanonicalTranscript, EnrollmentRecord, NormalizedTranscript};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

pub fn normalize(records: &[EnrollmentRecord]) -> NormalizedTranscript {
    let mut best: BTreeMap<String, EnrollmentRecord> = BTreeMap::new();

    for record in records {
        let Some(points) = record.credited_points() else {
            continue;
        };

        match best.entry(record.course_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
            Entry::Occupied(mut slot) => {
                let kept = slot.get().credited_points().unwrap_or(0.0);
                // strictly greater: on a tie the earlier attempt stays
                if points > kept {
                    slot.insert(record.clone());
                }
            }
        }
    }

    let canonical = CanonicalTranscript { courses: best };

    let in_progress: Vec<EnrollmentRecord> = records
        .iter()
        .filter(|r| r.grade.letter().is_none())
        .filter(|r| !canonical.contains(&r.course_name))
        .cloned()
        .collect();

    tracing::debug!(
        "Normalized {} attempts into {} credited courses and {} in progress",
        records.len(),
        canonical.len(),
        in_progress.len()
    );

    NormalizedTranscript {
        canonical,
        in_progress,
    }
}

/// Every course name in the history (retakes repeated), in input order.
pub fn all_course_names(records: &[EnrollmentRecord]) -> Vec<String> {
    records.iter().map(|r| r.course_name.clone()).collect()
}

/// Course names that only ever received E.
pub fn failed_only_courses(records: &[EnrollmentRecord]) -> Vec<String> {
    let touched: HashSet<&str> = records
        .iter()
        .filter(|r| r.grade.letter().map_or(true, |l| !l.is_failing()))
        .map(|r| r.course_name.as_str())
        .collect();

    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !touched.contains(r.course_name.as_str()))
        .filter(|r| seen.insert(r.course_name.as_str()))
        .map(|r| r.course_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::grade_scale::LetterGrade;

    fn rec(name: &str, units: u32, term: &str, grade: &str) -> EnrollmentRecord {
        EnrollmentRecord::new(name, units, term, grade)
    }

    #[test]
    fn test_retake_keeps_best_grade() {
        let records = vec![
            rec("Calculus I", 3, "2022/2023 Ganjil", "D"),
            rec("Calculus I", 3, "2022/2023 Genap", "A"),
        ];

        let out = normalize(&records);

        assert_eq!(out.canonical.len(), 1);
        let kept = out.canonical.get("Calculus I").unwrap();
        assert_eq!(kept.grade.letter(), Some(LetterGrade::A));
        assert_eq!(kept.credited_points(), Some(4.0));
        assert_eq!(kept.term.as_str(), "2022/2023 Genap");
        assert!(out.in_progress.is_empty());
    }

    #[test]
    fn test_tie_keeps_first_occurrence() {
        let records = vec![
            rec("Kimia Dasar", 2, "2021/2022 Ganjil", "B"),
            rec("Kimia Dasar", 2, "2022/2023 Ganjil", "B"),
        ];

        let out = normalize(&records);
        let kept = out.canonical.get("Kimia Dasar").unwrap();
        assert_eq!(kept.term.as_str(), "2021/2022 Ganjil");
    }

    #[test]
    fn test_failed_only_course_is_dropped_everywhere() {
        let records = vec![
            rec("Statistika", 3, "2022/2023 Ganjil", "E"),
            rec("Statistika", 3, "2022/2023 Genap", "E"),
            rec("Fisika Dasar I", 3, "2022/2023 Ganjil", "B"),
        ];

        let out = normalize(&records);
        assert!(!out.canonical.contains("Statistika"));
        assert!(out.in_progress.iter().all(|r| r.course_name != "Statistika"));
        assert_eq!(failed_only_courses(&records), vec!["Statistika".to_string()]);
    }

    #[test]
    fn test_in_progress_attempt_dropped_when_graded_attempt_exists() {
        let records = vec![
            rec("Biologi Umum", 2, "2022/2023 Ganjil", "C"),
            rec("Biologi Umum", 2, "2023/2024 Ganjil", "*BT"),
            rec("Metode Numerik", 3, "2023/2024 Ganjil", "*BT"),
        ];

        let out = normalize(&records);
        assert_eq!(out.canonical.len(), 1);
        assert_eq!(out.in_progress.len(), 1);
        assert_eq!(out.in_progress[0].course_name, "Metode Numerik");
    }

    #[test]
    fn test_failed_then_in_progress_counts_as_in_progress() {
        let records = vec![
            rec("Statistika", 3, "2022/2023 Ganjil", "E"),
            rec("Statistika", 3, "2023/2024 Ganjil", "*BT"),
        ];

        let out = normalize(&records);
        assert!(out.canonical.is_empty());
        assert_eq!(out.in_progress.len(), 1);
        assert!(failed_only_courses(&records).is_empty());
    }

    #[test]
    fn test_unrecognised_grade_is_in_progress() {
        let records = vec![rec("Seminar", 1, "2023/2024 Genap", "T")];
        let out = normalize(&records);
        assert!(out.canonical.is_empty());
        assert_eq!(out.in_progress.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let out = normalize(&[]);
        assert!(out.canonical.is_empty());
        assert!(out.in_progress.is_empty());
    }

    #[test]
    fn test_at_most_one_record_per_course_with_max_points() {
        let grades = ["C", "A", "E", "AB", "*BT", "A", "D"];
        let records: Vec<EnrollmentRecord> = grades
            .iter()
            .enumerate()
            .map(|(i, g)| rec(if i % 2 == 0 { "X" } else { "Y" }, 2, "2022/2023 Ganjil", g))
            .collect();

        let out = normalize(&records);
        assert_eq!(out.canonical.len(), 2);
        for (name, record) in &out.canonical.courses {
            let best = records
                .iter()
                .filter(|r| &r.course_name == name)
                .filter_map(EnrollmentRecord::credited_points)
                .fold(f64::MIN, f64::max);
            assert_eq!(record.credited_points(), Some(best));
        }
    }
}
