//! Cumulative average and curriculum coverage.

use crate::domain::model::{
    CanonicalTranscript, CatalogCoverage, CatalogEntry, CatalogProgress, EnrollmentRecord, GradeCount,
    MatchReport, NormalizedTranscript, ProgressSummary,
};
use crate::domain::services::grade_scale::GRADE_SCALE;

/// Points over credited units, 0.0 when nothing is credited.
pub fn cumulative_average(transcript: &CanonicalTranscript) -> f64 {
    let units = transcript.credited_units();
    if units == 0 {
        return 0.0;
    }
    transcript.point_total() / f64::from(units)
}

/// Coverage of one catalog from its two match views.
pub fn coverage(
    catalog: &[CatalogEntry],
    credited: MatchReport,
    including_in_progress: &MatchReport,
    target_units: u32,
) -> CatalogCoverage {
    let catalog_units: u32 = catalog.iter().map(|e| e.credit_units).sum();
    let credited_units = credited.matched_units();
    let completion = if target_units == 0 {
        1.0
    } else {
        (f64::from(credited_units) / f64::from(target_units)).min(1.0)
    };

    CatalogCoverage {
        catalog_units,
        target_units,
        credited_units,
        including_in_progress_units: including_in_progress.matched_units(),
        completion,
        unmatched_credited: credited.unmatched_entries(),
        unmatched_including_in_progress: including_in_progress.unmatched_entries(),
        matches: credited.results,
    }
}

/// Letter counts over every posted attempt, retakes and failures included,
/// best grade first.
pub fn grade_distribution(attempts: &[EnrollmentRecord]) -> Vec<GradeCount> {
    GRADE_SCALE
        .iter()
        .map(|(grade, _)| GradeCount {
            grade: *grade,
            count: attempts
                .iter()
                .filter(|r| r.grade.letter() == Some(*grade))
                .count(),
        })
        .collect()
}

pub fn summarize(
    normalized: &NormalizedTranscript,
    attempts: &[EnrollmentRecord],
    required: CatalogProgress,
    elective: CatalogProgress,
    graduation_units: u32,
    next_term_entitlement: u32,
) -> ProgressSummary {
    let credited_units = normalized.canonical.credited_units();

    ProgressSummary {
        cumulative_average: cumulative_average(&normalized.canonical),
        credited_units,
        in_progress_units: normalized.in_progress.iter().map(|r| r.credit_units).sum(),
        graduation_units,
        graduation_reached: credited_units >= graduation_units,
        required,
        elective,
        grade_distribution: grade_distribution(attempts),
        next_term_entitlement,
    }
}
