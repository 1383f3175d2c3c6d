//! Runs the whole engine over one student's materialised inputs.

use crate::domain::model::{
    CatalogEntry, CatalogKind, CatalogProgress, Dataset, Diagnostic, MatchView, ReconInput,
    ReconciliationReport,
};
use crate::domain::services::aggregator::aggregate_terms;
use crate::domain::services::entitlement::EntitlementPolicy;
use crate::domain::services::matcher::{match_catalog, DEFAULT_FUZZY_THRESHOLD};
use crate::domain::services::normalizer::{all_course_names, failed_only_courses, normalize};
use crate::domain::services::progress::{coverage, summarize};
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_GRADUATION_UNITS: u32 = 144;
pub const DEFAULT_ELECTIVE_TARGET_UNITS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPolicy {
    pub fuzzy_threshold: f64,
    pub graduation_units: u32,
    pub elective_target_units: u32,
    pub entitlement: EntitlementPolicy,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            graduation_units: DEFAULT_GRADUATION_UNITS,
            elective_target_units: DEFAULT_ELECTIVE_TARGET_UNITS,
            entitlement: EntitlementPolicy::default(),
        }
    }
}

impl Validate for ReconciliationPolicy {
    fn validate(&self) -> Result<()> {
        validate_range("policy.fuzzy_threshold", self.fuzzy_threshold, f64::MIN_POSITIVE, 1.0)?;
        validate_positive_number("policy.graduation_units", self.graduation_units, 1)?;
        self.entitlement.validate()
    }
}

pub fn reconcile(input: &ReconInput, policy: &ReconciliationPolicy) -> ReconciliationReport {
    let mut diagnostics = input_diagnostics(input);

    let normalized = normalize(&input.enrollment);

    let mut terms = aggregate_terms(&input.enrollment);
    policy.entitlement.apply(&mut terms);

    let credited_names = normalized.canonical.course_names();
    let all_names = all_course_names(&input.enrollment);

    let required_target: u32 = input.required_catalog.iter().map(|e| e.credit_units).sum();
    let required = catalog_progress(
        CatalogKind::Required,
        &input.required_catalog,
        (&credited_names, &all_names),
        required_target,
        policy.fuzzy_threshold,
        &mut diagnostics,
    );
    let elective = catalog_progress(
        CatalogKind::Elective,
        &input.elective_catalog,
        (&credited_names, &all_names),
        policy.elective_target_units,
        policy.fuzzy_threshold,
        &mut diagnostics,
    );

    let failed_only = failed_only_courses(&input.enrollment);
    if !failed_only.is_empty() {
        tracing::info!(
            "{} course(s) with only failing attempts left out of credit and progress: {}",
            failed_only.len(),
            failed_only.join(", ")
        );
    }

    let summary = summarize(
        &normalized,
        &input.enrollment,
        required,
        elective,
        policy.graduation_units,
        policy.entitlement.next_term(&terms),
    );

    for diagnostic in &diagnostics {
        tracing::warn!("{}", diagnostic);
    }

    tracing::info!(
        "Reconciled {} attempts: {} credited courses ({} units), {} in progress, {} terms, cumulative average {:.2}",
        input.enrollment.len(),
        normalized.canonical.len(),
        summary.credited_units,
        normalized.in_progress.len(),
        terms.len(),
        summary.cumulative_average
    );

    ReconciliationReport {
        transcript: normalized.canonical,
        in_progress: normalized.in_progress,
        terms,
        summary,
        diagnostics,
    }
}

fn input_diagnostics(input: &ReconInput) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (dataset, empty) in [
        (Dataset::Enrollment, input.enrollment.is_empty()),
        (Dataset::RequiredCatalog, input.required_catalog.is_empty()),
        (Dataset::ElectiveCatalog, input.elective_catalog.is_empty()),
    ] {
        if empty {
            diagnostics.push(Diagnostic::MissingReferenceData { dataset });
        }
    }

    let mut seen_terms = HashSet::new();
    for record in &input.enrollment {
        if record.term.is_malformed() && seen_terms.insert(record.term.as_str()) {
            diagnostics.push(Diagnostic::MalformedTermToken {
                term: record.term.as_str().to_string(),
            });
        }
    }

    for record in &input.enrollment {
        if record.grade.letter().is_none() && !record.grade.is_known_marker() {
            diagnostics.push(Diagnostic::UnresolvableGrade {
                course_name: record.course_name.clone(),
                grade: record.grade.to_string(),
            });
        }
    }

    diagnostics
}

fn catalog_progress(
    kind: CatalogKind,
    catalog: &[CatalogEntry],
    (credited_names, all_names): (&[String], &[String]),
    target_units: u32,
    threshold: f64,
    diagnostics: &mut Vec<Diagnostic>,
) -> CatalogProgress {
    if catalog.is_empty() {
        return CatalogProgress::NoData;
    }

    let credited = match_catalog(catalog, credited_names, threshold);
    let including = match_catalog(catalog, all_names, threshold);

    for (view, report) in [
        (MatchView::Credited, &credited),
        (MatchView::IncludingInProgress, &including),
    ] {
        diagnostics.extend(report.ambiguities.iter().map(|detail| Diagnostic::AmbiguousMatch {
            catalog: kind,
            view,
            detail: detail.clone(),
        }));
    }

    CatalogProgress::Computed(coverage(catalog, credited, &including, target_units))
}
