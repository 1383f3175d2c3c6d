//! Per-term totals and averages.
//!
//! Every attempt counts in the term it was taken, retakes included. Attempts
//! without credit (E, in progress) add nothing to the average; in-progress
//! units are tracked separately so a term with no posted grades still shows up.
//! A term holding nothing but E attempts is not a term at all: the entitlement
//! chain carries over it from the last term that had one.

use crate::domain::model::{EnrollmentRecord, TermAttempt, TermSummary};
use crate::domain::services::term::{TermKey, TermToken};
use std::collections::HashMap;

#[derive(Debug)]
struct TermAccumulator {
    term: TermToken,
    credited_units: u32,
    point_total: f64,
    in_progress_units: u32,
    attempts: Vec<TermAttempt>,
    /// Set once a graded or in-progress attempt lands here.
    counted: bool,
}

impl TermAccumulator {
    fn new(term: TermToken) -> Self {
        Self {
            term,
            credited_units: 0,
            point_total: 0.0,
            in_progress_units: 0,
            attempts: Vec::new(),
            counted: false,
        }
    }

    fn add(&mut self, record: &EnrollmentRecord) {
        if record.credited_points().is_some() {
            self.credited_units += record.credit_units;
            self.point_total += record.weighted_points();
            self.counted = true;
        } else if record.grade.letter().is_none() {
            self.in_progress_units += record.credit_units;
            self.counted = true;
        }
        self.attempts.push(TermAttempt {
            course_name: record.course_name.clone(),
            credit_units: record.credit_units,
            grade: record.grade.clone(),
        });
    }

    fn finish(self) -> TermSummary {
        let term_average = if self.credited_units > 0 {
            Some(self.point_total / f64::from(self.credited_units))
        } else {
            None
        };

        TermSummary {
            term: self.term,
            credited_units: self.credited_units,
            point_total: self.point_total,
            term_average,
            in_progress_units: self.in_progress_units,
            entitlement: 0,
            credit_entitlement_next_term: 0,
            attempts: self.attempts,
        }
    }
}

/// Term summaries in chronological order, entitlements not yet applied.
pub fn aggregate_terms(records: &[EnrollmentRecord]) -> Vec<TermSummary> {
    let mut index: HashMap<TermKey, usize> = HashMap::new();
    let mut terms: Vec<TermAccumulator> = Vec::new();

    for record in records {
        let slot = *index.entry(record.term.key()).or_insert_with(|| {
            terms.push(TermAccumulator::new(record.term.clone()));
            terms.len() - 1
        });
        terms[slot].add(record);
    }

    terms.retain(|t| {
        if !t.counted {
            tracing::debug!("Term '{}' has only failed attempts; skipped", t.term);
        }
        t.counted
    });

    // stable: malformed terms keep first-appearance order at the end
    terms.sort_by(|a, b| a.term.cmp_chronological(&b.term));

    tracing::debug!("Aggregated {} attempts into {} terms", records.len(), terms.len());

    terms.into_iter().map(TermAccumulator::finish).collect()
}
