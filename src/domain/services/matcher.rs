//! Two-phase greedy matching of catalog entries against transcript course names.
//!
//! Phase 1 takes case-insensitive exact hits; phase 2 gives every entry still
//! unmatched the best-scoring remaining name if the score clears the
//! threshold. A transcript name is consumed by the first entry that matches
//! it, so one course can never satisfy two catalog entries.

use crate::domain::model::{AmbiguousMatch, CatalogEntry, MatchOutcome, MatchPhase, MatchReport, MatchResult};
use crate::domain::services::similarity::similarity_ratio;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.77;

/// A transcript name still available for matching.
struct Candidate {
    name: String,
    folded: String,
}

pub fn match_catalog(catalog: &[CatalogEntry], transcript_names: &[String], threshold: f64) -> MatchReport {
    let mut pool: Vec<Candidate> = transcript_names
        .iter()
        .map(|name| Candidate {
            name: name.clone(),
            folded: name.to_lowercase(),
        })
        .collect();

    let mut outcomes: Vec<MatchOutcome> = vec![MatchOutcome::Unmatched; catalog.len()];
    let mut ambiguities = Vec::new();

    // Phase 1: exact
    for (idx, entry) in catalog.iter().enumerate() {
        let folded = entry.course_name.to_lowercase();
        if let Some(pos) = pool.iter().position(|c| c.folded == folded) {
            let taken = pool.remove(pos);
            outcomes[idx] = MatchOutcome::Matched {
                transcript_name: taken.name,
                phase: MatchPhase::Exact,
                score: 1.0,
            };
        }
    }
    let exact = outcomes.iter().filter(|o| !matches!(o, MatchOutcome::Unmatched)).count();

    // Phase 2: fuzzy
    for (idx, entry) in catalog.iter().enumerate() {
        if !matches!(outcomes[idx], MatchOutcome::Unmatched) {
            continue;
        }
        if pool.is_empty() {
            break;
        }

        let folded = entry.course_name.to_lowercase();
        let scores: Vec<f64> = pool.iter().map(|c| similarity_ratio(&folded, &c.folded)).collect();

        let mut best: Option<(usize, f64)> = None;
        for (pos, &score) in scores.iter().enumerate() {
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((pos, score));
            }
        }
        let Some((pos, score)) = best else {
            continue;
        };
        if score < threshold {
            continue;
        }

        let tied_with: Vec<String> = scores
            .iter()
            .enumerate()
            .filter(|&(other, &s)| other != pos && s == score)
            .map(|(other, _)| pool[other].name.clone())
            .collect();

        let taken = pool.remove(pos);
        if !tied_with.is_empty() {
            ambiguities.push(AmbiguousMatch {
                catalog_entry: entry.course_name.clone(),
                chosen: taken.name.clone(),
                tied_with,
                score,
            });
        }
        outcomes[idx] = MatchOutcome::Matched {
            transcript_name: taken.name,
            phase: MatchPhase::Fuzzy,
            score,
        };
    }

    let results: Vec<MatchResult> = catalog
        .iter()
        .cloned()
        .zip(outcomes)
        .map(|(entry, outcome)| MatchResult { entry, outcome })
        .collect();

    tracing::debug!(
        "Matched {} of {} catalog entries ({} exact, {} fuzzy) against {} transcript names",
        results.iter().filter(|r| r.is_matched()).count(),
        catalog.len(),
        exact,
        results.iter().filter(|r| r.is_matched()).count() - exact,
        transcript_names.len()
    );

    MatchReport { results, ambiguities }
}
