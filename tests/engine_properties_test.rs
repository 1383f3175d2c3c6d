use transcript_etl::domain::model::{CatalogEntry, EnrollmentRecord, ReconInput};
use transcript_etl::domain::services::aggregator::aggregate_terms;
use transcript_etl::domain::services::entitlement::EntitlementPolicy;
use transcript_etl::domain::services::matcher::{match_catalog, DEFAULT_FUZZY_THRESHOLD};
use transcript_etl::domain::services::normalizer::normalize;
use transcript_etl::{reconcile, ReconciliationPolicy};

const GRADES: [&str; 9] = ["A", "AB", "B", "BC", "C", "D", "E", "*BT", ""];
const TERMS: [&str; 5] = [
    "2023/2024 Ganjil",
    "2021/2022 Genap",
    "Semester Pendek",
    "2021/2022 Ganjil",
    "2022/2023 Genap",
];

/// Deterministic pseudo-random history covering retakes, failures and markers.
fn history(seed: u64, len: usize) -> Vec<EnrollmentRecord> {
    let mut state = seed;
    let mut next = move |bound: usize| {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as usize) % bound
    };

    (0..len)
        .map(|_| {
            let course = format!("Mata Kuliah {}", next(6));
            let units = 1 + next(4) as u32;
            EnrollmentRecord::new(&course, units, TERMS[next(TERMS.len())], GRADES[next(GRADES.len())])
        })
        .collect()
}

#[test]
fn canonical_record_is_unique_and_best() {
    for seed in 0..50 {
        let records = history(seed, 30);
        let normalized = normalize(&records);

        for (name, kept) in &normalized.canonical.courses {
            let best = records
                .iter()
                .filter(|r| &r.course_name == name)
                .filter_map(|r| r.credited_points())
                .fold(f64::MIN, f64::max);
            assert_eq!(kept.credited_points(), Some(best), "seed {}", seed);
        }

        for record in &normalized.in_progress {
            assert!(record.grade.letter().is_none());
            assert!(!normalized.canonical.contains(&record.course_name));
        }
    }
}

#[test]
fn failing_only_courses_are_nowhere() {
    let records = vec![
        EnrollmentRecord::new("Kimia Dasar", 2, "2021/2022 Ganjil", "E"),
        EnrollmentRecord::new("Kimia Dasar", 2, "2021/2022 Genap", "E"),
        EnrollmentRecord::new("Kalkulus I", 3, "2021/2022 Ganjil", "C"),
    ];

    let normalized = normalize(&records);
    assert!(!normalized.canonical.contains("Kimia Dasar"));
    assert!(normalized.in_progress.iter().all(|r| r.course_name != "Kimia Dasar"));
}

#[test]
fn matcher_never_reuses_names_or_entries() {
    let catalog: Vec<CatalogEntry> = [
        "Kalkulus I",
        "Kalkulus II",
        "Kalkulus 1",
        "Fisika Dasar I",
        "Fisika Dasar II",
        "Statistika",
    ]
    .iter()
    .map(|name| CatalogEntry::new(name, 3))
    .collect();
    let names: Vec<String> = ["kalkulus i", "Kalkulus 2", "Fisika Dasar 1", "Fisika Dasar 2"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let report = match_catalog(&catalog, &names, DEFAULT_FUZZY_THRESHOLD);
    assert_eq!(report.results.len(), catalog.len());

    let mut used: Vec<&str> = report.results.iter().filter_map(|r| r.matched_name()).collect();
    let matched = used.len();
    used.sort_unstable();
    used.dedup();
    assert_eq!(used.len(), matched);
    assert!(matched <= names.len());
}

#[test]
fn exact_match_ignores_threshold() {
    let catalog = vec![CatalogEntry::new("Fisika Dasar I", 3)];
    let names = vec!["FISIKA DASAR I".to_string()];

    let report = match_catalog(&catalog, &names, 1.0);
    assert_eq!(report.results[0].matched_name(), Some("FISIKA DASAR I"));
}

#[test]
fn entitlement_is_monotone_and_starts_at_baseline() {
    let policy = EntitlementPolicy::default();
    assert_eq!(policy.entitlement(None), policy.baseline);

    let mut previous = 0;
    for hundredths in 0..=400 {
        let credits = policy.entitlement(Some(f64::from(hundredths) / 100.0));
        assert!(credits >= previous);
        previous = credits;
    }
}

#[test]
fn terms_sorted_with_malformed_last() {
    for seed in 0..20 {
        let terms = aggregate_terms(&history(seed, 25));
        let first_malformed = terms.iter().position(|t| t.term.is_malformed());
        if let Some(pos) = first_malformed {
            assert!(terms[pos..].iter().all(|t| t.term.is_malformed()));
        }
        for pair in terms.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].term.academic_term(), pair[1].term.academic_term()) {
                assert!(a < b, "seed {}", seed);
            }
        }
        for term in &terms {
            if term.credited_units == 0 {
                assert_eq!(term.term_average, None);
            }
        }
    }
}

#[test]
fn completion_stays_in_unit_interval() {
    for seed in 0..20 {
        let records = history(seed, 40);
        let catalog: Vec<CatalogEntry> = (0..6)
            .map(|i| CatalogEntry::new(&format!("Mata Kuliah {}", i), 4))
            .collect();

        let input = ReconInput {
            enrollment: records,
            required_catalog: catalog.clone(),
            elective_catalog: catalog,
            rejected: Vec::new(),
        };
        let report = reconcile(&input, &ReconciliationPolicy::default());

        for progress in [&report.summary.required, &report.summary.elective] {
            let coverage = progress.coverage().expect("catalog is not empty");
            assert!((0.0..=1.0).contains(&coverage.completion));
            assert!(coverage.credited_units <= coverage.including_in_progress_units);
        }
    }
}
