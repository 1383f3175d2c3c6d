use crate::domain::services::grade_scale::LetterGrade;
use crate::domain::services::term::TermToken;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Placeholder the portal prints while a grade has not been posted yet.
pub const IN_PROGRESS_MARKER: &str = "*BT";

/// Grade column of an enrollment row: either a letter on the scale or an
/// in-progress marker (kept verbatim).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grade {
    Letter(LetterGrade),
    InProgress { marker: String },
}

impl Grade {
    /// Total over arbitrary text: anything that is not a letter on the scale
    /// becomes an in-progress marker.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<LetterGrade>() {
            Ok(letter) => Grade::Letter(letter),
            Err(_) => Grade::InProgress {
                marker: raw.trim().to_string(),
            },
        }
    }

    pub fn letter(&self) -> Option<LetterGrade> {
        match self {
            Grade::Letter(letter) => Some(*letter),
            Grade::InProgress { .. } => None,
        }
    }

    /// `true` for blank cells and the portal's own placeholder; `false` for
    /// letters and for unrecognised tokens.
    pub fn is_known_marker(&self) -> bool {
        match self {
            Grade::Letter(_) => false,
            Grade::InProgress { marker } => {
                marker.is_empty()
                    || marker.eq_ignore_ascii_case(IN_PROGRESS_MARKER)
                    || marker.eq_ignore_ascii_case(IN_PROGRESS_MARKER.trim_start_matches('*'))
            }
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Letter(letter) => write!(f, "{letter}"),
            Grade::InProgress { marker } if marker.is_empty() => f.write_str(IN_PROGRESS_MARKER),
            Grade::InProgress { marker } => f.write_str(marker),
        }
    }
}

impl Serialize for Grade {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One attempt at a course as exported by the portal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRecord {
    pub course_name: String,
    pub credit_units: u32,
    pub term: TermToken,
    pub grade: Grade,
}

impl EnrollmentRecord {
    pub fn new(course_name: &str, credit_units: u32, term: &str, grade: &str) -> Self {
        Self {
            course_name: course_name.to_string(),
            credit_units,
            term: TermToken::parse(term),
            grade: Grade::parse(grade),
        }
    }

    /// Grade point when the attempt counts towards credit (posted, not E).
    pub fn credited_points(&self) -> Option<f64> {
        self.grade
            .letter()
            .filter(|letter| !letter.is_failing())
            .map(LetterGrade::points)
    }

    /// `credit_units × grade point`, zero for attempts without credit.
    pub fn weighted_points(&self) -> f64 {
        self.credited_points()
            .map(|points| points * f64::from(self.credit_units))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub course_name: String,
    pub credit_units: u32,
    #[serde(default)]
    pub term_recommended: Option<String>,
    #[serde(default)]
    pub prerequisite: Option<String>,
}

impl CatalogEntry {
    pub fn new(course_name: &str, credit_units: u32) -> Self {
        Self {
            course_name: course_name.to_string(),
            credit_units,
            term_recommended: None,
            prerequisite: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Enrollment,
    RequiredCatalog,
    ElectiveCatalog,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enrollment => write!(f, "enrollment history"),
            Self::RequiredCatalog => write!(f, "required-curriculum catalog"),
            Self::ElectiveCatalog => write!(f, "elective catalog"),
        }
    }
}

/// A row dropped at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub dataset: Dataset,
    pub line: u64,
    pub reason: String,
}

/// The three datasets, fully materialised before the engine runs.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub enrollment: Vec<EnrollmentRecord>,
    pub required_catalog: Vec<CatalogEntry>,
    pub elective_catalog: Vec<CatalogEntry>,
    pub rejected: Vec<RejectedRow>,
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Best graded attempt per course name, keyed (and iterated) by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalTranscript {
    pub courses: BTreeMap<String, EnrollmentRecord>,
}

impl CanonicalTranscript {
    pub fn get(&self, course_name: &str) -> Option<&EnrollmentRecord> {
        self.courses.get(course_name)
    }

    pub fn contains(&self, course_name: &str) -> bool {
        self.courses.contains_key(course_name)
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &EnrollmentRecord> {
        self.courses.values()
    }

    pub fn course_names(&self) -> Vec<String> {
        self.courses.keys().cloned().collect()
    }

    pub fn credited_units(&self) -> u32 {
        self.records().map(|r| r.credit_units).sum()
    }

    pub fn point_total(&self) -> f64 {
        self.records().map(EnrollmentRecord::weighted_points).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTranscript {
    pub canonical: CanonicalTranscript,
    pub in_progress: Vec<EnrollmentRecord>,
}

// ---------------------------------------------------------------------------
// Catalog matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched {
        transcript_name: String,
        phase: MatchPhase,
        score: f64,
    },
    Unmatched,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub entry: CatalogEntry,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched { .. })
    }

    pub fn matched_name(&self) -> Option<&str> {
        match &self.outcome {
            MatchOutcome::Matched {
                transcript_name, ..
            } => Some(transcript_name),
            MatchOutcome::Unmatched => None,
        }
    }
}

/// Several remaining transcript names shared the best fuzzy score; the first
/// one in pool order was taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmbiguousMatch {
    pub catalog_entry: String,
    pub chosen: String,
    pub tied_with: Vec<String>,
    pub score: f64,
}

/// Matcher output, one result per catalog entry in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchReport {
    pub results: Vec<MatchResult>,
    pub ambiguities: Vec<AmbiguousMatch>,
}

impl MatchReport {
    pub fn matched(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.is_matched())
    }

    pub fn unmatched_entries(&self) -> Vec<CatalogEntry> {
        self.results
            .iter()
            .filter(|r| !r.is_matched())
            .map(|r| r.entry.clone())
            .collect()
    }

    pub fn matched_units(&self) -> u32 {
        self.matched().map(|r| r.entry.credit_units).sum()
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermAttempt {
    pub course_name: String,
    pub credit_units: u32,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSummary {
    pub term: TermToken,
    pub credited_units: u32,
    pub point_total: f64,
    /// `None` when nothing in the term earned credit.
    pub term_average: Option<f64>,
    pub in_progress_units: u32,
    /// Credit ceiling in force for this term, from the previous term's average.
    pub entitlement: u32,
    /// Ceiling this term's average grants to the following term.
    pub credit_entitlement_next_term: u32,
    pub attempts: Vec<TermAttempt>,
}

// ---------------------------------------------------------------------------
// Progress + report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogCoverage {
    pub catalog_units: u32,
    pub target_units: u32,
    pub credited_units: u32,
    pub including_in_progress_units: u32,
    /// `credited_units / target_units`, capped at 1.0.
    pub completion: f64,
    pub matches: Vec<MatchResult>,
    pub unmatched_credited: Vec<CatalogEntry>,
    pub unmatched_including_in_progress: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogProgress {
    NoData,
    Computed(CatalogCoverage),
}

impl CatalogProgress {
    pub fn coverage(&self) -> Option<&CatalogCoverage> {
        match self {
            CatalogProgress::Computed(coverage) => Some(coverage),
            CatalogProgress::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeCount {
    pub grade: LetterGrade,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub cumulative_average: f64,
    pub credited_units: u32,
    pub in_progress_units: u32,
    pub graduation_units: u32,
    pub graduation_reached: bool,
    pub required: CatalogProgress,
    pub elective: CatalogProgress,
    pub grade_distribution: Vec<GradeCount>,
    /// Ceiling for the term after the last recorded one.
    pub next_term_entitlement: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Required,
    Elective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchView {
    Credited,
    IncludingInProgress,
}

/// Conditions the engine recovered from on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    MissingReferenceData {
        dataset: Dataset,
    },
    MalformedTermToken {
        term: String,
    },
    UnresolvableGrade {
        course_name: String,
        grade: String,
    },
    AmbiguousMatch {
        catalog: CatalogKind,
        view: MatchView,
        detail: AmbiguousMatch,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingReferenceData { dataset } => write!(f, "no data in {dataset}"),
            Self::MalformedTermToken { term } => {
                write!(f, "term label '{term}' is not 'YYYY/YYYY Half'; ordered last")
            }
            Self::UnresolvableGrade { course_name, grade } => {
                write!(f, "grade '{grade}' of '{course_name}' treated as in progress")
            }
            Self::AmbiguousMatch { catalog, view, detail } => write!(
                f,
                "{catalog:?}/{view:?}: '{}' tied at {:.3} between '{}' and {:?}",
                detail.catalog_entry, detail.score, detail.chosen, detail.tied_with
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub transcript: CanonicalTranscript,
    pub in_progress: Vec<EnrollmentRecord>,
    pub terms: Vec<TermSummary>,
    pub summary: ProgressSummary,
    pub diagnostics: Vec<Diagnostic>,
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOverride {
    pub course_name: String,
    pub grade: LetterGrade,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    pub baseline_average: f64,
    pub projected_average: f64,
    pub baseline_credited_units: u32,
    pub projected_credited_units: u32,
    pub applied: Vec<GradeOverride>,
    pub unapplied: Vec<GradeOverride>,
}

// ---------------------------------------------------------------------------
// Pipeline output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMeta {
    pub report_name: String,
    pub engine_version: String,
    pub generated_at: String,
}

/// One output file, already rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub meta: ReportMeta,
    pub report: ReconciliationReport,
    pub simulation: Option<SimulationOutcome>,
    pub rejected: Vec<RejectedRow>,
    pub files: Vec<RenderedFile>,
}
