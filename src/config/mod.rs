pub mod cli;
pub mod toml_config;

use crate::adapters::report::parse_formats;
use crate::utils::error::{Result, TranscriptError};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::GradeOverride;
#[cfg(feature = "cli")]
use crate::domain::services::entitlement::EntitlementPolicy;
#[cfg(feature = "cli")]
use crate::domain::services::grade_scale::LetterGrade;
#[cfg(feature = "cli")]
use crate::domain::services::matcher::DEFAULT_FUZZY_THRESHOLD;
#[cfg(feature = "cli")]
use crate::domain::services::reconcile::{
    ReconciliationPolicy, DEFAULT_ELECTIVE_TARGET_UNITS, DEFAULT_GRADUATION_UNITS,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const INPUT_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Checks shared by every configuration source.
pub(crate) fn validate_io_settings<C: crate::core::ConfigProvider>(config: &C) -> Result<()> {
    validate_non_empty_string("report.name", config.report_name())?;

    validate_path("input.enrollment", config.enrollment_path())?;
    let mut inputs = vec![config.enrollment_path()];
    for (field, path) in [
        ("input.required_catalog", config.required_catalog_path()),
        ("input.elective_catalog", config.elective_catalog_path()),
    ] {
        if let Some(path) = path {
            validate_path(field, path)?;
            inputs.push(path);
        }
    }
    validate_file_extensions("input", &inputs, &INPUT_EXTENSIONS)?;

    validate_path("output.path", config.output_path())?;
    if config.output_formats().is_empty() {
        return Err(TranscriptError::MissingConfigError {
            field: "output.formats".to_string(),
        });
    }
    parse_formats(config.output_formats())?;

    if let Some(archive) = config.archive_name() {
        validate_file_extensions("output.compression.filename", &[archive], &["zip"])?;
    }

    config.policy().validate()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "transcript-etl")]
#[command(about = "Reconcile an enrollment history against the curriculum catalogs")]
pub struct CliConfig {
    #[arg(long, help = "Enrollment history export (CSV or TSV)")]
    pub enrollment: String,

    #[arg(long, help = "Required-curriculum catalog")]
    pub required_catalog: Option<String>,

    #[arg(long, help = "Elective catalog")]
    pub elective_catalog: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values = ["csv", "json"])]
    pub output_formats: Vec<String>,

    #[arg(long, help = "Bundle all output files into this zip archive")]
    pub zip: Option<String>,

    #[arg(long, default_value = "transcript-report")]
    pub report_name: String,

    #[arg(long, default_value_t = DEFAULT_FUZZY_THRESHOLD)]
    pub fuzzy_threshold: f64,

    #[arg(long, default_value_t = DEFAULT_GRADUATION_UNITS)]
    pub graduation_units: u32,

    #[arg(long, default_value_t = DEFAULT_ELECTIVE_TARGET_UNITS)]
    pub elective_target_units: u32,

    #[arg(
        long = "simulate",
        value_name = "COURSE=GRADE",
        value_parser = parse_grade_override,
        help = "Project a letter grade for a course (repeatable)"
    )]
    pub simulate: Vec<GradeOverride>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
fn parse_grade_override(raw: &str) -> std::result::Result<GradeOverride, String> {
    let (course, grade) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected COURSE=GRADE, got '{}'", raw))?;

    let course = course.trim();
    if course.is_empty() {
        return Err(format!("missing course name in '{}'", raw));
    }

    let grade: LetterGrade = grade.parse().map_err(|e: TranscriptError| e.to_string())?;
    Ok(GradeOverride {
        course_name: course.to_string(),
        grade,
    })
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn report_name(&self) -> &str {
        &self.report_name
    }

    fn enrollment_path(&self) -> &str {
        &self.enrollment
    }

    fn required_catalog_path(&self) -> Option<&str> {
        self.required_catalog.as_deref()
    }

    fn elective_catalog_path(&self) -> Option<&str> {
        self.elective_catalog.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.as_deref()
    }

    fn policy(&self) -> ReconciliationPolicy {
        ReconciliationPolicy {
            fuzzy_threshold: self.fuzzy_threshold,
            graduation_units: self.graduation_units,
            elective_target_units: self.elective_target_units,
            entitlement: EntitlementPolicy::default(),
        }
    }

    fn grade_overrides(&self) -> &[GradeOverride] {
        &self.simulate
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_io_settings(self)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["transcript-etl"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--enrollment", "data/enrollment.csv"]);

        assert_eq!(config.output_formats, ["csv", "json"]);
        assert_eq!(config.policy(), ReconciliationPolicy::default());
        assert_eq!(config.required_catalog_path(), None);
        assert!(config.grade_overrides().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulate_flags() {
        let config = parse(&[
            "--enrollment",
            "data/enrollment.csv",
            "--simulate",
            "Metode Numerik=ab",
            "--simulate",
            "Kalkulus II = A",
        ]);

        assert_eq!(config.simulate.len(), 2);
        assert_eq!(config.simulate[0].course_name, "Metode Numerik");
        assert_eq!(config.simulate[0].grade, LetterGrade::AB);
        assert_eq!(config.simulate[1].course_name, "Kalkulus II");
        assert_eq!(config.simulate[1].grade, LetterGrade::A);
    }

    #[test]
    fn test_simulate_rejects_bad_grade() {
        let result = CliConfig::try_parse_from([
            "transcript-etl",
            "--enrollment",
            "e.csv",
            "--simulate",
            "Kalkulus I=F",
        ]);
        assert!(result.is_err());
        assert!(parse_grade_override("Kalkulus I").is_err());
        assert!(parse_grade_override("=A").is_err());
    }

    #[test]
    fn test_validation() {
        let config = parse(&["--enrollment", "data/enrollment.xlsx"]);
        assert!(config.validate().is_err());

        let config = parse(&["--enrollment", "e.csv", "--output-formats", "csv,pdf"]);
        assert!(config.validate().is_err());

        let config = parse(&["--enrollment", "e.csv", "--fuzzy-threshold", "1.5"]);
        assert!(config.validate().is_err());

        let config = parse(&["--enrollment", "e.csv", "--zip", "report.tar"]);
        assert!(config.validate().is_err());

        let config = parse(&[
            "--enrollment",
            "e.csv",
            "--required-catalog",
            "kurikulum.tsv",
            "--zip",
            "report.zip",
        ]);
        assert!(config.validate().is_ok());
    }
}
