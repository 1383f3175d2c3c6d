//! Renders a reconciliation report into output files (CSV/TSV tables, a JSON
//! document) and optionally bundles them into a zip archive.

use crate::domain::model::{
    CatalogKind, CatalogProgress, MatchView, ReconciliationReport, RejectedRow, RenderedFile,
    ReportMeta, SimulationOutcome,
};
use crate::utils::error::{Result, TranscriptError};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

pub const SUPPORTED_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = TranscriptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(TranscriptError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            }),
        }
    }
}

pub fn parse_formats(formats: &[String]) -> Result<Vec<OutputFormat>> {
    formats.iter().map(|f| f.parse()).collect()
}

#[derive(Serialize)]
struct TranscriptRow<'a> {
    course_name: &'a str,
    credit_units: u32,
    term: &'a str,
    grade: String,
    grade_point: Option<f64>,
}

#[derive(Serialize)]
struct TermRow<'a> {
    term: &'a str,
    credited_units: u32,
    point_total: f64,
    term_average: Option<f64>,
    in_progress_units: u32,
    entitlement: u32,
    credit_entitlement_next_term: u32,
}

#[derive(Serialize)]
struct UnmatchedRow<'a> {
    catalog: CatalogKind,
    view: MatchView,
    course_name: &'a str,
    credit_units: u32,
}

#[derive(Serialize)]
struct SummaryRow {
    metric: &'static str,
    value: String,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    meta: &'a ReportMeta,
    report: &'a ReconciliationReport,
    simulation: Option<&'a SimulationOutcome>,
    rejected: &'a [RejectedRow],
}

/// Everything that ends up in the output files.
pub struct ReportView<'a> {
    pub meta: &'a ReportMeta,
    pub report: &'a ReconciliationReport,
    pub simulation: Option<&'a SimulationOutcome>,
    pub rejected: &'a [RejectedRow],
}

pub fn render_files(view: &ReportView<'_>, formats: &[OutputFormat]) -> Result<Vec<RenderedFile>> {
    let mut files = Vec::new();

    for format in formats {
        match format {
            OutputFormat::Csv => render_tables(view, b',', *format, &mut files)?,
            OutputFormat::Tsv => render_tables(view, b'\t', *format, &mut files)?,
            OutputFormat::Json => {
                let document = ReportDocument {
                    meta: view.meta,
                    report: view.report,
                    simulation: view.simulation,
                    rejected: view.rejected,
                };
                files.push(RenderedFile {
                    name: "report.json".to_string(),
                    contents: serde_json::to_vec_pretty(&document)?,
                });
            }
        }
    }

    tracing::debug!("Rendered {} output files", files.len());
    Ok(files)
}

fn render_tables(
    view: &ReportView<'_>,
    delimiter: u8,
    format: OutputFormat,
    files: &mut Vec<RenderedFile>,
) -> Result<()> {
    let report = view.report;
    let mut push = |table: &str, contents: Vec<u8>| {
        files.push(RenderedFile {
            name: format!("{}.{}", table, format.extension()),
            contents,
        });
    };

    push("summary", write_table(delimiter, summary_rows(view))?);

    push(
        "transcript",
        write_table(
            delimiter,
            report.transcript.records().map(|r| TranscriptRow {
                course_name: &r.course_name,
                credit_units: r.credit_units,
                term: r.term.as_str(),
                grade: r.grade.to_string(),
                grade_point: r.credited_points(),
            }),
        )?,
    );

    push(
        "in_progress",
        write_table(
            delimiter,
            report.in_progress.iter().map(|r| TranscriptRow {
                course_name: &r.course_name,
                credit_units: r.credit_units,
                term: r.term.as_str(),
                grade: r.grade.to_string(),
                grade_point: None,
            }),
        )?,
    );

    push(
        "terms",
        write_table(
            delimiter,
            report.terms.iter().map(|t| TermRow {
                term: t.term.as_str(),
                credited_units: t.credited_units,
                point_total: t.point_total,
                term_average: t.term_average,
                in_progress_units: t.in_progress_units,
                entitlement: t.entitlement,
                credit_entitlement_next_term: t.credit_entitlement_next_term,
            }),
        )?,
    );

    push("unmatched", write_table(delimiter, unmatched_rows(report))?);

    if !view.rejected.is_empty() {
        push("rejected", write_table(delimiter, view.rejected.iter())?);
    }

    Ok(())
}

fn summary_rows(view: &ReportView<'_>) -> Vec<SummaryRow> {
    let summary = &view.report.summary;
    let completion = |progress: &CatalogProgress| match progress.coverage() {
        Some(coverage) => format!("{:.4}", coverage.completion),
        None => "no data".to_string(),
    };

    let mut rows = vec![
        SummaryRow {
            metric: "report_name",
            value: view.meta.report_name.clone(),
        },
        SummaryRow {
            metric: "generated_at",
            value: view.meta.generated_at.clone(),
        },
        SummaryRow {
            metric: "cumulative_average",
            value: format!("{:.4}", summary.cumulative_average),
        },
        SummaryRow {
            metric: "credited_units",
            value: summary.credited_units.to_string(),
        },
        SummaryRow {
            metric: "in_progress_units",
            value: summary.in_progress_units.to_string(),
        },
        SummaryRow {
            metric: "graduation_units",
            value: summary.graduation_units.to_string(),
        },
        SummaryRow {
            metric: "graduation_reached",
            value: summary.graduation_reached.to_string(),
        },
        SummaryRow {
            metric: "required_completion",
            value: completion(&summary.required),
        },
        SummaryRow {
            metric: "elective_completion",
            value: completion(&summary.elective),
        },
        SummaryRow {
            metric: "next_term_entitlement",
            value: summary.next_term_entitlement.to_string(),
        },
        SummaryRow {
            metric: "diagnostics",
            value: view.report.diagnostics.len().to_string(),
        },
    ];

    if let Some(simulation) = view.simulation {
        rows.push(SummaryRow {
            metric: "projected_average",
            value: format!("{:.4}", simulation.projected_average),
        });
        rows.push(SummaryRow {
            metric: "projected_credited_units",
            value: simulation.projected_credited_units.to_string(),
        });
    }

    rows
}

fn unmatched_rows(report: &ReconciliationReport) -> Vec<UnmatchedRow<'_>> {
    let mut rows = Vec::new();
    for (catalog, progress) in [
        (CatalogKind::Required, &report.summary.required),
        (CatalogKind::Elective, &report.summary.elective),
    ] {
        let Some(coverage) = progress.coverage() else {
            continue;
        };
        for (view, entries) in [
            (MatchView::Credited, &coverage.unmatched_credited),
            (MatchView::IncludingInProgress, &coverage.unmatched_including_in_progress),
        ] {
            rows.extend(entries.iter().map(|entry| UnmatchedRow {
                catalog,
                view,
                course_name: &entry.course_name,
                credit_units: entry.credit_units,
            }));
        }
    }
    rows
}

fn write_table<T: Serialize>(delimiter: u8, rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| TranscriptError::IoError(e.into_error()))
}

/// Packs rendered files into one zip archive, in order.
pub fn bundle_zip(files: &[RenderedFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
