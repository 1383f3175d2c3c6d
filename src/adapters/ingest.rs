//! Reads the portal's CSV exports into domain records.
//!
//! Headers may use either the snake_case names or the portal's own column
//! titles. A row that cannot be read is set aside as a [`RejectedRow`]; only a
//! missing column or an unreadable file fails the whole dataset.

use crate::domain::model::{CatalogEntry, Dataset, EnrollmentRecord, RejectedRow};
use crate::utils::error::{Result, TranscriptError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

const ENROLLMENT_COLUMNS: &[(&str, &str)] = &[
    ("course_name", "Nama Mata Ajar"),
    ("credit_units", "SKS"),
    ("term", "Semester"),
    ("grade", "Nilai"),
];

const CATALOG_COLUMNS: &[(&str, &str)] = &[("course_name", "Mata Kuliah"), ("credit_units", "SKS")];

#[derive(Debug, Deserialize)]
struct EnrollmentRow {
    #[serde(alias = "Nama Mata Ajar")]
    course_name: String,
    #[serde(alias = "SKS")]
    credit_units: u32,
    #[serde(alias = "Semester")]
    term: String,
    #[serde(alias = "Nilai")]
    grade: String,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(alias = "Mata Kuliah")]
    course_name: String,
    #[serde(alias = "SKS")]
    credit_units: u32,
    #[serde(alias = "Semester", default)]
    term_recommended: Option<String>,
    #[serde(alias = "Prasyarat", default)]
    prerequisite: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RejectedRow>,
}

/// Tab for `.tsv` files, comma otherwise.
pub fn delimiter_for(path: &str) -> u8 {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Drops the portal's " - <program>" suffix from a term label.
pub fn strip_term_suffix(term: &str) -> &str {
    match term.split_once(" - ") {
        Some((label, _)) => label.trim_end(),
        None => term,
    }
}

pub fn read_enrollment(data: &[u8], delimiter: u8) -> Result<Ingested<EnrollmentRecord>> {
    read_rows(
        Dataset::Enrollment,
        data,
        delimiter,
        ENROLLMENT_COLUMNS,
        |row: EnrollmentRow| {
            if row.course_name.is_empty() {
                return Err("course name is empty".to_string());
            }
            Ok(EnrollmentRecord::new(
                &row.course_name,
                row.credit_units,
                strip_term_suffix(&row.term),
                &row.grade,
            ))
        },
    )
}

pub fn read_catalog(dataset: Dataset, data: &[u8], delimiter: u8) -> Result<Ingested<CatalogEntry>> {
    read_rows(dataset, data, delimiter, CATALOG_COLUMNS, |row: CatalogRow| {
        if row.course_name.is_empty() {
            return Err("course name is empty".to_string());
        }
        Ok(CatalogEntry {
            course_name: row.course_name,
            credit_units: row.credit_units,
            term_recommended: row.term_recommended.filter(|t| !t.is_empty()),
            // the portal writes "-" for "no prerequisite"
            prerequisite: row.prerequisite.filter(|p| !p.is_empty() && p != "-"),
        })
    })
}

fn read_rows<R, T, F>(
    dataset: Dataset,
    data: &[u8],
    delimiter: u8,
    columns: &[(&str, &str)],
    convert: F,
) -> Result<Ingested<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> std::result::Result<T, String>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    check_columns(dataset, &headers, columns)?;

    let mut rows = Vec::new();
    let mut rejected = Vec::new();

    for result in reader.byte_records() {
        let raw = result?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        if raw.iter().all(<[u8]>::is_empty) {
            continue;
        }

        let outcome = csv::StringRecord::from_byte_record(raw)
            .map_err(|e| format!("invalid UTF-8 in field {}", e.utf8_error().field() + 1))
            .and_then(|record| record.deserialize::<R>(Some(&headers)).map_err(|e| e.to_string()))
            .and_then(&convert);

        match outcome {
            Ok(row) => rows.push(row),
            Err(reason) => {
                tracing::debug!("{} line {} rejected: {}", dataset, line, reason);
                rejected.push(RejectedRow {
                    dataset,
                    line,
                    reason,
                });
            }
        }
    }

    tracing::info!(
        "Read {} rows from {} ({} rejected)",
        rows.len(),
        dataset,
        rejected.len()
    );

    Ok(Ingested { rows, rejected })
}

fn check_columns(dataset: Dataset, headers: &csv::StringRecord, columns: &[(&str, &str)]) -> Result<()> {
    for (name, portal_name) in columns {
        if !headers.iter().any(|h| h == *name || h == *portal_name) {
            return Err(TranscriptError::IngestError {
                dataset: dataset.to_string(),
                message: format!("missing column '{}' (or '{}')", name, portal_name),
            });
        }
    }
    Ok(())
}
