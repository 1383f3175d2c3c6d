use crate::adapters::ingest::{delimiter_for, read_catalog, read_enrollment, Ingested};
use crate::adapters::report::{bundle_zip, parse_formats, render_files, ReportView};
use crate::core::{ConfigProvider, Pipeline, Storage, TransformResult};
use crate::domain::model::{CatalogEntry, Dataset, ReconInput, ReportMeta};
use crate::domain::services::{reconcile, simulate};
use crate::utils::error::Result;

pub struct TranscriptPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> TranscriptPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_catalog_file(
        &self,
        dataset: Dataset,
        path: Option<&str>,
    ) -> Result<Ingested<CatalogEntry>> {
        let Some(path) = path else {
            tracing::warn!("No {} configured, its progress will be reported as no data", dataset);
            return Ok(Ingested {
                rows: Vec::new(),
                rejected: Vec::new(),
            });
        };

        tracing::debug!("Reading {} from {}", dataset, path);
        let data = self.storage.read_file(path).await?;
        read_catalog(dataset, &data, delimiter_for(path))
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TranscriptPipeline<S, C> {
    async fn extract(&self) -> Result<ReconInput> {
        let enrollment_path = self.config.enrollment_path();
        tracing::debug!("Reading enrollment history from {}", enrollment_path);
        let data = self.storage.read_file(enrollment_path).await?;
        let enrollment = read_enrollment(&data, delimiter_for(enrollment_path))?;

        let required = self
            .read_catalog_file(Dataset::RequiredCatalog, self.config.required_catalog_path())
            .await?;
        let elective = self
            .read_catalog_file(Dataset::ElectiveCatalog, self.config.elective_catalog_path())
            .await?;

        let mut rejected = enrollment.rejected;
        rejected.extend(required.rejected);
        rejected.extend(elective.rejected);

        for row in &rejected {
            tracing::warn!("Skipped {} line {}: {}", row.dataset, row.line, row.reason);
        }

        Ok(ReconInput {
            enrollment: enrollment.rows,
            required_catalog: required.rows,
            elective_catalog: elective.rows,
            rejected,
        })
    }

    async fn transform(&self, data: ReconInput) -> Result<TransformResult> {
        let formats = parse_formats(self.config.output_formats())?;
        let policy = self.config.policy();

        let report = reconcile(&data, &policy);

        let overrides = self.config.grade_overrides();
        let simulation = if overrides.is_empty() {
            None
        } else {
            let outcome = simulate(&data.enrollment, overrides);
            tracing::info!(
                "Simulated {} grade(s): average {:.2} -> {:.2}",
                outcome.applied.len(),
                outcome.baseline_average,
                outcome.projected_average
            );
            Some(outcome)
        };

        let meta = ReportMeta {
            report_name: self.config.report_name().to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };

        let files = render_files(
            &ReportView {
                meta: &meta,
                report: &report,
                simulation: simulation.as_ref(),
                rejected: &data.rejected,
            },
            &formats,
        )?;

        Ok(TransformResult {
            meta,
            report,
            simulation,
            rejected: data.rejected,
            files,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        if let Some(archive) = self.config.archive_name() {
            let zip_data = bundle_zip(&result.files)?;
            let output_path = self.output_file(archive);

            tracing::debug!(
                "Writing ZIP file with {} files ({} bytes) to {}",
                result.files.len(),
                zip_data.len(),
                output_path
            );
            self.storage.write_file(&output_path, &zip_data).await?;
            return Ok(output_path);
        }

        for file in &result.files {
            let path = self.output_file(&file.name);
            tracing::debug!("Writing {} ({} bytes)", path, file.contents.len());
            self.storage.write_file(&path, &file.contents).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
