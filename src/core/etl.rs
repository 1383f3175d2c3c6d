use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting transcript reconciliation");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("Reading input datasets...");
        let input = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} enrollment rows, {} required and {} elective catalog entries ({} rejected)",
            input.enrollment.len(),
            input.required_catalog.len(),
            input.elective_catalog.len(),
            input.rejected.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("Reconciling transcript...");
        let result = self.pipeline.transform(input).await?;
        tracing::info!(
            "Cumulative average {:.2} over {} credited units, {} diagnostics, {} output files",
            result.report.summary.cumulative_average,
            result.report.summary.credited_units,
            result.report.diagnostics.len(),
            result.files.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");

        self.monitor.log_final_stats();
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ReconInput, TransformResult};
    use crate::domain::model::{EnrollmentRecord, ReportMeta};
    use crate::domain::services::{reconcile, ReconciliationPolicy};
    use crate::utils::error::TranscriptError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        loads: AtomicUsize,
        fail_extract: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<ReconInput> {
            if self.fail_extract {
                return Err(TranscriptError::IngestError {
                    dataset: "enrollment history".to_string(),
                    message: "missing column 'grade' (or 'Nilai')".to_string(),
                });
            }
            Ok(ReconInput {
                enrollment: vec![EnrollmentRecord::new("Kalkulus I", 3, "2022/2023 Ganjil", "A")],
                ..ReconInput::default()
            })
        }

        async fn transform(&self, data: ReconInput) -> Result<TransformResult> {
            Ok(TransformResult {
                meta: ReportMeta {
                    report_name: "engine".to_string(),
                    engine_version: "test".to_string(),
                    generated_at: String::new(),
                },
                report: reconcile(&data, &ReconciliationPolicy::default()),
                simulation: None,
                rejected: data.rejected,
                files: Vec::new(),
            })
        }

        async fn load(&self, result: TransformResult) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("out/{}", result.meta.report_name))
        }
    }

    #[tokio::test]
    async fn test_engine_runs_all_phases() {
        let engine = EtlEngine::new(CountingPipeline {
            loads: AtomicUsize::new(0),
            fail_extract: false,
        });

        let output = engine.run().await.unwrap();
        assert_eq!(output, "out/engine");
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_engine_stops_on_extract_error() {
        let engine = EtlEngine::new_with_monitoring(
            CountingPipeline {
                loads: AtomicUsize::new(0),
                fail_extract: true,
            },
            false,
        );

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
