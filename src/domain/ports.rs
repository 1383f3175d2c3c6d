use crate::domain::model::{GradeOverride, ReconInput, TransformResult};
use crate::domain::services::ReconciliationPolicy;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn report_name(&self) -> &str;
    fn enrollment_path(&self) -> &str;
    /// `None` means the catalog is absent and reported as "no data".
    fn required_catalog_path(&self) -> Option<&str>;
    fn elective_catalog_path(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// Bundle every output file into this zip archive instead of writing them loose.
    fn archive_name(&self) -> Option<&str>;
    fn policy(&self) -> ReconciliationPolicy;
    fn grade_overrides(&self) -> &[GradeOverride];
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ReconInput>;
    async fn transform(&self, data: ReconInput) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
