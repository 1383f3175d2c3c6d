use crate::config::validate_io_settings;
use crate::core::ConfigProvider;
use crate::domain::model::GradeOverride;
use crate::domain::services::entitlement::{EntitlementPolicy, EntitlementTier};
use crate::domain::services::ReconciliationPolicy;
use crate::utils::error::{Result, TranscriptError};
use crate::utils::validation::{validate_required_field, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub enrollment: String,
    pub required_catalog: Option<String>,
    pub elective_catalog: Option<String>,
}

/// Every field falls back to the built-in policy when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub fuzzy_threshold: Option<f64>,
    pub graduation_units: Option<u32>,
    pub elective_target_units: Option<u32>,
    pub entitlement_baseline: Option<u32>,
    pub entitlement_ceiling: Option<u32>,
    pub entitlement_tiers: Option<Vec<EntitlementTier>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub overrides: Vec<GradeOverride>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TranscriptError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Expands `${VAR}` from the environment; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        result.to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(compression) = &self.output.compression {
            if compression.enabled {
                validate_required_field("output.compression.filename", &compression.filename)?;
            }
        }

        validate_io_settings(self)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn report_name(&self) -> &str {
        &self.report.name
    }

    fn enrollment_path(&self) -> &str {
        &self.input.enrollment
    }

    fn required_catalog_path(&self) -> Option<&str> {
        self.input.required_catalog.as_deref()
    }

    fn elective_catalog_path(&self) -> Option<&str> {
        self.input.elective_catalog.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.output
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .and_then(|c| c.filename.as_deref())
    }

    fn policy(&self) -> ReconciliationPolicy {
        let defaults = ReconciliationPolicy::default();
        let policy = &self.policy;

        ReconciliationPolicy {
            fuzzy_threshold: policy.fuzzy_threshold.unwrap_or(defaults.fuzzy_threshold),
            graduation_units: policy.graduation_units.unwrap_or(defaults.graduation_units),
            elective_target_units: policy
                .elective_target_units
                .unwrap_or(defaults.elective_target_units),
            entitlement: EntitlementPolicy {
                baseline: policy
                    .entitlement_baseline
                    .unwrap_or(defaults.entitlement.baseline),
                tiers: policy
                    .entitlement_tiers
                    .clone()
                    .unwrap_or(defaults.entitlement.tiers),
                ceiling: policy
                    .entitlement_ceiling
                    .unwrap_or(defaults.entitlement.ceiling),
            },
        }
    }

    fn grade_overrides(&self) -> &[GradeOverride] {
        &self.simulation.overrides
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
