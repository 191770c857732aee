//! Configuration types for report generation.
//!
//! [`ReportConfig`] is built by the caller (CLI or library user) before a
//! report is generated and is read-only afterwards. Use
//! [`ReportConfig::builder()`] for a validated configuration, or
//! [`ReportConfig::new`] when only the source path matters.

use crate::utils::title_case;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory reports are written to.
pub const DEFAULT_REPORT_DIR: &str = "Reports";

/// Prefix of titles derived from the source file name.
pub const DERIVED_TITLE_PREFIX: &str = "Data Report: ";

/// Configuration for a single report generation call.
///
/// # Example
///
/// ```rust,ignore
/// use json_report::ReportConfig;
///
/// let config = ReportConfig::builder()
///     .json_path("data/sales_2024.json")
///     .report_dir("out")
///     .build()?;
///
/// assert_eq!(config.resolved_title(), "Data Report: Sales 2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Path to the JSON dataset.
    pub json_path: PathBuf,

    /// Directory the PDF is written to. Created when missing.
    /// Default: "Reports"
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Explicit report title. When `None` (or empty) the title is derived
    /// from the source file stem.
    #[serde(default)]
    pub title: Option<String>,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_DIR)
}

impl ReportConfig {
    /// Create a configuration with the default report directory and no title.
    pub fn new(json_path: impl Into<PathBuf>) -> Self {
        Self {
            json_path: json_path.into(),
            report_dir: default_report_dir(),
            title: None,
        }
    }

    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// The title printed on the first page.
    ///
    /// Falls back to `"Data Report: "` followed by the title-cased file stem
    /// with underscores replaced by spaces.
    pub fn resolved_title(&self) -> String {
        if let Some(title) = self.title.as_deref()
            && !title.is_empty()
        {
            return title.to_string();
        }
        let stem = self
            .json_path
            .file_stem()
            .map(|s| s.to_string_lossy().replace('_', " "))
            .unwrap_or_default();
        format!("{DERIVED_TITLE_PREFIX}{}", title_case(&stem))
    }

    /// File name of the source dataset, as shown on the title page.
    pub fn source_file_name(&self) -> String {
        self.json_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.json_path.display().to_string())
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.json_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::MissingJsonPath);
        }
        if self.report_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyReportDir);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("A JSON dataset path is required")]
    MissingJsonPath,

    #[error("Report directory must not be empty")]
    EmptyReportDir,
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    json_path: Option<PathBuf>,
    report_dir: Option<PathBuf>,
    title: Option<String>,
}

impl ReportConfigBuilder {
    /// Set the source JSON dataset.
    pub fn json_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.json_path = Some(path.into());
        self
    }

    /// Set the output directory.
    pub fn report_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(path.into());
        self
    }

    /// Override the derived report title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set or clear the title from an optional value.
    pub fn maybe_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ReportConfig` or an error if validation fails.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let config = ReportConfig {
            json_path: self.json_path.ok_or(ConfigValidationError::MissingJsonPath)?,
            report_dir: self.report_dir.unwrap_or_else(default_report_dir),
            title: self.title,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ReportConfig::new("data.json");
        assert_eq!(config.report_dir, PathBuf::from("Reports"));
        assert_eq!(config.title, None);
    }

    #[test]
    fn test_resolved_title_derived_from_stem() {
        let config = ReportConfig::new("exports/monthly_sales_report.json");
        assert_eq!(config.resolved_title(), "Data Report: Monthly Sales Report");
    }

    #[test]
    fn test_resolved_title_title_cases_mixed_input() {
        let config = ReportConfig::new("EU_revenue_2024q1.json");
        assert_eq!(config.resolved_title(), "Data Report: Eu Revenue 2024Q1");
    }

    #[test]
    fn test_explicit_title_wins() {
        let config = ReportConfig::builder()
            .json_path("data.json")
            .title("Test Report")
            .build()
            .unwrap();
        assert_eq!(config.resolved_title(), "Test Report");
    }

    #[test]
    fn test_empty_title_falls_back() {
        let config = ReportConfig::builder()
            .json_path("sample_data.json")
            .title("")
            .build()
            .unwrap();
        assert_eq!(config.resolved_title(), "Data Report: Sample Data");
    }

    #[test]
    fn test_source_file_name() {
        let config = ReportConfig::new("/tmp/nested/input_file.json");
        assert_eq!(config.source_file_name(), "input_file.json");
    }

    #[test]
    fn test_builder_requires_json_path() {
        let result = ReportConfig::builder().report_dir("out").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::MissingJsonPath
        ));
    }

    #[test]
    fn test_builder_rejects_empty_report_dir() {
        let result = ReportConfig::builder()
            .json_path("data.json")
            .report_dir("")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyReportDir
        ));
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{ "json_path": "input.json" }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.json_path, PathBuf::from("input.json"));
        assert_eq!(config.report_dir, PathBuf::from(DEFAULT_REPORT_DIR));
        assert_eq!(config.title, None);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = ReportConfig::builder()
            .json_path("a.json")
            .report_dir("reports")
            .title("Quarterly")
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: ReportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
