//! Changenote Lint - Rule-based validation of release-note change reports
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure validation engine separated from file system and presentation concerns
//! - Clean boundaries between the fixed rule catalog and configurable surroundings
//! - CI integration API provides gatekeeping workflows

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod patterns;
pub mod report;
pub mod rules_doc;
pub mod source;

// Re-export main types for convenient access
pub use domain::entry::ReportEntry;
pub use domain::violations::{
    BatchReport, EntryField, EntryViolations, LintError, LintResult, Severity, Statistics,
    ValidationResult, Violation,
};

pub use config::LintConfig;

pub use analyzer::{BatchInput, BatchValidator, ValidationEngine};

pub use patterns::{RuleDefinition, RULES};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use source::DataSource;

use serde_json::Value as JsonValue;
use std::path::Path;
use std::sync::Arc;

/// Main validator tying the engine to a data source and a formatter
pub struct ChangeNoteValidator {
    batch: Arc<BatchValidator>,
    source: DataSource,
    report_formatter: ReportFormatter,
}

impl ChangeNoteValidator {
    /// Create a new validator with the given configuration
    pub fn with_config(config: &LintConfig) -> LintResult<Self> {
        config.validate()?;

        let batch = BatchValidator::new(ValidationEngine::new()).with_parallel(config.batch.parallel);
        let report_formatter = ReportFormatter::new(ReportOptions {
            use_colors: config.output.use_colors,
            severity_filter: config.output.severity_filter,
            ..Default::default()
        });

        Ok(Self { batch: Arc::new(batch), source: DataSource::from_config(config)?, report_formatter })
    }

    /// Create a validator with default configuration
    pub fn new() -> LintResult<Self> {
        Self::with_config(&LintConfig::default())
    }

    /// Create a validator loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> LintResult<Self> {
        Self::with_config(&LintConfig::load_from_file(path)?)
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// The data source reports are read from
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Validate parsed report data
    pub fn validate_value(&self, data: &JsonValue, label: &str) -> ValidationResult {
        self.batch.engine().validate(data, label)
    }

    /// Validate typed entries
    pub fn validate_entries(&self, entries: &[ReportEntry], label: &str) -> ValidationResult {
        self.batch.engine().validate_entries(entries, label)
    }

    /// Validate one report from the data directory.
    ///
    /// Unreadable or unparsable files produce a failed result; only a path
    /// escaping the data directory is an error.
    pub fn validate_file(&self, name: &str, subset: bool) -> LintResult<ValidationResult> {
        match self.source.load(name, subset) {
            Ok(data) => Ok(self.validate_value(&data, name)),
            Err(e @ LintError::AccessDenied { .. }) => Err(e),
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", name, e);
                Ok(ValidationResult::failed(name, e.to_string()))
            }
        }
    }

    /// Validate several reports, or every listed report when `files` is empty
    pub fn validate_all(&self, files: &[String], subset: bool) -> LintResult<BatchReport> {
        self.batch.validate_files(&self.source, files, subset)
    }

    /// Validate off the async runtime's worker threads
    pub async fn validate_all_async(
        &self,
        files: Vec<String>,
        subset: bool,
    ) -> LintResult<BatchReport> {
        let batch = Arc::clone(&self.batch);
        let source = self.source.clone();

        tokio::task::spawn_blocking(move || batch.validate_files(&source, &files, subset))
            .await
            .map_err(|e| LintError::report(format!("Validation task failed: {e}")))?
    }

    /// Report files available for validation, newest first
    pub fn list_files(&self, subset: bool) -> LintResult<Vec<String>> {
        self.source.list_files(subset)
    }

    /// Format a validation result for output
    pub fn format_result(&self, result: &ValidationResult, format: OutputFormat) -> LintResult<String> {
        self.report_formatter.format_result(result, format)
    }

    /// Format a batch report for output
    pub fn format_batch(&self, batch: &BatchReport, format: OutputFormat) -> LintResult<String> {
        self.report_formatter.format_batch(batch, format)
    }

    /// Text of the rules document
    pub fn rules_document(&self) -> LintResult<String> {
        self.source.rules_document()
    }
}

/// Convenience function to create a validator with default settings
pub fn create_validator() -> LintResult<ChangeNoteValidator> {
    ChangeNoteValidator::new()
}

/// Convenience function to validate parsed report data with the full rule catalog
pub fn validate(data: &JsonValue, label: &str) -> ValidationResult {
    ValidationEngine::new().validate(data, label)
}

/// CI integration utilities
pub mod ci {
    use super::*;

    /// Release gate for pipelines
    ///
    /// Validates the given reports and returns an error if any blocking
    /// violation is found or any report could not be validated.
    pub async fn release_gate(config: &LintConfig, files: Vec<String>) -> LintResult<BatchReport> {
        let validator = ChangeNoteValidator::with_config(config)?;
        let report = validator.validate_all_async(files, false).await?;

        if report.has_errors() {
            let errors = report.statistics().errors;
            let failed = report.failures().count();
            return Err(LintError::report(format!(
                "Release gate failed: {} blocking violation{} and {} unreadable report{}",
                errors,
                if errors == 1 { "" } else { "s" },
                failed,
                if failed == 1 { "" } else { "s" }
            )));
        }

        Ok(report)
    }
}
